//! Validation engine for configuration files.
//!
//! The engine runs all registered [`ConfigRule`]s against a
//! [`WordCloudConfig`](super::WordCloudConfig) and collects every diagnostic
//! into a [`ValidationReport`]. It never short-circuits on the first error,
//! so users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ticket_wordcloud::config::validation::ConfigValidator;
//!
//! let report = ConfigValidator::with_defaults().validate(&config);
//! for err in report.errors() {
//!     eprintln!("{err}");
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

use super::{WordCloudConfig, MAX_WORDS_LIMIT};

// ─── Issue codes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A value that must be positive is zero or negative.
    NotPositive,
    /// A value lies outside its allowed range.
    OutOfRange,
    /// Two settings contradict each other.
    Conflict,
    /// A required list is empty.
    Missing,
    /// A field the schema does not know.
    UnknownField,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPositive => "not_positive",
            Self::OutOfRange => "out_of_range",
            Self::Conflict => "conflict",
            Self::Missing => "missing",
            Self::UnknownField => "unknown_field",
        }
    }
}

// ─── Issue ──────────────────────────────────────────────────────────────────

/// One finding: a code, the JSON-pointer-style path of the offending field,
/// a message and an optional hint.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigIssue {
    pub code: IssueCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConfigIssue {
    pub fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.code.as_str())?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: ConfigIssue,
}

impl ValidationDiagnostic {
    pub fn error(issue: ConfigIssue) -> Self {
        Self {
            severity: Severity::Error,
            issue,
        }
    }

    pub fn warning(issue: ConfigIssue) -> Self {
        Self {
            severity: Severity::Warning,
            issue,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity issues.
    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.issue)
    }

    /// Iterate over warning-severity issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.issue)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`WordCloudConfig`] and returns
/// zero or more diagnostics.
pub trait ConfigRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"canvas_size"`).
    fn name(&self) -> &str;

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

pub struct ConfigValidator {
    rules: Vec<Box<dyn ConfigRule>>,
}

impl ConfigValidator {
    /// Create an empty validator with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(CanvasSizeRule));
        engine.add_rule(Box::new(LayoutLimitsRule));
        engine.add_rule(Box::new(FontCandidatesRule));
        engine.add_rule(Box::new(LexiconRule));
        engine.add_rule(Box::new(OutputRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn ConfigRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(&self, config: &WordCloudConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(config));
        }
        report
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Canvas dimensions must be positive ─────────────────────────────────

struct CanvasSizeRule;

impl ConfigRule for CanvasSizeRule {
    fn name(&self) -> &str {
        "canvas_size"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        [("width", config.canvas.width), ("height", config.canvas.height)]
            .into_iter()
            .filter(|&(_, value)| value == 0)
            .map(|(field, _)| {
                ValidationDiagnostic::error(ConfigIssue::new(
                    IssueCode::NotPositive,
                    format!("/canvas/{field}"),
                    format!("canvas {field} must be greater than 0"),
                ))
            })
            .collect()
    }
}

// ─── 2. Layout limits ───────────────────────────────────────────────────────

struct LayoutLimitsRule;

impl ConfigRule for LayoutLimitsRule {
    fn name(&self) -> &str {
        "layout_limits"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        let layout = &config.layout;
        let mut out = Vec::new();

        if layout.max_words == 0 {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::NotPositive,
                "/layout/max_words",
                "max_words must be greater than 0",
            )));
        }
        if layout.max_words > MAX_WORDS_LIMIT {
            out.push(ValidationDiagnostic::error(
                ConfigIssue::new(
                    IssueCode::OutOfRange,
                    "/layout/max_words",
                    format!(
                        "max_words must be at most {MAX_WORDS_LIMIT}, got {}",
                        layout.max_words
                    ),
                )
                .with_hint("lower-ranked terms are still returned in the ranked list"),
            ));
        }
        if layout.max_placement_attempts == 0 {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::NotPositive,
                "/layout/max_placement_attempts",
                "max_placement_attempts must be greater than 0",
            )));
        }
        if !(layout.min_font_size > 0.0) {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::NotPositive,
                "/layout/min_font_size",
                "min_font_size must be greater than 0",
            )));
        }
        if !(0.0..=1.0).contains(&layout.relative_scaling) {
            out.push(ValidationDiagnostic::error(
                ConfigIssue::new(
                    IssueCode::OutOfRange,
                    "/layout/relative_scaling",
                    format!(
                        "relative_scaling must be within [0, 1], got {}",
                        layout.relative_scaling
                    ),
                )
                .with_hint("0 sizes by rank only, 1 sizes linearly by count"),
            ));
        }

        if let Some(max) = layout.max_font_size {
            if max < layout.min_font_size {
                out.push(ValidationDiagnostic::error(ConfigIssue::new(
                    IssueCode::Conflict,
                    "/layout/max_font_size",
                    format!(
                        "max_font_size ({max}) is smaller than min_font_size ({})",
                        layout.min_font_size
                    ),
                )));
            } else if max > config.canvas.shorter_side() as f32 {
                out.push(ValidationDiagnostic::warning(
                    ConfigIssue::new(
                        IssueCode::OutOfRange,
                        "/layout/max_font_size",
                        format!(
                            "max_font_size ({max}) exceeds the canvas's shorter side ({})",
                            config.canvas.shorter_side()
                        ),
                    )
                    .with_hint("It will be clamped to the shorter side"),
                ));
            }
        }

        let shorter = config.canvas.shorter_side();
        if shorter > 0 && 2 * layout.margin >= shorter {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::Conflict,
                "/layout/margin",
                format!("margin ({}) leaves no drawable area on a {shorter}px side", layout.margin),
            )));
        }

        out
    }
}

// ─── 3. At least one font candidate ─────────────────────────────────────────

struct FontCandidatesRule;

impl ConfigRule for FontCandidatesRule {
    fn name(&self) -> &str {
        "font_candidates"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        if config.font.candidates.is_empty() {
            vec![ValidationDiagnostic::error(
                ConfigIssue::new(
                    IssueCode::Missing,
                    "/font/candidates",
                    "no font candidates configured",
                )
                .with_hint("List at least one path to a CJK-capable TrueType font"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 4. Lexicon overrides must be non-empty and disjoint ────────────────────

struct LexiconRule;

impl ConfigRule for LexiconRule {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        let lexicon = &config.lexicon;
        let mut out = Vec::new();

        for (field, list) in [("equipment", &lexicon.equipment), ("problems", &lexicon.problems)] {
            if let Some(list) = list {
                if list.iter().all(|t| t.trim().is_empty()) {
                    out.push(ValidationDiagnostic::error(
                        ConfigIssue::new(
                            IssueCode::Missing,
                            format!("/lexicon/{field}"),
                            format!("lexicon {field} override is empty"),
                        )
                        .with_hint("Remove the override to use the curated list"),
                    ));
                }
            }
        }

        if out.is_empty() {
            if let Err(err) = lexicon.build() {
                out.push(ValidationDiagnostic::error(ConfigIssue::new(
                    IssueCode::Conflict,
                    "/lexicon",
                    err.to_string(),
                )));
            }
        }

        out
    }
}

// ─── 5. Output shaping ──────────────────────────────────────────────────────

struct OutputRule;

impl ConfigRule for OutputRule {
    fn name(&self) -> &str {
        "output"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        if config.output.ranked_terms_limit == 0 {
            out.push(ValidationDiagnostic::warning(ConfigIssue::new(
                IssueCode::NotPositive,
                "/output/ranked_terms_limit",
                "ranked_terms_limit is 0; responses will carry no terms",
            )));
        }
        if config.output.description_column.trim().is_empty() {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::Missing,
                "/output/description_column",
                "description_column must name a payload column",
            )));
        }
        out
    }
}

// ─── 6. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    fn check_unknowns(
        path: &str,
        unknowns: &HashMap<String, toml::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<&String> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    ConfigIssue::new(
                        IssueCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ConfigRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
        let strict = config.strict;
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &config.unknown_fields, strict));
        out.extend(Self::check_unknowns(
            "/canvas",
            &config.canvas.unknown_fields,
            strict,
        ));
        out.extend(Self::check_unknowns(
            "/layout",
            &config.layout.unknown_fields,
            strict,
        ));
        out.extend(Self::check_unknowns("/font", &config.font.unknown_fields, strict));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn config(text: &str) -> WordCloudConfig {
        toml::from_str(text).unwrap()
    }

    fn engine() -> ConfigValidator {
        ConfigValidator::with_defaults()
    }

    fn error_paths(report: &ValidationReport) -> Vec<&str> {
        report.errors().map(|e| e.path.as_str()).collect()
    }

    // ─── Valid configs ──────────────────────────────────────────────────

    #[test]
    fn test_default_config_is_valid() {
        let report = engine().validate(&WordCloudConfig::default());
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            engine().rule_names(),
            vec![
                "canvas_size",
                "layout_limits",
                "font_candidates",
                "lexicon",
                "output",
                "unknown_fields"
            ]
        );
    }

    // ─── Errors ─────────────────────────────────────────────────────────

    #[test]
    fn test_zero_canvas_reports_both_sides() {
        let report = engine().validate(&config("[canvas]\nwidth = 0\nheight = 0\n"));
        assert_eq!(error_paths(&report), vec!["/canvas/width", "/canvas/height"]);
    }

    #[test]
    fn test_layout_errors_collected_together() {
        let report = engine().validate(&config(
            "[layout]\nmax_words = 0\nrelative_scaling = 1.5\nmax_placement_attempts = 0\n",
        ));
        let paths = error_paths(&report);
        assert!(paths.contains(&"/layout/max_words"));
        assert!(paths.contains(&"/layout/relative_scaling"));
        assert!(paths.contains(&"/layout/max_placement_attempts"));
    }

    #[test]
    fn test_max_words_above_cap_rejected() {
        let report = engine().validate(&config("[layout]\nmax_words = 51\n"));
        assert_eq!(error_paths(&report), vec!["/layout/max_words"]);
        assert_eq!(report.errors().next().unwrap().code, IssueCode::OutOfRange);

        let report = engine().validate(&config("[layout]\nmax_words = 50\n"));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_max_below_min_font_is_conflict() {
        let report = engine().validate(&config(
            "[layout]\nmin_font_size = 20\nmax_font_size = 10\n",
        ));
        let err = report.errors().next().unwrap();
        assert_eq!(err.code, IssueCode::Conflict);
    }

    #[test]
    fn test_huge_margin_rejected() {
        let report = engine().validate(&config("[layout]\nmargin = 300\n"));
        assert_eq!(error_paths(&report), vec!["/layout/margin"]);
    }

    #[test]
    fn test_empty_font_candidates() {
        let report = engine().validate(&config("[font]\ncandidates = []\n"));
        assert_eq!(error_paths(&report), vec!["/font/candidates"]);
    }

    #[test]
    fn test_overlapping_lexicon() {
        let report = engine().validate(&config(
            "[lexicon]\nequipment = [\"电脑\"]\nproblems = [\"电脑\", \"坏\"]\n",
        ));
        assert_eq!(error_paths(&report), vec!["/lexicon"]);
    }

    #[test]
    fn test_empty_lexicon_override() {
        let report = engine().validate(&config("[lexicon]\nproblems = []\n"));
        assert_eq!(error_paths(&report), vec!["/lexicon/problems"]);
    }

    // ─── Warnings ───────────────────────────────────────────────────────

    #[test]
    fn test_oversized_max_font_is_warning() {
        let report = engine().validate(&config("[layout]\nmax_font_size = 1000\n"));
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_unknown_fields_lenient() {
        let report = engine().validate(&config("colour = 1\n[canvas]\ndpi = 2\n"));
        assert!(report.is_valid());
        let paths: Vec<_> = report.warnings().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["/colour", "/canvas/dpi"]);
    }

    #[test]
    fn test_unknown_fields_strict() {
        let report = engine().validate(&config("strict = true\n[layout]\nspiral = 2\n"));
        assert_eq!(error_paths(&report), vec!["/layout/spiral"]);
    }

    // ─── Report shape ───────────────────────────────────────────────────

    #[test]
    fn test_issue_display_and_json() {
        let issue = ConfigIssue::new(IssueCode::Missing, "/font/candidates", "none")
            .with_hint("add one");
        assert_eq!(issue.to_string(), "/font/candidates: none [missing] (add one)");

        let json = serde_json::to_value(ValidationDiagnostic::error(issue)).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "missing");
        assert_eq!(json["path"], "/font/candidates");
    }

    #[test]
    fn test_custom_rule() {
        struct SquareCanvas;
        impl ConfigRule for SquareCanvas {
            fn name(&self) -> &str {
                "square_canvas"
            }
            fn validate(&self, config: &WordCloudConfig) -> Vec<ValidationDiagnostic> {
                if config.canvas.width != config.canvas.height {
                    vec![ValidationDiagnostic::warning(ConfigIssue::new(
                        IssueCode::Conflict,
                        "/canvas",
                        "canvas is not square",
                    ))]
                } else {
                    vec![]
                }
            }
        }

        let mut engine = ConfigValidator::new();
        engine.add_rule(Box::new(SquareCanvas));
        let report = engine.validate(&WordCloudConfig::default());
        assert_eq!(report.len(), 1);
        assert!(report.is_valid());
    }
}
