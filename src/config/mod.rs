//! Configuration types.
//!
//! A [`WordCloudConfig`] describes the canvas, layout limits, segmentation
//! weights, lexicon overrides, font candidates and response shaping. Every
//! field has a default, so an empty file is a valid configuration.
//!
//! # TOML shape
//!
//! ```toml
//! [canvas]
//! width = 600
//! height = 400
//!
//! [layout]
//! max_words = 50
//! seed = 42
//!
//! [font]
//! candidates = ["fonts/msyh.ttc"]
//! ```
//!
//! Loading runs the [`validation::ConfigValidator`]; any error-severity
//! diagnostic rejects the file.

pub mod validation;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WordCloudError};
use crate::lexicon::{Lexicon, DEFAULT_EQUIPMENT, DEFAULT_PROBLEMS};
use validation::ConfigValidator;

/// Hard cap on the number of terms drawn in one cloud.
pub const MAX_WORDS_LIMIT: usize = 50;

/// Column holding the free-text problem description in ticket payloads.
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "项目/问题点描述";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudConfig {
    pub canvas: CanvasConfig,
    pub layout: LayoutConfig,
    pub segmenter: SegmenterConfig,
    pub lexicon: LexiconConfig,
    pub font: FontConfig,
    pub output: OutputConfig,
    pub upload: UploadConfig,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, toml::Value>,
}

/// Output raster size and background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Background colour as `[r, g, b]`
    pub background: [u8; 3],

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, toml::Value>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            background: [255, 255, 255],
            unknown_fields: HashMap::new(),
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn shorter_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// Word selection, sizing and placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum number of terms drawn, at most [`MAX_WORDS_LIMIT`]
    pub max_words: usize,
    /// Smallest glyph size in pixels
    pub min_font_size: f32,
    /// Largest glyph size in pixels; defaults to the canvas's shorter side
    pub max_font_size: Option<f32>,
    /// How strongly count differences affect size (0 = rank only, 1 = linear)
    pub relative_scaling: f32,
    /// Padding kept around every placed term, in pixels
    pub margin: u32,
    /// Spiral steps tried before a term is dropped
    pub max_placement_attempts: usize,
    /// Seed for the placement RNG
    pub seed: u64,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, toml::Value>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_words: MAX_WORDS_LIMIT,
            min_font_size: 4.0,
            max_font_size: None,
            relative_scaling: 0.5,
            margin: 5,
            max_placement_attempts: 4000,
            seed: 42,
            unknown_fields: HashMap::new(),
        }
    }
}

/// Dictionary weighting for the segmenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Minimum dictionary frequency given to lexicon entries
    pub lexicon_weight: usize,
    /// Use the HMM to join runs of unknown characters
    pub hmm: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            lexicon_weight: 1000,
            hmm: true,
        }
    }
}

/// Optional replacements for the curated vocabularies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub equipment: Option<Vec<String>>,
    pub problems: Option<Vec<String>>,
}

impl LexiconConfig {
    /// Build the lexicon, falling back to the curated list for any side that
    /// is not overridden.
    pub fn build(&self) -> Result<Lexicon> {
        match (&self.equipment, &self.problems) {
            (None, None) => Ok(Lexicon::maintenance()),
            (Some(e), Some(p)) => Lexicon::new(e, p),
            (Some(e), None) => Lexicon::new(e, DEFAULT_PROBLEMS),
            (None, Some(p)) => Lexicon::new(DEFAULT_EQUIPMENT, p),
        }
    }
}

/// Where to look for a CJK-capable font.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Candidate paths, tried in order
    pub candidates: Vec<PathBuf>,
    /// Face index inside a font collection (`.ttc`)
    pub collection_index: u32,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, toml::Value>,
}

impl Default for FontConfig {
    fn default() -> Self {
        let mut candidates = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join("fonts").join("msyh.ttc"));
        }
        candidates.push(PathBuf::from("fonts/msyh.ttc"));
        candidates.push(PathBuf::from(
            "/usr/share/fonts/truetype/microsoft/microsoft-yahei.ttf",
        ));
        candidates.push(PathBuf::from("C:/Windows/Fonts/msyh.ttc"));

        Self {
            candidates,
            collection_index: 0,
            unknown_fields: HashMap::new(),
        }
    }
}

impl FontConfig {
    /// Try `path` before every configured candidate.
    pub fn prepend(&mut self, path: impl Into<PathBuf>) {
        self.candidates.insert(0, path.into());
    }
}

/// Response shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of ranked terms returned to the caller
    pub ranked_terms_limit: usize,
    /// Number of top terms written to the log
    pub log_top: usize,
    /// Payload column holding the description text
    pub description_column: String,
    /// Label echoed in the response
    pub ticket_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ranked_terms_limit: 20,
            log_top: 10,
            description_column: DEFAULT_DESCRIPTION_COLUMN.to_string(),
            ticket_type: "Maintenance".to_string(),
        }
    }
}

/// Image hosting endpoint. The key is never compiled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.imgbb.com/1/upload".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl WordCloudConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| WordCloudError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WordCloudError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Run the default rule set; warnings are logged, errors are returned.
    pub fn validate(&self) -> Result<()> {
        let report = ConfigValidator::with_defaults().validate(self);
        for warning in report.warnings() {
            tracing::warn!(%warning, "configuration warning");
        }
        if report.has_errors() {
            let messages: Vec<String> = report.errors().map(|e| e.to_string()).collect();
            return Err(WordCloudError::InvalidConfig(messages.join("; ")));
        }
        Ok(())
    }
}
