//! Error types shared by every pipeline stage.
//!
//! Each [`WordCloudError`] variant belongs to one [`ErrorKind`], which tells
//! the caller how to react: fix the input, fix the deployment, or report a
//! rendering fault. No stage swallows an error; they propagate unchanged to
//! the caller of [`crate::WordCloudEngine::process_batch`].

use std::path::PathBuf;

use serde::Serialize;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or malformed input. Report to the data source, do not retry.
    Validation,
    /// A required resource (the font) is missing or unusable.
    Resource,
    /// Layout or rasterization failed.
    Render,
    /// The configuration file is invalid.
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Resource => "resource",
            Self::Render => "render",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while turning ticket descriptions into a word cloud.
#[derive(Debug, thiserror::Error)]
pub enum WordCloudError {
    #[error("no descriptions supplied")]
    EmptyBatch,

    #[error("description text is empty after normalization")]
    EmptyText,

    #[error("no domain terms found in {descriptions} description(s)")]
    NoTerms { descriptions: usize },

    #[error("payload is missing field `{0}`")]
    MissingField(String),

    #[error("payload rows are missing column `{0}`")]
    MissingColumn(String),

    #[error("no font found; tried {}", display_paths(.tried))]
    FontNotFound { tried: Vec<PathBuf> },

    #[error("failed to read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font {path} could not be parsed")]
    FontInvalid { path: PathBuf },

    #[error("font {path} has no CJK glyph coverage")]
    FontLacksCjk { path: PathBuf },

    #[error("font has no glyph for {ch:?} in term `{term}`")]
    MissingGlyph { term: String, ch: char },

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WordCloudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBatch
            | Self::EmptyText
            | Self::NoTerms { .. }
            | Self::MissingField(_)
            | Self::MissingColumn(_) => ErrorKind::Validation,
            Self::FontNotFound { .. }
            | Self::FontRead { .. }
            | Self::FontInvalid { .. }
            | Self::FontLacksCjk { .. } => ErrorKind::Resource,
            Self::MissingGlyph { .. } | Self::Encode(_) => ErrorKind::Render,
            Self::InvalidConfig(_) | Self::ConfigRead { .. } => ErrorKind::Config,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no candidates".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, WordCloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(WordCloudError::EmptyText.kind(), ErrorKind::Validation);
        assert_eq!(
            WordCloudError::FontNotFound { tried: vec![] }.kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            WordCloudError::MissingGlyph {
                term: "空调".into(),
                ch: '空'
            }
            .kind(),
            ErrorKind::Render
        );
        assert_eq!(
            WordCloudError::InvalidConfig("x".into()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_font_not_found_lists_candidates() {
        let err = WordCloudError::FontNotFound {
            tried: vec![PathBuf::from("a.ttc"), PathBuf::from("b.ttf")],
        };
        assert_eq!(err.to_string(), "no font found; tried a.ttc, b.ttf");
    }
}
