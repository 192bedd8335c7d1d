//! Natural Language Processing components
//!
//! This module provides text normalization and lexicon-biased segmentation.

pub mod normalizer;
pub mod segmenter;

pub use normalizer::{normalize, TicketNormalizer};
pub use segmenter::Segmenter;
