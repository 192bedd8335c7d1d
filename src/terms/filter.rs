//! Noise term filtering
//!
//! Drops bare measurements (`6mm`, `10cm`, `3.5`, `7g`) and single-character
//! terms. Length is counted in code points, so a lone CJK character is
//! dropped as well.

use regex::Regex;

use crate::pipeline::traits::TermFilter;

/// A number with an optional decimal part and an optional unit suffix.
pub const MEASUREMENT_PATTERN: &str = r"^\d+\.?\d*(?:mm|cm|kg|m|g)?$";

/// Default term filter for the maintenance pipeline.
#[derive(Debug, Clone)]
pub struct NoiseTermFilter {
    measurement: Regex,
}

impl Default for NoiseTermFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseTermFilter {
    pub fn new() -> Self {
        Self {
            // A literal pattern: compiling it cannot fail.
            measurement: Regex::new(MEASUREMENT_PATTERN).expect("measurement pattern is valid"),
        }
    }

    pub fn is_measurement(&self, term: &str) -> bool {
        self.measurement.is_match(term)
    }
}

impl TermFilter for NoiseTermFilter {
    fn keep(&self, term: &str) -> bool {
        if self.is_measurement(term) {
            return false;
        }
        let mut chars = term.chars();
        // Exactly one code point is too ambiguous on its own.
        !(chars.next().is_some() && chars.next().is_none())
    }
}

/// Stable filter with the default rules.
pub fn filter_terms(terms: Vec<String>) -> Vec<String> {
    NoiseTermFilter::new().filter_terms(terms)
}
