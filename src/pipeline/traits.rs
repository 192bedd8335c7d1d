//! Stage trait definitions for the pipeline.
//!
//! Each trait represents one pluggable stage boundary. Implementations are
//! statically dispatched; the defaults are zero-sized or hold only
//! precompiled state.

use std::borrow::Cow;

// ============================================================================
// TextNormalizer: raw text cleanup (stage 0)
// ============================================================================

/// Turns raw ticket text into segmentable text.
///
/// # Contract
///
/// - **Total**: defined for every input, including the empty string.
/// - **Idempotent**: `normalize(normalize(x)) == normalize(x)`.
pub trait TextNormalizer {
    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

// ============================================================================
// TermFilter: noise removal after compounding
// ============================================================================

/// Decides which compound terms survive into the frequency table.
///
/// `filter_terms` is a stable filter: kept terms stay in input order.
pub trait TermFilter {
    fn keep(&self, term: &str) -> bool;

    fn filter_terms(&self, terms: Vec<String>) -> Vec<String> {
        terms.into_iter().filter(|t| self.keep(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeepAll;

    impl TermFilter for KeepAll {
        fn keep(&self, _term: &str) -> bool {
            true
        }
    }

    struct DropAscii;

    impl TermFilter for DropAscii {
        fn keep(&self, term: &str) -> bool {
            !term.is_ascii()
        }
    }

    #[test]
    fn test_default_filter_terms_keeps_everything() {
        let terms = vec!["a".to_string(), "空调".to_string()];
        assert_eq!(KeepAll.filter_terms(terms.clone()), terms);
    }

    #[test]
    fn test_filter_terms_is_stable() {
        let terms: Vec<String> = ["电脑", "x", "空调", "y", "灯泡"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(DropAscii.filter_terms(terms), vec!["电脑", "空调", "灯泡"]);
    }

    #[test]
    fn test_filter_as_trait_object() {
        let filter: Box<dyn TermFilter> = Box::new(DropAscii);
        assert!(filter.keep("漏水"));
        assert!(!filter.keep("6mm"));
    }
}
