//! Text normalization
//!
//! Replaces everything that is not alphanumeric or a CJK unified ideograph
//! with a space, collapses whitespace runs and trims the result.

use std::borrow::Cow;

use crate::pipeline::traits::TextNormalizer;

/// Is `c` in the CJK Unified Ideographs block (U+4E00..=U+9FFF)?
#[inline]
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[inline]
fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || is_cjk_ideograph(c)
}

/// Default normalizer used by the maintenance pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketNormalizer;

impl TextNormalizer for TicketNormalizer {
    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if is_normalized(text) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(normalize(text))
    }
}

/// Normalize `text`; see the module docs for the rules.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_kept(c) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// True if `normalize(text)` would return `text` unchanged.
fn is_normalized(text: &str) -> bool {
    let mut prev_space = true;
    for c in text.chars() {
        if c == ' ' {
            if prev_space {
                return false;
            }
            prev_space = true;
        } else if is_kept(c) {
            prev_space = false;
        } else {
            return false;
        }
    }
    // Empty text is normalized; otherwise it must not end with a space.
    text.is_empty() || !prev_space
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("空调漏水，需要维修"), "空调漏水 需要维修");
        assert_eq!(normalize("电脑!!无法开机。"), "电脑 无法开机");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize("  空调 \n\t 漏水  "), "空调 漏水");
        assert_eq!(normalize("a\u{3000}b"), "a b");
    }

    #[test]
    fn test_alphanumerics_kept() {
        assert_eq!(normalize("6mm螺丝-松动"), "6mm螺丝 松动");
        assert_eq!(normalize("PC_01"), "PC 01");
    }

    #[test]
    fn test_empty_and_noise_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("，。！？ --- \n"), "");
    }

    #[test]
    fn test_trait_borrows_when_already_normalized() {
        let n = TicketNormalizer;
        assert!(matches!(n.normalize("空调 漏水"), Cow::Borrowed(_)));
        assert!(matches!(n.normalize(""), Cow::Borrowed(_)));
        assert!(matches!(n.normalize("空调  漏水"), Cow::Owned(_)));
        assert!(matches!(n.normalize("空调 "), Cow::Owned(_)));
        assert_eq!(n.normalize("空调，漏水"), "空调 漏水");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_trait_agrees_with_function(s in "[ a-z，。\\n空调漏水]{0,24}") {
            prop_assert_eq!(TicketNormalizer.normalize(&s).into_owned(), normalize(&s));
        }

        #[test]
        fn prop_no_leading_trailing_or_double_spaces(s in "\\PC*") {
            let out = normalize(&s);
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }
    }
}
