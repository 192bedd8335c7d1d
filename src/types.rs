//! Core token types shared across the pipeline.

use serde::Serialize;

/// Coarse part-of-speech category.
///
/// Only the noun/verb distinction matters downstream; the tagger's raw tag is
/// kept on the [`Token`] for anyone who needs the finer grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Noun,
    Verb,
    Other,
}

impl PosTag {
    /// Map a jieba (ICTCLAS-style) tag to its coarse category.
    ///
    /// `n`, `nr`, `ns`, `nz`, ... are nouns; `v`, `vn`, `vd`, ... are verbs.
    pub fn from_tag(tag: &str) -> Self {
        match tag.as_bytes().first() {
            Some(b'n') => PosTag::Noun,
            Some(b'v') => PosTag::Verb,
            _ => PosTag::Other,
        }
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, PosTag::Noun)
    }

    pub fn is_verb(&self) -> bool {
        matches!(self, PosTag::Verb)
    }

    /// Noun-like or verb-like: the only tokens the compound builder sees.
    pub fn is_content(&self) -> bool {
        self.is_noun() || self.is_verb()
    }
}

/// A segmented unit of text with its part-of-speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Surface form as it appears in the normalized text
    pub text: String,
    /// Raw tag emitted by the tagger (e.g. `"n"`, `"vn"`, `"x"`)
    pub tag: String,
    /// Coarse category derived from `tag`
    pub pos: PosTag,
}

impl Token {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let pos = PosTag::from_tag(&tag);
        Self {
            text: text.into(),
            tag,
            pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_from_tag() {
        assert_eq!(PosTag::from_tag("n"), PosTag::Noun);
        assert_eq!(PosTag::from_tag("nz"), PosTag::Noun);
        assert_eq!(PosTag::from_tag("vn"), PosTag::Verb);
        assert_eq!(PosTag::from_tag("x"), PosTag::Other);
        assert_eq!(PosTag::from_tag(""), PosTag::Other);
    }

    #[test]
    fn test_token_derives_pos() {
        let token = Token::new("漏水", "v");
        assert!(token.pos.is_verb());
        assert!(token.pos.is_content());
        assert!(!Token::new("，", "x").pos.is_content());
    }
}
