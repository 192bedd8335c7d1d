//! First-class pipeline artifacts.
//!
//! Each type is a typed intermediate (or final) result flowing between
//! pipeline stages. All of them are created per request and dropped once the
//! response is built.

use serde::Serialize;

use crate::render::RenderedImage;
use crate::terms::frequency::FrequencyEntry;
use crate::types::{PosTag, Token};

/// Tagged tokens produced by the segmenter.
///
/// Materialized, so it can be iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surfaces of noun-like and verb-like tokens, in order.
    pub fn content_terms(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.pos.is_content())
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Number of tokens with the given coarse tag.
    pub fn count_pos(&self, pos: PosTag) -> usize {
        self.tokens.iter().filter(|t| t.pos == pos).count()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Result of one `process_batch` call.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// The rendered word cloud
    pub image: RenderedImage,
    /// Highest-ranked terms, descending by count
    pub ranked_terms: Vec<FrequencyEntry>,
    /// Counters gathered along the way
    pub stats: BatchStats,
}

/// Per-request counters, useful for logging and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub descriptions: usize,
    pub normalized_chars: usize,
    pub tokens: usize,
    pub content_tokens: usize,
    pub compound_terms: usize,
    pub filtered_terms: usize,
    pub distinct_terms: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_terms_keep_nouns_and_verbs() {
        let stream = TokenStream::new(vec![
            Token::new("空调", "n"),
            Token::new("的", "uj"),
            Token::new("漏水", "v"),
            Token::new("很", "d"),
            Token::new("维修", "vn"),
        ]);
        assert_eq!(stream.content_terms(), vec!["空调", "漏水", "维修"]);
        assert_eq!(stream.count_pos(PosTag::Verb), 2);
        assert_eq!(stream.count_pos(PosTag::Other), 2);
    }

    #[test]
    fn test_stream_is_restartable() {
        let stream = TokenStream::new(vec![Token::new("电脑", "n"), Token::new("坏", "v")]);
        let first: Vec<_> = stream.iter().map(|t| t.text.clone()).collect();
        let second: Vec<_> = (&stream).into_iter().map(|t| t.text.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(stream.len(), 2);
    }
}
