//! Lexicon-biased Chinese segmentation
//!
//! Wraps a jieba dictionary (DAG + maximum-probability path, optional HMM for
//! unknown runs) and loads every lexicon entry into it with a weight large
//! enough that a verbatim lexicon entry is always emitted whole.
//!
//! The dictionary is built once at startup; [`Segmenter::segment`] only reads
//! it, so one segmenter can be shared by reference across requests.

use jieba_rs::Jieba;
use rustc_hash::FxHashMap;

use crate::config::SegmenterConfig;
use crate::lexicon::{Lexicon, TermClass};
use crate::pipeline::artifacts::TokenStream;
use crate::types::Token;

/// Tag assigned to equipment entries in the dictionary.
pub const EQUIPMENT_TAG: &str = "n";
/// Tag assigned to problem entries in the dictionary.
pub const PROBLEM_TAG: &str = "v";

/// Dictionary-based segmenter with part-of-speech tagging.
pub struct Segmenter {
    jieba: Jieba,
    /// Lexicon surface -> forced tag. `add_word` keeps the bundled tag of a
    /// word jieba already knows, so lexicon tags are applied after tagging.
    lexicon_tags: FxHashMap<String, &'static str>,
    hmm: bool,
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("lexicon_terms", &self.lexicon_tags.len())
            .field("hmm", &self.hmm)
            .finish()
    }
}

impl Segmenter {
    /// Build a segmenter over jieba's bundled dictionary plus `lexicon`.
    pub fn new(lexicon: &Lexicon, config: &SegmenterConfig) -> Self {
        Self::with_dictionary(Jieba::new(), lexicon, config)
    }

    /// Build a segmenter on top of an already-loaded dictionary.
    pub fn with_dictionary(
        mut jieba: Jieba,
        lexicon: &Lexicon,
        config: &SegmenterConfig,
    ) -> Self {
        let mut lexicon_tags = FxHashMap::default();
        for (term, class) in lexicon.entries() {
            // suggest_freq is the smallest frequency that keeps `term` from
            // being split; never go below it.
            let freq = config.lexicon_weight.max(jieba.suggest_freq(term));
            let tag = match class {
                TermClass::Equipment => EQUIPMENT_TAG,
                TermClass::Problem => PROBLEM_TAG,
            };
            jieba.add_word(term, Some(freq), Some(tag));
            lexicon_tags.insert(term.to_string(), tag);
        }
        tracing::debug!(entries = lexicon.len(), hmm = config.hmm, "segmenter dictionary ready");

        Self {
            jieba,
            lexicon_tags,
            hmm: config.hmm,
        }
    }

    /// Segment and tag normalized text.
    ///
    /// Whitespace separators are not emitted as tokens. A token whose surface
    /// is a lexicon entry carries the lexicon tag, whatever jieba assigned.
    pub fn segment(&self, text: &str) -> TokenStream {
        let tokens = self
            .jieba
            .tag(text, self.hmm)
            .into_iter()
            .filter(|t| !t.word.trim().is_empty())
            .map(|t| {
                let tag = self.lexicon_tags.get(t.word).copied().unwrap_or(t.tag);
                Token::new(t.word, tag)
            })
            .collect();
        TokenStream::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PosTag;
    use std::sync::OnceLock;

    fn segmenter() -> &'static Segmenter {
        static SEGMENTER: OnceLock<Segmenter> = OnceLock::new();
        SEGMENTER.get_or_init(|| {
            Segmenter::new(&Lexicon::maintenance(), &SegmenterConfig::default())
        })
    }

    fn words(stream: &TokenStream) -> Vec<&str> {
        stream.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_lexicon_entries_kept_whole() {
        let stream = segmenter().segment("电脑无法开机");
        assert_eq!(words(&stream), vec!["电脑", "无法开机"]);
    }

    #[test]
    fn test_equipment_and_problem_tags() {
        let stream = segmenter().segment("空调漏水");
        let tokens: Vec<_> = stream.iter().collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "空调");
        assert_eq!(tokens[0].pos, PosTag::Noun);
        assert_eq!(tokens[1].text, "漏水");
        assert_eq!(tokens[1].pos, PosTag::Verb);
    }

    #[test]
    fn test_multi_character_entries_not_split() {
        for term in ["焊接车间", "停止工作", "连接异常", "打不开"] {
            let stream = segmenter().segment(term);
            assert_eq!(words(&stream), vec![term], "{term} was split");
        }
    }

    #[test]
    fn test_spaces_not_emitted() {
        let stream = segmenter().segment("空调 漏水");
        assert!(stream.iter().all(|t| !t.text.trim().is_empty()));
    }

    #[test]
    fn test_deterministic() {
        let a = segmenter().segment("打印机卡纸 需要维修 网线断裂");
        let b = segmenter().segment("打印机卡纸 需要维修 网线断裂");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lexicon_tag_overrides_dictionary_tag() {
        // jieba's bundled dictionary tags 坏 as an adjective.
        let stream = segmenter().segment("开关坏了");
        let tokens: Vec<_> = stream.iter().collect();
        assert_eq!(tokens[0].text, "开关");
        assert_eq!(tokens[0].pos, PosTag::Noun);
        assert_eq!(tokens[1].text, "坏");
        assert_eq!(tokens[1].tag, PROBLEM_TAG);
        assert_eq!(tokens[1].pos, PosTag::Verb);
    }

    #[test]
    fn test_every_lexicon_entry_is_content() {
        let lexicon = Lexicon::maintenance();
        for (term, class) in lexicon.entries() {
            let stream = segmenter().segment(term);
            let tokens: Vec<_> = stream.iter().collect();
            if tokens.len() != 1 {
                continue;
            }
            let expected = match class {
                TermClass::Equipment => PosTag::Noun,
                TermClass::Problem => PosTag::Verb,
            };
            assert_eq!(tokens[0].pos, expected, "{term} tagged {}", tokens[0].tag);
        }
    }

    #[test]
    fn test_dictionary_word_swallows_lexicon_entries() {
        // 灯不亮 is a single noun in the bundled dictionary.
        assert_eq!(words(&segmenter().segment("灯不亮")), vec!["灯不亮"]);
        assert_eq!(words(&segmenter().segment("照明灯不亮")), vec!["照明灯", "不亮"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(segmenter().segment("").is_empty());
    }
}
