//! Pipeline runner: orchestrates stage execution and artifact flow.
//!
//! A [`WordCloudEngine`] owns everything that is built once per process: the
//! configuration, the lexicon, the segmenter dictionary and the glyph face.
//! [`WordCloudEngine::process_batch`] only borrows them, so one engine can
//! serve concurrent requests through a shared reference.
//!
//! # Static dispatch
//!
//! The engine is generic over the glyph face, the normalizer and the term
//! filter. The defaults ([`FontResource`], [`TicketNormalizer`],
//! [`NoiseTermFilter`]) cover the maintenance-ticket use case; tests and
//! embedders can swap any of them without boxing.

use crate::config::{WordCloudConfig, MAX_WORDS_LIMIT};
use crate::errors::{Result, WordCloudError};
use crate::lexicon::Lexicon;
use crate::nlp::{Segmenter, TicketNormalizer};
use crate::pipeline::artifacts::{BatchOutput, BatchStats};
use crate::pipeline::observer::{
    NoopObserver, PipelineObserver, StageClock, StageReportBuilder, STAGE_AGGREGATE,
    STAGE_COMPOUND, STAGE_FILTER, STAGE_NORMALIZE, STAGE_RENDER, STAGE_SEGMENT,
};
use crate::pipeline::traits::{TermFilter, TextNormalizer};
use crate::render::font::{FontResource, GlyphFace};
use crate::render::Renderer;
use crate::terms::compound::CompoundBuilder;
use crate::terms::filter::NoiseTermFilter;
use crate::terms::frequency::FrequencyTable;

/// Enter a tracing span for a pipeline stage; it closes at the end of the
/// enclosing block.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// Terms and counters produced by the text half of the pipeline.
#[derive(Debug, Clone)]
pub struct TermExtraction {
    pub table: FrequencyTable,
    pub stats: BatchStats,
}

// ============================================================================
// WordCloudEngine: process-wide state + per-request execution
// ============================================================================

pub struct WordCloudEngine<F = FontResource, N = TicketNormalizer, TF = NoiseTermFilter> {
    config: WordCloudConfig,
    lexicon: Lexicon,
    segmenter: Segmenter,
    normalizer: N,
    filter: TF,
    face: F,
}

impl<F, N, TF> std::fmt::Debug for WordCloudEngine<F, N, TF> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordCloudEngine")
            .field("lexicon_terms", &self.lexicon.len())
            .field("segmenter", &self.segmenter)
            .finish_non_exhaustive()
    }
}

impl WordCloudEngine {
    /// Build the lexicon, the segmenter dictionary and locate the font.
    ///
    /// Fails with a configuration error for an invalid config and with a
    /// resource error when no usable font is found.
    pub fn from_config(config: WordCloudConfig) -> Result<Self> {
        config.validate()?;
        let lexicon = config.lexicon.build()?;
        let font = FontResource::locate(&config.font)?;
        Ok(WordCloudEngine::with_face(config, lexicon, font))
    }
}

impl<F: GlyphFace> WordCloudEngine<F> {
    /// Assemble an engine around an already-loaded glyph face.
    pub fn with_face(config: WordCloudConfig, lexicon: Lexicon, face: F) -> Self {
        let segmenter = Segmenter::new(&lexicon, &config.segmenter);
        WordCloudEngine {
            config,
            lexicon,
            segmenter,
            normalizer: TicketNormalizer,
            filter: NoiseTermFilter::new(),
            face,
        }
    }
}

impl<F, N, TF> WordCloudEngine<F, N, TF> {
    /// Replace the normalizer stage.
    pub fn with_normalizer<N2: TextNormalizer>(self, normalizer: N2) -> WordCloudEngine<F, N2, TF> {
        WordCloudEngine {
            config: self.config,
            lexicon: self.lexicon,
            segmenter: self.segmenter,
            normalizer,
            filter: self.filter,
            face: self.face,
        }
    }

    /// Replace the term filter stage.
    pub fn with_filter<TF2: TermFilter>(self, filter: TF2) -> WordCloudEngine<F, N, TF2> {
        WordCloudEngine {
            config: self.config,
            lexicon: self.lexicon,
            segmenter: self.segmenter,
            normalizer: self.normalizer,
            filter,
            face: self.face,
        }
    }

    pub fn config(&self) -> &WordCloudConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn face(&self) -> &F {
        &self.face
    }
}

impl<F, N, TF> WordCloudEngine<F, N, TF>
where
    F: GlyphFace,
    N: TextNormalizer,
    TF: TermFilter,
{
    /// Turn ticket descriptions into a word cloud and a ranked term list.
    ///
    /// All-or-nothing: any stage error is returned unchanged and nothing
    /// computed before it is kept.
    pub fn process_batch<S: AsRef<str>>(&self, descriptions: &[S]) -> Result<BatchOutput> {
        self.process_batch_observed(descriptions, &mut NoopObserver)
    }

    /// [`process_batch`](Self::process_batch) with stage callbacks.
    pub fn process_batch_observed<S: AsRef<str>>(
        &self,
        descriptions: &[S],
        observer: &mut impl PipelineObserver,
    ) -> Result<BatchOutput> {
        let TermExtraction { table, stats } = self.extract_terms_observed(descriptions, observer)?;

        let image = {
            trace_stage!(STAGE_RENDER);
            observer.on_stage_start(STAGE_RENDER);
            let clock = StageClock::start();
            let renderer = Renderer::new(&self.config.canvas, &self.config.layout);
            let image = renderer.render(&table, &self.face)?;
            let candidates = table
                .len()
                .min(self.config.layout.max_words)
                .min(MAX_WORDS_LIMIT);
            let report = StageReportBuilder::new(clock.elapsed())
                .items(image.placed_terms().len())
                .dropped(candidates - image.placed_terms().len())
                .build();
            observer.on_stage_end(STAGE_RENDER, &report);
            image
        };

        Ok(BatchOutput {
            image,
            ranked_terms: table.top(self.config.output.ranked_terms_limit),
            stats,
        })
    }

    /// Run every stage up to and including aggregation.
    pub fn extract_terms<S: AsRef<str>>(&self, descriptions: &[S]) -> Result<TermExtraction> {
        self.extract_terms_observed(descriptions, &mut NoopObserver)
    }

    pub fn extract_terms_observed<S: AsRef<str>>(
        &self,
        descriptions: &[S],
        observer: &mut impl PipelineObserver,
    ) -> Result<TermExtraction> {
        if descriptions.is_empty() {
            tracing::warn!("batch has no descriptions");
            return Err(WordCloudError::EmptyBatch);
        }

        let mut stats = BatchStats {
            descriptions: descriptions.len(),
            ..BatchStats::default()
        };

        let text = descriptions
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");
        if text.trim().is_empty() {
            tracing::warn!("description text is empty");
            return Err(WordCloudError::EmptyText);
        }

        // Stage 0: Normalize
        let normalized = {
            trace_stage!(STAGE_NORMALIZE);
            observer.on_stage_start(STAGE_NORMALIZE);
            let clock = StageClock::start();
            let normalized = self.normalizer.normalize(&text).into_owned();
            stats.normalized_chars = normalized.chars().count();
            let report = StageReportBuilder::new(clock.elapsed())
                .items(stats.normalized_chars)
                .build();
            observer.on_stage_end(STAGE_NORMALIZE, &report);
            normalized
        };
        tracing::info!(chars = stats.normalized_chars, "normalized text");
        if normalized.is_empty() {
            tracing::warn!("description text is empty after normalization");
            return Err(WordCloudError::EmptyText);
        }

        // Stage 1: Segment
        let tokens = {
            trace_stage!(STAGE_SEGMENT);
            observer.on_stage_start(STAGE_SEGMENT);
            let clock = StageClock::start();
            let tokens = self.segmenter.segment(&normalized);
            stats.tokens = tokens.len();
            let report = StageReportBuilder::new(clock.elapsed())
                .items(tokens.len())
                .build();
            observer.on_stage_end(STAGE_SEGMENT, &report);
            observer.on_tokens(&tokens);
            tokens
        };

        // Stage 2: Compound (noun/verb tokens only)
        let compounds = {
            trace_stage!(STAGE_COMPOUND);
            observer.on_stage_start(STAGE_COMPOUND);
            let clock = StageClock::start();
            let content = tokens.content_terms();
            stats.content_tokens = content.len();
            let compounds = CompoundBuilder::new(&self.lexicon).build(&content);
            stats.compound_terms = compounds.len();
            let report = StageReportBuilder::new(clock.elapsed())
                .items(compounds.len())
                .build();
            observer.on_stage_end(STAGE_COMPOUND, &report);
            compounds
        };

        // Stage 3: Filter
        let terms = {
            trace_stage!(STAGE_FILTER);
            observer.on_stage_start(STAGE_FILTER);
            let clock = StageClock::start();
            let before = compounds.len();
            let terms = self.filter.filter_terms(compounds);
            stats.filtered_terms = terms.len();
            let report = StageReportBuilder::new(clock.elapsed())
                .items(terms.len())
                .dropped(before - terms.len())
                .build();
            observer.on_stage_end(STAGE_FILTER, &report);
            observer.on_terms(&terms);
            terms
        };

        // Stage 4: Aggregate
        let table = {
            trace_stage!(STAGE_AGGREGATE);
            observer.on_stage_start(STAGE_AGGREGATE);
            let clock = StageClock::start();
            let table = FrequencyTable::aggregate(&terms);
            stats.distinct_terms = table.len();
            let report = StageReportBuilder::new(clock.elapsed())
                .items(table.len())
                .build();
            observer.on_stage_end(STAGE_AGGREGATE, &report);
            observer.on_table(&table);
            table
        };

        if table.is_empty() {
            tracing::warn!(descriptions = stats.descriptions, "no domain terms found");
            return Err(WordCloudError::NoTerms {
                descriptions: stats.descriptions,
            });
        }

        let top: Vec<(&str, usize)> = table
            .ranked()
            .take(self.config.output.log_top)
            .map(|e| (e.term.as_str(), e.count))
            .collect();
        tracing::info!(?top, distinct = table.len(), "top terms");

        Ok(TermExtraction { table, stats })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::pipeline::artifacts::TokenStream;
    use crate::pipeline::observer::{StageTimingObserver, STAGES};
    use crate::render::font::BlockFace;
    use std::sync::OnceLock;

    fn engine() -> &'static WordCloudEngine<BlockFace> {
        static ENGINE: OnceLock<WordCloudEngine<BlockFace>> = OnceLock::new();
        ENGINE.get_or_init(|| {
            WordCloudEngine::with_face(
                WordCloudConfig::default(),
                Lexicon::maintenance(),
                BlockFace,
            )
        })
    }

    fn count_of(output: &BatchOutput, term: &str) -> Option<usize> {
        output
            .ranked_terms
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.count)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let output = engine()
            .process_batch(&["空调漏水，需要维修", "电脑无法开机"])
            .unwrap();

        assert_eq!(count_of(&output, "空调漏水"), Some(1));
        assert_eq!(output.image.width(), 600);
        assert_eq!(output.image.height(), 400);
        assert!(!output.image.as_raw().is_empty());
        assert!(output.image.placed_terms().contains(&"空调漏水".to_string()));
    }

    #[test]
    fn test_counts_across_descriptions() {
        let output = engine()
            .process_batch(&["打印机卡纸", "打印机卡纸了", "空调漏水", "打印机 卡纸！"])
            .unwrap();
        assert_eq!(output.ranked_terms[0].term, "打印机卡纸");
        assert_eq!(output.ranked_terms[0].count, 3);
        assert_eq!(count_of(&output, "空调漏水"), Some(1));
        assert_eq!(output.stats.descriptions, 4);
    }

    #[test]
    fn test_adjective_tagged_problem_forms_compound() {
        let extraction = engine().extract_terms(&["电脑坏了", "开关坏了"]).unwrap();
        assert_eq!(extraction.table.count("电脑坏"), 1);
        assert_eq!(extraction.table.count("开关坏"), 1);
        assert_eq!(extraction.table.count("电脑"), 0);
    }

    #[test]
    fn test_ranked_terms_limited() {
        let engine = WordCloudEngine::with_face(
            WordCloudConfig {
                output: crate::config::OutputConfig {
                    ranked_terms_limit: 1,
                    ..Default::default()
                },
                ..WordCloudConfig::default()
            },
            Lexicon::maintenance(),
            BlockFace,
        );
        let output = engine.process_batch(&["空调漏水 电脑无法开机 电脑无法开机"]).unwrap();
        assert_eq!(output.ranked_terms.len(), 1);
        assert_eq!(output.ranked_terms[0].term, "电脑无法开机");
    }

    #[test]
    fn test_empty_batch_is_validation_error() {
        let err = engine().process_batch::<&str>(&[]).unwrap_err();
        assert!(matches!(err, WordCloudError::EmptyBatch));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_blank_text_is_validation_error() {
        let err = engine().process_batch(&["", "   "]).unwrap_err();
        assert!(matches!(err, WordCloudError::EmptyText));
    }

    #[test]
    fn test_punctuation_only_is_validation_error() {
        let err = engine().process_batch(&["，。！？", "---"]).unwrap_err();
        assert!(matches!(err, WordCloudError::EmptyText));
        assert!(err.is_validation());
    }

    #[test]
    fn test_no_domain_terms_is_validation_error() {
        let err = engine().process_batch(&["需要维修"]).unwrap_err();
        assert!(matches!(err, WordCloudError::NoTerms { descriptions: 1 }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_render_error_propagates() {
        struct NoGlyphs;
        impl GlyphFace for NoGlyphs {
            fn measure(&self, text: &str, _size: f32) -> Result<crate::render::TextExtent> {
                Err(WordCloudError::MissingGlyph {
                    term: text.to_string(),
                    ch: text.chars().next().unwrap_or(' '),
                })
            }
            fn draw(
                &self,
                text: &str,
                size: f32,
                _plot: &mut dyn FnMut(i32, i32, f32),
            ) -> Result<()> {
                self.measure(text, size).map(|_| ())
            }
        }

        let engine = WordCloudEngine::with_face(
            WordCloudConfig::default(),
            Lexicon::maintenance(),
            NoGlyphs,
        );
        let err = engine.process_batch(&["空调漏水"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);

        // Term extraction alone never touches the face.
        assert!(engine.extract_terms(&["空调漏水"]).is_ok());
    }

    #[test]
    fn test_observer_sees_every_stage() {
        let mut obs = StageTimingObserver::new();
        engine()
            .process_batch_observed(&["空调漏水", "照明灯不亮"], &mut obs)
            .unwrap();
        let names: Vec<&str> = obs.reports().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, STAGES.to_vec());

        let filter = obs.report(crate::pipeline::observer::STAGE_FILTER).unwrap();
        assert_eq!(filter.items(), Some(2));
        assert_eq!(filter.dropped(), Some(0));
    }

    #[test]
    fn test_observer_artifact_hooks() {
        #[derive(Default)]
        struct Capture {
            tokens: usize,
            terms: Vec<String>,
            distinct: usize,
        }
        impl PipelineObserver for Capture {
            fn on_tokens(&mut self, tokens: &TokenStream) {
                self.tokens = tokens.len();
            }
            fn on_terms(&mut self, terms: &[String]) {
                self.terms = terms.to_vec();
            }
            fn on_table(&mut self, table: &FrequencyTable) {
                self.distinct = table.len();
            }
        }

        let mut capture = Capture::default();
        engine()
            .extract_terms_observed(&["空调漏水", "空调漏水"], &mut capture)
            .unwrap();
        assert!(capture.tokens >= 4);
        assert_eq!(capture.terms, vec!["空调漏水", "空调漏水"]);
        assert_eq!(capture.distinct, 1);
    }

    #[test]
    fn test_custom_filter_is_used() {
        struct DropPrinter;
        impl TermFilter for DropPrinter {
            fn keep(&self, term: &str) -> bool {
                !term.starts_with("打印机")
            }
        }

        let engine = WordCloudEngine::with_face(
            WordCloudConfig::default(),
            Lexicon::maintenance(),
            BlockFace,
        )
        .with_filter(DropPrinter);
        let extraction = engine.extract_terms(&["打印机卡纸", "空调漏水"]).unwrap();
        assert_eq!(extraction.table.count("打印机卡纸"), 0);
        assert_eq!(extraction.table.count("空调漏水"), 1);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WordCloudEngine>();
        assert_send_sync::<WordCloudEngine<BlockFace>>();
    }

    #[test]
    fn test_deterministic_output() {
        let batch = ["空调漏水", "电脑无法开机", "打印机卡纸", "空调漏水"];
        let a = engine().process_batch(&batch).unwrap();
        let b = engine().process_batch(&batch).unwrap();
        assert_eq!(a.ranked_terms, b.ranked_terms);
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }
}
