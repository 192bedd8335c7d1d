//! Request pipeline
//!
//! This module wires the stages together: normalize, segment, compound,
//! filter, aggregate and render. Stage seams are traits so individual stages
//! can be swapped without touching the runner.

pub mod artifacts;
pub mod observer;
pub mod runner;
pub mod traits;

pub use artifacts::{BatchOutput, BatchStats, TokenStream};
pub use observer::{NoopObserver, PipelineObserver, StageReport, StageTimingObserver};
pub use runner::{TermExtraction, WordCloudEngine};
pub use traits::{TermFilter, TextNormalizer};
