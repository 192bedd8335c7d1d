//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Every hook has an empty default, so an observer only
//! implements what it cares about.

use std::time::{Duration, Instant};

use crate::pipeline::artifacts::TokenStream;
use crate::terms::frequency::FrequencyTable;

pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_SEGMENT: &str = "segment";
pub const STAGE_COMPOUND: &str = "compound";
pub const STAGE_FILTER: &str = "filter";
pub const STAGE_AGGREGATE: &str = "aggregate";
pub const STAGE_RENDER: &str = "render";

/// All stages, in execution order.
pub const STAGES: [&str; 6] = [
    STAGE_NORMALIZE,
    STAGE_SEGMENT,
    STAGE_COMPOUND,
    STAGE_FILTER,
    STAGE_AGGREGATE,
    STAGE_RENDER,
];

/// Wall-clock timer for one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// What a stage reports when it finishes.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    elapsed: Duration,
    items: Option<usize>,
    dropped: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of items the stage produced (characters, tokens, terms, ...).
    pub fn items(&self) -> Option<usize> {
        self.items
    }

    /// Number of items the stage discarded.
    pub fn dropped(&self) -> Option<usize> {
        self.dropped
    }
}

pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn items(mut self, items: usize) -> Self {
        self.report.items = Some(items);
        self
    }

    pub fn dropped(mut self, dropped: usize) -> Self {
        self.report.dropped = Some(dropped);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

/// Callbacks fired while a batch moves through the pipeline.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Segmenter output.
    fn on_tokens(&mut self, _tokens: &TokenStream) {}

    /// Terms after compounding and filtering.
    fn on_terms(&mut self, _terms: &[String]) {}

    fn on_table(&mut self, _table: &FrequencyTable) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Records the report of every finished stage.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        tracing::debug!(stage, elapsed_us = report.elapsed().as_micros() as u64, "stage finished");
        self.reports.push((stage, report.clone()));
    }
}
