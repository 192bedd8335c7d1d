//! Term construction and counting
//!
//! This module turns segmented tokens into domain terms: compound building,
//! noise filtering and frequency aggregation.

pub mod compound;
pub mod filter;
pub mod frequency;

pub use compound::CompoundBuilder;
pub use filter::NoiseTermFilter;
pub use frequency::{FrequencyEntry, FrequencyTable};
