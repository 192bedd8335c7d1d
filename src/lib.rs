//! ticket-wordcloud
//!
//! Term extraction and word cloud rendering for Chinese maintenance tickets.
//!
//! Free-text problem descriptions are normalized, segmented with a
//! lexicon-biased dictionary, merged into equipment+problem compounds,
//! filtered, counted and laid out as a frequency-weighted word cloud.
//!
//! ```no_run
//! use ticket_wordcloud::{WordCloudConfig, WordCloudEngine};
//!
//! let engine = WordCloudEngine::from_config(WordCloudConfig::default())?;
//! let output = engine.process_batch(&["空调漏水，需要维修", "电脑无法开机"])?;
//! for entry in &output.ranked_terms {
//!     println!("{} {}", entry.term, entry.count);
//! }
//! let png = output.image.to_png()?;
//! # Ok::<(), ticket_wordcloud::WordCloudError>(())
//! ```

pub mod config;
pub mod errors;
pub mod lexicon;
pub mod nlp;
pub mod payload;
pub mod pipeline;
pub mod render;
pub mod terms;
pub mod types;
pub mod upload;

pub use config::WordCloudConfig;
pub use errors::{ErrorKind, Result, WordCloudError};
pub use lexicon::{Lexicon, TermClass};
pub use pipeline::{BatchOutput, BatchStats, WordCloudEngine};
pub use render::{FontResource, RenderedImage};
pub use terms::{FrequencyEntry, FrequencyTable};
pub use types::{PosTag, Token};
