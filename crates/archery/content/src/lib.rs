//! Reference data for archery scoring and the loaders that read it.
//!
//! This crate ships the default data set and knows how to read it from disk:
//! - Round definitions (JSON, one round or a list per file)
//! - Classification handicaps and explicit score rows (TOML)
//! - Scoring configuration (TOML)
//!
//! Loading is all-or-nothing. Multi-file loads report progress through a
//! caller-owned [`ProgressSink`].

pub mod progress;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use progress::{LoadProgress, NoProgress, ProgressSink};

#[cfg(feature = "loaders")]
pub use loaders::{
    BundledContent, ClassificationLoader, ConfigLoader, ContentFactory, LoadResult,
    ReferenceData, RoundDefinitionSource, RoundLoader,
};
