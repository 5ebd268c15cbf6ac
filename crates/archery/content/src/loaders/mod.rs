//! Content loaders for reading reference data from files.
//!
//! Round definitions are JSON, classification tables and scoring config are
//! TOML. Every loader validates before returning: a caller either gets the
//! whole data set or an error.

pub mod bundled;
pub mod classification;
pub mod config;
pub mod factory;
pub mod rounds;

pub use bundled::BundledContent;
pub use classification::ClassificationLoader;
pub use config::ConfigLoader;
pub use factory::{ContentFactory, ReferenceData};
pub use rounds::{RoundDefinitionSource, RoundLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
