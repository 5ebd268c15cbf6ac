//! Content factory for loading reference data from a data directory.

use std::path::{Path, PathBuf};

use archery_core::{ClassificationTable, RoundCatalog, ScoringConfig};
use tracing::info;

use crate::loaders::{ClassificationLoader, ConfigLoader, LoadResult, RoundLoader};
use crate::progress::{NoProgress, ProgressSink};

/// Everything needed to score sessions: rounds, classifications and config.
#[derive(Clone, Debug)]
pub struct ReferenceData {
    pub rounds: RoundCatalog,
    pub classifications: ClassificationTable,
    pub config: ScoringConfig,
}

/// Content factory that loads reference data from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml            (optional)
/// ├── classification.toml
/// └── rounds/
///     ├── york.json
///     └── wa_1440.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load scoring configuration from `config.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<ScoringConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(ScoringConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load round definitions from `rounds/`.
    pub fn load_rounds(&self, sink: &mut impl ProgressSink) -> LoadResult<RoundCatalog> {
        RoundLoader::load_dir_with_progress(&self.data_dir.join("rounds"), sink)
    }

    /// Load classification tables from `classification.toml`.
    pub fn load_classifications(&self, rounds: &RoundCatalog) -> LoadResult<ClassificationTable> {
        ClassificationLoader::load(&self.data_dir.join("classification.toml"), rounds)
    }

    /// Load the full reference data set.
    pub fn load_all(&self, sink: &mut impl ProgressSink) -> LoadResult<ReferenceData> {
        let rounds = self.load_rounds(sink)?;
        let classifications = self.load_classifications(&rounds)?;
        let config = self.load_config()?;
        info!(
            dir = %self.data_dir.display(),
            rounds = rounds.len(),
            thresholds = classifications.len(),
            "reference data loaded"
        );
        Ok(ReferenceData {
            rounds,
            classifications,
            config,
        })
    }

    pub fn load(&self) -> LoadResult<ReferenceData> {
        self.load_all(&mut NoProgress)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
