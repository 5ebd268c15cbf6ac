//! Reference data compiled into the binary.

use archery_core::{ClassificationTable, RoundCatalog, ScoringConfig};

use crate::loaders::{
    ClassificationLoader, ConfigLoader, LoadResult, ReferenceData, RoundLoader,
};
use crate::progress::ProgressSink;

const ROUND_FILES: &[(&str, &str)] = &[
    ("bray_i.json", include_str!("../../data/rounds/bray_i.json")),
    ("hereford.json", include_str!("../../data/rounds/hereford.json")),
    ("national.json", include_str!("../../data/rounds/national.json")),
    ("portsmouth.json", include_str!("../../data/rounds/portsmouth.json")),
    ("wa_1440.json", include_str!("../../data/rounds/wa_1440.json")),
    ("wa_18.json", include_str!("../../data/rounds/wa_18.json")),
    ("wa_50_compound.json", include_str!("../../data/rounds/wa_50_compound.json")),
    ("wa_720.json", include_str!("../../data/rounds/wa_720.json")),
    ("worcester.json", include_str!("../../data/rounds/worcester.json")),
    ("york.json", include_str!("../../data/rounds/york.json")),
];

const CLASSIFICATION: &str = include_str!("../../data/classification.toml");
const CONFIG: &str = include_str!("../../data/config.toml");

/// Default rounds, classification tables and config shipped with the crate.
pub struct BundledContent;

impl BundledContent {
    pub fn round_files() -> impl Iterator<Item = (&'static str, &'static str)> {
        ROUND_FILES.iter().copied()
    }

    pub fn rounds(sink: &mut impl ProgressSink) -> LoadResult<RoundCatalog> {
        RoundLoader::load_sources(Self::round_files(), sink)
    }

    pub fn classifications(rounds: &RoundCatalog) -> LoadResult<ClassificationTable> {
        ClassificationLoader::parse(CLASSIFICATION, rounds)
    }

    pub fn config() -> LoadResult<ScoringConfig> {
        ConfigLoader::parse(CONFIG)
    }

    pub fn load(sink: &mut impl ProgressSink) -> LoadResult<ReferenceData> {
        let rounds = Self::rounds(sink)?;
        let classifications = Self::classifications(&rounds)?;
        Ok(ReferenceData {
            rounds,
            classifications,
            config: Self::config()?,
        })
    }
}
