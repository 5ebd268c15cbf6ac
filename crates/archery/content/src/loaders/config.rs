//! Scoring configuration loader.

use std::path::Path;

use archery_core::ScoringConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for scoring configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse scoring configuration; missing keys take their defaults.
    pub fn parse(content: &str) -> LoadResult<ScoringConfig> {
        let config: ScoringConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.default_end_size == Some(0) {
            anyhow::bail!("default_end_size must be at least 1");
        }
        Ok(config)
    }

    /// Load scoring configuration from a TOML file.
    pub fn load(path: &Path) -> LoadResult<ScoringConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archery_core::{GoldsType, HandicapSystem};

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), ScoringConfig::default());
    }

    #[test]
    fn reads_every_field() {
        let config = ConfigLoader::parse(
            r#"
            handicap_system = "legacy"
            inner_ten_archer = true
            golds_override = "xs"
            default_end_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.handicap_system, HandicapSystem::Legacy);
        assert!(config.inner_ten_archer);
        assert_eq!(config.golds_override, Some(GoldsType::Xs));
        assert_eq!(config.default_end_size, Some(3));
    }

    #[test]
    fn rejects_zero_end_size() {
        assert!(ConfigLoader::parse("default_end_size = 0").is_err());
    }
}
