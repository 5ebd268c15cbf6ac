//! Client configuration read from the environment.
use std::env;
use std::path::PathBuf;

use archery_core::HandicapSystem;

/// Settings shared by every command. Command-line flags override these.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    /// Reference data directory; the bundled data set is used when unset.
    pub data_dir: Option<PathBuf>,
    /// Session store directory; the platform data directory when unset.
    pub store_dir: Option<PathBuf>,
    pub handicap_system: Option<HandicapSystem>,
    pub inner_ten: Option<bool>,
    /// Enables file logging into this directory.
    pub log_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARCHERY_DATA_DIR` - Reference data directory (default: bundled data)
    /// - `ARCHERY_STORE_DIR` - Session store directory (default: platform-specific)
    /// - `ARCHERY_HANDICAP_SYSTEM` - `agb2023` or `legacy` (default: from config.toml)
    /// - `ARCHERY_INNER_TEN` - Score handicaps on the inner ten (default: from config.toml)
    /// - `ARCHERY_LOG_DIR` - Also write logs to `archery.log` in this directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.data_dir = env::var("ARCHERY_DATA_DIR").ok().map(PathBuf::from);
        config.store_dir = env::var("ARCHERY_STORE_DIR").ok().map(PathBuf::from);
        config.log_dir = env::var("ARCHERY_LOG_DIR").ok().map(PathBuf::from);

        config.handicap_system = read_env::<HandicapSystem>("ARCHERY_HANDICAP_SYSTEM");

        config.inner_ten = read_env_bool("ARCHERY_INNER_TEN");

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_ten_flag_accepts_common_spellings() {
        for value in ["true", "1", "YES", "on"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
    }

    #[test]
    fn unrecognised_flag_leaves_inner_ten_unset() {
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("maybe"), None);
    }
}
