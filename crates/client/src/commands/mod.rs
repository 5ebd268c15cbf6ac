//! Command implementations for the `archery` binary.
//!
//! Each command is a separate module that implements its own CLI args and
//! execution logic. Shared reference-data loading and round lookup live here.

mod classify;
mod handicap;
mod remaining;
mod session;
mod table;
mod validate;

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use archery_content::{BundledContent, ContentFactory, LoadProgress, NoProgress};
use archery_core::{
    Face, HandicapOptions, HandicapTable, RoundCatalog, RoundDefinition, ScoringConfig,
};
use runtime::{FileScoringStore, OracleBundle};

use crate::config::CliConfig;

pub use classify::Classify;
pub use handicap::Handicap;
pub use remaining::Remaining;
pub use session::{DeleteCommand, EndCommand, NewSessionCommand, Score};
pub use table::Table;
pub use validate::Validate;

/// Case-insensitive value parser for the strum-backed enums.
pub fn parse_name<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| format!("unrecognised value '{}': {}", value, e))
}

/// Round selection shared by the lookup commands.
#[derive(clap::Args)]
pub struct RoundArgs {
    /// Round id or name (e.g. 10, york, "WA 18")
    #[arg(short, long, value_name = "ROUND")]
    round: String,

    /// Sub-type id (defaults to the round's first)
    #[arg(long, value_name = "ID")]
    sub_type: Option<u32>,

    /// Face shot (defaults to the round's primary face)
    #[arg(long, value_name = "FACE", value_parser = parse_name::<Face>)]
    face: Option<Face>,
}

impl RoundArgs {
    pub fn sub_type(&self) -> Option<u32> {
        self.sub_type
    }

    pub fn face(&self) -> Option<Face> {
        self.face
    }

    pub fn find<'a>(&self, rounds: &'a RoundCatalog) -> Result<&'a RoundDefinition> {
        find_round(rounds, &self.round)
    }

    /// Handicap table for the selected round, sub-type and face.
    pub fn handicap_table(
        &self,
        round: &RoundDefinition,
        config: &ScoringConfig,
    ) -> Result<HandicapTable> {
        let mut options = HandicapOptions::new(config.handicap_system)
            .with_sub_type(self.sub_type)
            .with_inner_ten(config.inner_ten_archer);
        if let Some(face) = &self.face {
            options = options.with_faces(std::slice::from_ref(face));
        }
        HandicapTable::try_new(round, &options).map_err(|missing| {
            anyhow::anyhow!("No handicap table for {}: {}", round.display_name, missing)
        })
    }
}

/// Looks a round up by numeric id, then by name.
pub fn find_round<'a>(rounds: &'a RoundCatalog, key: &str) -> Result<&'a RoundDefinition> {
    let found = match key.trim().parse::<u32>() {
        Ok(id) => rounds.get(id),
        Err(_) => rounds.find_by_name(key),
    };
    found.ok_or_else(|| {
        let known: Vec<String> = rounds
            .iter()
            .map(|round| format!("{} ({})", round.display_name, round.id))
            .collect();
        anyhow::anyhow!("Unknown round '{}'\n\nKnown rounds: {}", key, known.join(", "))
    })
}

/// Loads reference data and applies the configured scoring overrides.
pub fn load_reference(config: &CliConfig) -> Result<OracleBundle> {
    let mut data = match &config.data_dir {
        Some(dir) => {
            let mut progress = |progress: LoadProgress| {
                tracing::debug!(
                    "Loaded {} ({}/{})",
                    progress.current,
                    progress.loaded,
                    progress.total
                );
            };
            ContentFactory::new(dir)
                .load_all(&mut progress)
                .with_context(|| format!("Failed to load reference data from {}", dir.display()))?
        }
        None => BundledContent::load(&mut NoProgress).context("Failed to load bundled data")?,
    };

    if let Some(system) = config.handicap_system {
        data.config.handicap_system = system;
    }
    if let Some(inner_ten) = config.inner_ten {
        data.config.inner_ten_archer = inner_ten;
    }
    Ok(data.into())
}

/// Opens the session store named by the config, or the platform default.
pub fn open_store(config: &CliConfig) -> Result<FileScoringStore> {
    let store = match &config.store_dir {
        Some(dir) => FileScoringStore::new(dir),
        None => FileScoringStore::in_data_dir(),
    };
    store.context("Failed to open session store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use archery_core::{Bowstyle, HandicapSystem};

    fn rounds() -> RoundCatalog {
        BundledContent::rounds(&mut NoProgress).unwrap()
    }

    #[test]
    fn rounds_resolve_by_id_or_name() {
        let rounds = rounds();
        assert_eq!(find_round(&rounds, "10").unwrap().display_name, "York");
        assert_eq!(find_round(&rounds, "york").unwrap().id, 10);
        assert_eq!(find_round(&rounds, "WA 18m").unwrap().id, 21);
        assert!(find_round(&rounds, "nonexistent").is_err());
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            parse_name::<HandicapSystem>("Legacy").unwrap(),
            HandicapSystem::Legacy
        );
        assert_eq!(parse_name::<Bowstyle>("compound").unwrap(), Bowstyle::Compound);
        let err = parse_name::<Bowstyle>("crossbow").unwrap_err();
        assert!(err.contains("crossbow"), "{err}");
    }

    #[test]
    fn overrides_apply_to_loaded_config() {
        let config = CliConfig {
            handicap_system: Some(HandicapSystem::Legacy),
            inner_ten: Some(true),
            ..CliConfig::default()
        };
        let oracles = load_reference(&config).unwrap();
        assert_eq!(oracles.config.handicap_system, HandicapSystem::Legacy);
        assert!(oracles.config.inner_ten_archer);
    }
}
