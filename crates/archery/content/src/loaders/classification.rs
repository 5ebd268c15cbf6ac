//! Classification table loader.
//!
//! ```toml
//! system = "agb2023"
//! official_rounds = ["York", "WA 1440"]
//!
//! [bowstyles.recurve]
//! datum = 30.0
//! class_step = 7.0
//! gender_step = 7.0
//! age_step = 6.0
//!
//! [[scores]]              # optional explicit rows, replacing derived ones
//! round = "Portsmouth"
//! bowstyle = "compound"
//! gender = "male"
//! age = "adult"
//! thresholds = [450, 480, 510, 530, 550, 565, 575, 585, 592]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use archery_core::{
    AgeCategory, ArcherProfile, Bowstyle, BowstyleParams, ClassHandicaps, Classification,
    ClassificationTable, Gender, HandicapSystem, RoundCatalog, Thresholds,
};
use serde::Deserialize;
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Deserialize)]
struct ClassificationFile {
    #[serde(default)]
    system: HandicapSystem,
    #[serde(default)]
    official_rounds: Vec<String>,
    #[serde(default)]
    bowstyles: BTreeMap<String, BowstyleParams>,
    #[serde(default)]
    scores: Vec<ScoreRow>,
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    round: String,
    bowstyle: String,
    gender: String,
    age: String,
    thresholds: Vec<u32>,
}

impl ScoreRow {
    fn profile(&self) -> LoadResult<ArcherProfile> {
        Ok(ArcherProfile {
            bowstyle: parse_named::<Bowstyle>("bowstyle", &self.bowstyle)?,
            gender: parse_named::<Gender>("gender", &self.gender)?,
            age: parse_named::<AgeCategory>("age category", &self.age)?,
        })
    }

    fn thresholds(&self) -> LoadResult<Thresholds> {
        let scores: [u32; Classification::COUNT] =
            self.thresholds.as_slice().try_into().map_err(|_| {
                anyhow::anyhow!(
                    "Expected {} thresholds for '{}', found {}",
                    Classification::COUNT,
                    self.round,
                    self.thresholds.len()
                )
            })?;
        Ok(Thresholds(scores))
    }
}

fn parse_named<T: std::str::FromStr>(kind: &str, name: &str) -> LoadResult<T> {
    name.parse()
        .map_err(|_| anyhow::anyhow!("Unknown {} '{}'", kind, name))
}

/// Loader for classification tables from TOML files.
pub struct ClassificationLoader;

impl ClassificationLoader {
    /// Parse class handicaps and score rows, deriving thresholds for `rounds`.
    pub fn parse(content: &str, rounds: &RoundCatalog) -> LoadResult<ClassificationTable> {
        let file: ClassificationFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse classification TOML: {}", e))?;

        let mut handicaps = ClassHandicaps::new(file.system);
        for (name, params) in &file.bowstyles {
            handicaps.insert(parse_named::<Bowstyle>("bowstyle", name)?, *params);
        }

        let mut table = ClassificationTable::derive(rounds, &handicaps);
        debug!(entries = table.len(), "derived classification thresholds");

        for row in &file.scores {
            table
                .insert_thresholds(&row.round, row.profile()?, row.thresholds()?)
                .with_context(|| format!("score row for '{}'", row.round))?;
        }
        for round in &file.official_rounds {
            table.mark_official(round);
        }
        Ok(table)
    }

    /// Load a classification TOML file.
    pub fn load(path: &Path, rounds: &RoundCatalog) -> LoadResult<ClassificationTable> {
        let content = read_file(path)?;
        Self::parse(&content, rounds).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archery_core::{ClassificationError, DistanceArrowCount, Face, RoundDefinition, RoundDistance};

    fn catalog() -> RoundCatalog {
        RoundCatalog::from_rounds([RoundDefinition {
            id: 1,
            display_name: "Portsmouth".into(),
            legacy_name: None,
            is_outdoor: false,
            is_metric: false,
            five_arrow_end: false,
            permitted_faces: vec![Face::Full, Face::Triple],
            sub_types: Vec::new(),
            arrow_counts: vec![DistanceArrowCount::new(1, 60.0, 60)],
            distances: vec![RoundDistance::new(1, 1, 20)],
        }])
        .unwrap()
    }

    const TABLE: &str = r#"
        system = "agb2023"
        official_rounds = ["Portsmouth"]

        [bowstyles.recurve]
        datum = 30.0
        class_step = 7.0
        gender_step = 7.0
        age_step = 6.0

        [[scores]]
        round = "Portsmouth"
        bowstyle = "compound"
        gender = "gents"
        age = "adult"
        thresholds = [450, 480, 510, 530, 550, 565, 575, 585, 592]
    "#;

    #[test]
    fn derives_and_overrides_thresholds() {
        let rounds = catalog();
        let table = ClassificationLoader::parse(TABLE, &rounds).unwrap();
        let round = rounds.get(1).unwrap();

        let compound = ArcherProfile {
            bowstyle: Bowstyle::Compound,
            gender: Gender::Male,
            age: AgeCategory::Adult,
        };
        let result = table.classify(580, round, &compound, None, None).unwrap();
        assert_eq!(result.classification, Classification::MasterBowman);
        assert!(result.is_official);

        let recurve = ArcherProfile {
            bowstyle: Bowstyle::Recurve,
            ..compound
        };
        assert!(table.thresholds(round, &recurve).unwrap().is_ascending());
    }

    #[test]
    fn rejects_wrong_threshold_count() {
        let broken = TABLE.replace("592]", "592, 600]");
        let err = ClassificationLoader::parse(&broken, &catalog()).unwrap_err();
        assert!(err.to_string().contains("Expected 9 thresholds"));
    }

    #[test]
    fn rejects_descending_thresholds() {
        let broken = TABLE.replace("[450, 480", "[490, 480");
        let err = ClassificationLoader::parse(&broken, &catalog()).unwrap_err();
        assert!(err.downcast_ref::<ClassificationError>().is_some());
    }

    #[test]
    fn rejects_unknown_bowstyle() {
        let broken = TABLE.replace("[bowstyles.recurve]", "[bowstyles.crossbow]");
        assert!(ClassificationLoader::parse(&broken, &catalog()).is_err());
    }
}
