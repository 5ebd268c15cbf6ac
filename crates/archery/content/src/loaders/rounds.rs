//! Round definition loader.
//!
//! Rounds are stored in the JSON source format: one round object, or an
//! array of them, per file. Each definition is converted and validated
//! before anything is admitted into a [`RoundCatalog`].

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use archery_core::round::DEFAULT_SUB_TYPE_ID;
use archery_core::{
    DistanceArrowCount, Face, RoundCatalog, RoundDefinition, RoundDistance, SubType,
    ValidationError, ValidationRule,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::loaders::{LoadResult, read_file};
use crate::progress::{LoadProgress, NoProgress, ProgressSink};

/// A round definition as it appears in data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDefinitionSource {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_round_name: Option<String>,
    pub id: u32,
    pub outdoor: bool,
    pub is_metric: bool,
    #[serde(default)]
    pub five_arrow_end: bool,
    #[serde(default)]
    pub permitted_faces: Vec<String>,
    #[serde(default)]
    pub round_sub_types: Vec<SubTypeSource>,
    #[serde(default)]
    pub round_arrow_counts: Vec<ArrowCountSource>,
    #[serde(default)]
    pub round_distances: Vec<DistanceSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTypeSource {
    pub id: u32,
    #[serde(default)]
    pub sub_type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gents_under: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ladies_under: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowCountSource {
    pub distance_number: u32,
    pub face_size_in_cm: f64,
    pub arrow_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceSource {
    pub distance_number: u32,
    #[serde(default = "default_sub_type_id")]
    pub round_sub_type_id: u32,
    pub distance: u32,
}

fn default_sub_type_id() -> u32 {
    DEFAULT_SUB_TYPE_ID
}

impl TryFrom<RoundDefinitionSource> for RoundDefinition {
    type Error = ValidationError;

    fn try_from(source: RoundDefinitionSource) -> Result<Self, Self::Error> {
        let permitted_faces = source
            .permitted_faces
            .iter()
            .map(|name| {
                name.parse::<Face>().map_err(|_| {
                    ValidationError::new(
                        source.display_name.clone(),
                        ValidationRule::UnknownFace(name.clone()),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let round = RoundDefinition {
            id: source.id,
            display_name: source.display_name,
            legacy_name: source.legacy_round_name,
            is_outdoor: source.outdoor,
            is_metric: source.is_metric,
            five_arrow_end: source.five_arrow_end,
            permitted_faces,
            sub_types: source
                .round_sub_types
                .into_iter()
                .map(|s| {
                    SubType::new(s.id, s.sub_type_name).with_age_limits(s.gents_under, s.ladies_under)
                })
                .collect(),
            arrow_counts: source
                .round_arrow_counts
                .into_iter()
                .map(|c| DistanceArrowCount::new(c.distance_number, c.face_size_in_cm, c.arrow_count))
                .collect(),
            distances: source
                .round_distances
                .into_iter()
                .map(|d| RoundDistance::new(d.distance_number, d.round_sub_type_id, d.distance))
                .collect(),
        };
        round.validate()?;
        Ok(round)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceFile {
    Many(Vec<RoundDefinitionSource>),
    One(Box<RoundDefinitionSource>),
}

/// Loader for round definitions from JSON files.
pub struct RoundLoader;

impl RoundLoader {
    /// Parse and validate every round in a JSON document.
    ///
    /// A validation failure is returned as a [`ValidationError`] wrapped in
    /// the `anyhow` error, so callers can downcast it.
    pub fn parse(content: &str) -> LoadResult<Vec<RoundDefinition>> {
        let file: SourceFile = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse round JSON: {}", e))?;
        let sources = match file {
            SourceFile::Many(sources) => sources,
            SourceFile::One(source) => vec![*source],
        };
        sources
            .into_iter()
            .map(|source| RoundDefinition::try_from(source).map_err(anyhow::Error::from))
            .collect()
    }

    /// Load the rounds in one JSON file.
    pub fn load(path: &Path) -> LoadResult<Vec<RoundDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Load every `*.json` file in a directory into a catalog.
    pub fn load_dir(dir: &Path) -> LoadResult<RoundCatalog> {
        Self::load_dir_with_progress(dir, &mut NoProgress)
    }

    /// Load every `*.json` file in a directory, reporting each file to `sink`.
    ///
    /// Files are read in name order. The first unreadable or invalid file
    /// aborts the load.
    pub fn load_dir_with_progress(
        dir: &Path,
        sink: &mut impl ProgressSink,
    ) -> LoadResult<RoundCatalog> {
        let paths = json_files(dir)?;
        let total = paths.len();
        let mut rounds = Vec::new();
        for (index, path) in paths.iter().enumerate() {
            rounds.extend(Self::load(path)?);
            debug!(file = %path.display(), "loaded round file");
            sink.report(LoadProgress {
                loaded: index + 1,
                total,
                current: file_name(path),
            });
        }
        let catalog = catalog_from(rounds)?;
        info!(rounds = catalog.len(), dir = %dir.display(), "round catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from named in-memory documents.
    pub fn load_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
        sink: &mut impl ProgressSink,
    ) -> LoadResult<RoundCatalog> {
        let sources: Vec<_> = sources.into_iter().collect();
        let total = sources.len();
        let mut rounds = Vec::new();
        for (index, (name, content)) in sources.into_iter().enumerate() {
            rounds.extend(Self::parse(content).with_context(|| format!("in {name}"))?);
            sink.report(LoadProgress {
                loaded: index + 1,
                total,
                current: name.to_string(),
            });
        }
        catalog_from(rounds)
    }
}

fn catalog_from(rounds: Vec<RoundDefinition>) -> LoadResult<RoundCatalog> {
    let mut catalog = RoundCatalog::new();
    for round in rounds {
        if let Some(existing) = catalog.get(round.id) {
            bail!(
                "Duplicate round id {} ('{}' and '{}')",
                round.id,
                existing.display_name,
                round.display_name
            );
        }
        catalog.insert(round)?;
    }
    Ok(catalog)
}

fn json_files(dir: &Path) -> LoadResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DISTANCE: &str = r#"{
        "displayName": "Short Metric",
        "id": 40,
        "outdoor": true,
        "isMetric": true,
        "permittedFaces": ["FULL"],
        "roundArrowCounts": [
            {"distanceNumber": 1, "faceSizeInCm": 80, "arrowCount": 36},
            {"distanceNumber": 2, "faceSizeInCm": 80, "arrowCount": 36}
        ],
        "roundDistances": [
            {"distanceNumber": 1, "distance": 50},
            {"distanceNumber": 2, "distance": 30}
        ]
    }"#;

    #[test]
    fn parses_single_round_with_default_sub_type() {
        let rounds = RoundLoader::parse(TWO_DISTANCE).unwrap();
        assert_eq!(rounds.len(), 1);
        let round = &rounds[0];
        assert_eq!(round.display_name, "Short Metric");
        assert!(round.distances.iter().all(|d| d.sub_type_id == 1));
        assert_eq!(round.total_arrows(), 72);
        assert_eq!(round.primary_face(), Face::Full);
    }

    #[test]
    fn rejects_inconsistent_round_with_validation_error() {
        let broken = TWO_DISTANCE.replace(r#"{"distanceNumber": 2, "distance": 30}"#, "")
            .replace("50},", "50}");
        let err = RoundLoader::parse(&broken).unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.round, "Short Metric");
        assert!(matches!(
            validation.rule,
            ValidationRule::DistanceCountMismatch { .. }
        ));
    }

    #[test]
    fn rejects_unknown_face() {
        let broken = TWO_DISTANCE.replace(r#"["FULL"]"#, r#"["SPOT"]"#);
        let err = RoundLoader::parse(&broken).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>().map(|e| &e.rule),
            Some(&ValidationRule::UnknownFace("SPOT".into()))
        );
    }

    #[test]
    fn duplicate_ids_abort_whole_load() {
        let mut seen = 0;
        let result = RoundLoader::load_sources(
            [("a.json", TWO_DISTANCE), ("b.json", TWO_DISTANCE)],
            &mut |_: LoadProgress| seen += 1,
        );
        assert!(result.is_err());
        assert_eq!(seen, 2);
    }

    #[test]
    fn loads_directory_in_name_order_with_progress() {
        let dir = tempfile::tempdir().unwrap();
        let second = TWO_DISTANCE.replace("\"id\": 40", "\"id\": 41").replace("Short Metric", "Other");
        std::fs::write(dir.path().join("b.json"), second).unwrap();
        std::fs::write(dir.path().join("a.json"), TWO_DISTANCE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let mut tx = tx;
        let catalog = RoundLoader::load_dir_with_progress(dir.path(), &mut tx).unwrap();
        assert_eq!(catalog.len(), 2);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].current, "a.json");
        assert!(events[1].is_finished());
    }

    #[test]
    fn converts_sub_type_age_limits() {
        let source = RoundDefinitionSource {
            display_name: "Junior".into(),
            legacy_round_name: Some("Junior Metric".into()),
            id: 3,
            outdoor: true,
            is_metric: true,
            five_arrow_end: false,
            permitted_faces: vec!["full".into()],
            round_sub_types: vec![
                SubTypeSource {
                    id: 1,
                    sub_type_name: "Open".into(),
                    gents_under: None,
                    ladies_under: None,
                },
                SubTypeSource {
                    id: 2,
                    sub_type_name: "Cadet".into(),
                    gents_under: Some(16),
                    ladies_under: Some(16),
                },
            ],
            round_arrow_counts: vec![ArrowCountSource {
                distance_number: 1,
                face_size_in_cm: 122.0,
                arrow_count: 36,
            }],
            round_distances: vec![
                DistanceSource {
                    distance_number: 1,
                    round_sub_type_id: 1,
                    distance: 70,
                },
                DistanceSource {
                    distance_number: 1,
                    round_sub_type_id: 2,
                    distance: 50,
                },
            ],
        };
        let round = RoundDefinition::try_from(source).unwrap();
        assert_eq!(round.sub_type(2).unwrap().gents_under_age, Some(16));
        assert_eq!(round.name_hint(), "juniormetric");
    }
}
