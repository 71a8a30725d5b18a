use std::fs;
use std::path::{Path, PathBuf};

use sands_engine::{LayoutError, WorldLayout};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum WorldFileError {
    #[error("read world file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse world file '{}' at {at}: {source}", path.display())]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid world file '{}': {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: LayoutError,
    },
}

pub(crate) fn load_world_layout(path: &Path) -> Result<WorldLayout, WorldFileError> {
    let raw = fs::read_to_string(path).map_err(|source| WorldFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = parse_world_layout(path, &raw)?;
    layout
        .validate()
        .map_err(|source| WorldFileError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(layout)
}

fn parse_world_layout(path: &Path, raw: &str) -> Result<WorldLayout, WorldFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let layout = serde_path_to_error::deserialize::<_, WorldLayout>(&mut deserializer).map_err(
        |error| {
            let at = match error.path().to_string() {
                at if at.is_empty() || at == "." => "<root>".to_string(),
                at => at,
            };
            WorldFileError::Parse {
                path: path.to_path_buf(),
                at,
                source: error.into_inner(),
            }
        },
    )?;
    deserializer
        .end()
        .map_err(|source| WorldFileError::Parse {
            path: path.to_path_buf(),
            at: "<root>".to_string(),
            source,
        })?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use sands_engine::BuildingKind;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_world(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write world");
        file
    }

    #[test]
    fn loads_a_complete_world_file() {
        let file = write_world(
            r#"{
                "player_name": "Wanderer",
                "player_spawn": [1.0, 0.8, 2.0],
                "buildings": [{
                    "name": "well",
                    "kind": "market_stall",
                    "position": [4.0, 0.0, 4.0],
                    "footprint": { "origin_x": 3.0, "origin_z": 3.0, "width": 2.0, "depth": 2.0 }
                }],
                "npcs": [{ "name": "Guard", "position": [0.0, 0.8, 6.0], "speech": "Halt!" }],
                "greetings": [{ "speaker": "Guard", "text": "Move along." }]
            }"#,
        );

        let layout = load_world_layout(file.path()).expect("layout");

        assert_eq!(layout.player_name, "Wanderer");
        assert_eq!(layout.buildings.len(), 1);
        assert_eq!(layout.buildings[0].kind, BuildingKind::MarketStall);
        assert_eq!(layout.npcs[0].speech, "Halt!");
        assert_eq!(layout.greetings[0].text, "Move along.");
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let file = write_world(r#"{ "player_name": "Solo", "player_spawn": [0.0, 0.8, 0.0] }"#);
        let layout = load_world_layout(file.path()).expect("layout");
        assert!(layout.buildings.is_empty());
        assert!(layout.npcs.is_empty());
        assert!(layout.greetings.is_empty());
    }

    #[test]
    fn parse_errors_report_the_json_path() {
        let file = write_world(
            r#"{
                "player_name": "Wanderer",
                "player_spawn": [0.0, 0.8, 0.0],
                "npcs": [
                    { "name": "Guard", "position": [0.0, 0.8, 6.0], "speech": "Halt!" },
                    { "name": "Baker", "position": [0.0, "high", 6.0], "speech": "Bread!" }
                ]
            }"#,
        );

        let err = load_world_layout(file.path()).expect_err("bad coordinate");
        match err {
            WorldFileError::Parse { at, .. } => assert_eq!(at, "npcs[1].position[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_world(
            r#"{ "player_name": "A", "player_spawn": [0.0, 0.0, 0.0], "weather": "rain" }"#,
        );
        assert!(matches!(
            load_world_layout(file.path()),
            Err(WorldFileError::Parse { .. })
        ));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let file = write_world(r#"{ "player_name": "A", "player_spawn": [0.0, 0.0, 0.0] } {}"#);
        assert!(matches!(
            load_world_layout(file.path()),
            Err(WorldFileError::Parse { .. })
        ));
    }

    #[test]
    fn validation_failures_are_reported() {
        let file = write_world(
            r#"{
                "player_name": "A",
                "player_spawn": [0.0, 0.0, 0.0],
                "buildings": [{
                    "name": "shed",
                    "kind": "house",
                    "position": [0.0, 0.0, 0.0],
                    "footprint": { "origin_x": 0.0, "origin_z": 0.0, "width": 0.0, "depth": 2.0 }
                }]
            }"#,
        );

        let err = load_world_layout(file.path()).expect_err("zero width");
        assert!(matches!(
            err,
            WorldFileError::Invalid {
                source: LayoutError::InvalidFootprint { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("shed"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_world_layout(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(err, WorldFileError::Read { .. }));
    }
}
