use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::CardConfig;
use crate::domain::EntityState;
use crate::error::Result;
use crate::states::EntityStates;

pub fn load_config(path: &Path) -> Result<CardConfig> {
    let raw = fs::read_to_string(path)?;
    let config = CardConfig::from_toml_str(&raw)?;
    info!(path = %path.display(), entities = config.entities.len(), "loaded card config");
    Ok(config)
}

pub fn save_config(path: &Path, config: &CardConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

/// Entity states as exported by the host's `/api/states`. A missing or blank file means no states
/// yet. Entries that do not decode are skipped; only a file that is not a JSON array is an error.
pub fn load_states(path: &Path) -> Result<EntityStates> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(EntityStates::new()),
        Err(err) => return Err(err.into()),
    };

    if raw.trim().is_empty() {
        return Ok(EntityStates::new());
    }

    let entries: Vec<Value> = serde_json::from_str(&raw)?;
    let states: EntityStates = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<EntityState>(entry) {
            Ok(state) => Some(state),
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping undecodable entity state");
                None
            }
        })
        .collect();
    Ok(states)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{load_config, load_states, save_config};
    use crate::config::CardConfig;
    use crate::error::EpgError;
    use crate::states::StateLookup;

    #[test]
    fn round_trips_card_config() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("epg-card.toml");
        let config = CardConfig::new(vec!["sensor.tv1".to_string()])
            .expect("valid config")
            .with_row_height(75);

        save_config(&path, &config).expect("save should succeed");
        assert_eq!(load_config(&path).expect("load should succeed"), config);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = load_config(&dir.path().join("absent.toml")).expect_err("load should fail");
        assert!(matches!(err, EpgError::Io(_)));
    }

    #[test]
    fn missing_or_blank_states_file_is_empty() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("states.json");
        assert!(load_states(&path).expect("missing file is empty").is_empty());

        fs::write(&path, "  \n").expect("write blank file");
        assert!(load_states(&path).expect("blank file is empty").is_empty());
    }

    #[test]
    fn loads_host_states() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("states.json");
        fs::write(
            &path,
            r#"[{"entity_id": "sensor.tv1", "state": "on", "attributes": {"today": {"08:00": {"title": "A"}}}}]"#,
        )
        .expect("write states");

        let states = load_states(&path).expect("load should succeed");
        assert!(states.state("sensor.tv1").is_some());
    }

    #[test]
    fn foreign_and_malformed_entries_do_not_fail_the_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("states.json");
        fs::write(
            &path,
            r#"[
                {"entity_id": "tv1", "state": "on", "attributes": {"today": {"08:00": {"title": "A", "desc": null}}}},
                {"entity_id": "sensor.energy", "state": "4.7", "attributes": {"today": 4.7}},
                {"entity_id": "tv2", "attributes": {"today": {"09:00": {"title": ["not", "text"]}}}},
                42
            ]"#,
        )
        .expect("write states");

        let states = load_states(&path).expect("load should succeed");
        assert_eq!(states.len(), 3);

        let tv1 = states.state("tv1").expect("tv1 present");
        let today = tv1.attributes.today.as_ref().expect("tv1 schedule present");
        assert_eq!(today["08:00"].title, "A");
        assert_eq!(today["08:00"].desc, "");
        assert!(states.state("sensor.energy").expect("energy present").attributes.today.is_none());
        assert!(states.state("tv2").expect("tv2 present").attributes.today.is_none());
    }

    #[test]
    fn malformed_states_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("states.json");
        fs::write(&path, "[{").expect("write states");
        assert!(matches!(load_states(&path), Err(EpgError::StatesDecode(_))));

        fs::write(&path, r#"{"entity_id": "tv1"}"#).expect("write states");
        assert!(matches!(load_states(&path), Err(EpgError::StatesDecode(_))));
    }
}
