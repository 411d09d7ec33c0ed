use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::domain::checkpoint::CheckpointSet;
use crate::domain::ticket::TicketId;
use crate::error::{AppError, AppResult};
use crate::services::CheckpointStore;

/// Checkpoint kept as a JSON array of identifier strings.
pub struct JsonFileCheckpointStore {
    file_path: PathBuf,
}

impl JsonFileCheckpointStore {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    fn read(&self) -> AppResult<Option<CheckpointSet>> {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AppError::Io(err)),
        };
        let values = serde_json::from_str::<Vec<Value>>(&contents)
            .map_err(|err| AppError::Checkpoint(format!("invalid checkpoint file: {err}")))?;
        // Older files may hold bare numbers; they share the canonical string form.
        values
            .iter()
            .map(|value| {
                TicketId::from_json(value).ok_or_else(|| {
                    AppError::Checkpoint(format!("invalid identifier in checkpoint: {value}"))
                })
            })
            .collect::<AppResult<CheckpointSet>>()
            .map(Some)
    }
}

impl CheckpointStore for JsonFileCheckpointStore {
    fn load(&self) -> CheckpointSet {
        match self.read() {
            Ok(Some(ids)) => {
                tracing::info!(
                    path = %self.file_path.display(),
                    count = ids.len(),
                    "loaded checkpoint"
                );
                ids
            }
            Ok(None) => {
                tracing::info!(
                    path = %self.file_path.display(),
                    "no checkpoint yet, starting empty"
                );
                CheckpointSet::new()
            }
            Err(err) => {
                tracing::error!(
                    path = %self.file_path.display(),
                    error = %err,
                    "failed to load checkpoint, starting empty"
                );
                CheckpointSet::new()
            }
        }
    }

    fn save(&self, ids: &CheckpointSet) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let ids: Vec<&TicketId> = ids.iter().collect();
        let data = serde_json::to_string_pretty(&ids)
            .map_err(|err| AppError::Checkpoint(format!("failed to encode checkpoint: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> CheckpointSet {
        values.iter().map(|value| TicketId::new(*value)).collect()
    }

    #[test]
    fn round_trips_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCheckpointStore::new(dir.path().join("state").join("ids.json"));
        let saved = ids(&["3", "1", "20"]);

        store.save(&saved).unwrap();
        assert_eq!(store.load(), saved);
    }

    #[test]
    fn writes_plain_string_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        let store = JsonFileCheckpointStore::new(path.clone());

        store.save(&ids(&["2", "1"])).unwrap();
        let raw: Vec<String> =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCheckpointStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), CheckpointSet::new());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(
            JsonFileCheckpointStore::new(path.clone()).load(),
            CheckpointSet::new()
        );

        fs::write(&path, r#"["1", {"id": 2}]"#).unwrap();
        assert_eq!(JsonFileCheckpointStore::new(path).load(), CheckpointSet::new());
    }

    #[test]
    fn accepts_numeric_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        fs::write(&path, "[1, \"2\"]").unwrap();
        assert_eq!(JsonFileCheckpointStore::new(path).load(), ids(&["1", "2"]));
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the write fail.
        let store = JsonFileCheckpointStore::new(dir.path().to_path_buf());
        assert!(store.save(&ids(&["1"])).is_err());
    }
}
