//! JSON-file-backed stand-in for the Apple Container runtime, for testing on
//! machines without the real binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SugarError};

pub const DEFAULT_STATE_FILE: &str = "apple_container_state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Created,
    Running,
    Stopped,
    Paused,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Running => "running",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// One simulated container. Timestamps are ISO-8601 strings, matching the
/// on-disk layout the real test fixtures expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub image: String,
    pub status: ContainerStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<String>,
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DummyState {
    containers: BTreeMap<String, ContainerRecord>,
    images: serde_json::Map<String, serde_json::Value>,
    networks: serde_json::Map<String, serde_json::Value>,
    volumes: serde_json::Map<String, serde_json::Value>,
}

/// In-memory container map persisted to a JSON file on every successful
/// mutation. Write-through, overwrite in place, no locking: the file is only
/// ever touched by a single process in test scenarios.
pub struct DummyRuntime {
    state_file: PathBuf,
    state: DummyState,
}

impl DummyRuntime {
    /// Open the runtime, loading any existing state file. An unreadable or
    /// corrupt file is treated as empty state rather than a fatal error.
    pub fn new(state_file: impl AsRef<Path>) -> Self {
        let state_file = state_file.as_ref().to_path_buf();
        let state = Self::load_state(&state_file);
        Self { state_file, state }
    }

    fn load_state(path: &Path) -> DummyState {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable state file");
                DummyState::default()
            }),
            Err(_) => DummyState::default(),
        }
    }

    fn save_state(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.state)
            .map_err(|e| SugarError::command_error(format!("Failed to serialize state: {}", e)))?;
        fs::write(&self.state_file, text).map_err(|e| {
            SugarError::command_error(format!(
                "Failed to save state to {}: {}",
                self.state_file.display(),
                e
            ))
        })
    }

    /// Create a container. Returns `false` if the name already exists.
    pub fn create(&mut self, name: &str, image: &str) -> Result<bool> {
        if self.state.containers.contains_key(name) {
            return Ok(false);
        }
        self.state.containers.insert(
            name.to_string(),
            ContainerRecord {
                image: image.to_string(),
                status: ContainerStatus::Created,
                created_at: now(),
                started_at: None,
                stopped_at: None,
                config: serde_json::Map::new(),
            },
        );
        self.save_state()?;
        Ok(true)
    }

    /// Start a container. Returns `false` if it does not exist.
    pub fn start(&mut self, name: &str) -> Result<bool> {
        let Some(record) = self.state.containers.get_mut(name) else {
            return Ok(false);
        };
        record.status = ContainerStatus::Running;
        record.started_at = Some(now());
        self.save_state()?;
        Ok(true)
    }

    /// Stop a container. Returns `false` if it does not exist.
    pub fn stop(&mut self, name: &str) -> Result<bool> {
        let Some(record) = self.state.containers.get_mut(name) else {
            return Ok(false);
        };
        record.status = ContainerStatus::Stopped;
        record.stopped_at = Some(now());
        self.save_state()?;
        Ok(true)
    }

    /// Pause a running container. Returns `false` if it does not exist.
    pub fn pause(&mut self, name: &str) -> Result<bool> {
        let Some(record) = self.state.containers.get_mut(name) else {
            return Ok(false);
        };
        record.status = ContainerStatus::Paused;
        self.save_state()?;
        Ok(true)
    }

    /// Unpause a container back to running. Returns `false` if it does not exist.
    pub fn unpause(&mut self, name: &str) -> Result<bool> {
        let Some(record) = self.state.containers.get_mut(name) else {
            return Ok(false);
        };
        record.status = ContainerStatus::Running;
        self.save_state()?;
        Ok(true)
    }

    /// Remove a container entirely. Returns `false` if it does not exist.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.state.containers.remove(name).is_none() {
            return Ok(false);
        }
        self.save_state()?;
        Ok(true)
    }

    pub fn get_container(&self, name: &str) -> Option<&ContainerRecord> {
        self.state.containers.get(name)
    }

    pub fn get_containers(&self) -> &BTreeMap<String, ContainerRecord> {
        &self.state.containers
    }

    /// Reset all state. Useful for tests.
    pub fn clean(&mut self) -> Result<()> {
        self.state = DummyState::default();
        self.save_state()
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn runtime(dir: &tempfile::TempDir) -> DummyRuntime {
        DummyRuntime::new(dir.path().join("state.json"))
    }

    #[test]
    fn create_twice_returns_true_then_false() {
        let dir = tempdir().unwrap();
        let mut rt = runtime(&dir);
        assert!(rt.create("c1", "img").unwrap());
        assert!(!rt.create("c1", "img").unwrap());
    }

    #[test]
    fn start_missing_container_returns_false() {
        let dir = tempdir().unwrap();
        let mut rt = runtime(&dir);
        assert!(!rt.start("missing").unwrap());
    }

    #[test]
    fn lifecycle_transitions_update_status_and_timestamps() {
        let dir = tempdir().unwrap();
        let mut rt = runtime(&dir);
        rt.create("c1", "img").unwrap();
        assert_eq!(rt.get_container("c1").unwrap().status, ContainerStatus::Created);

        rt.start("c1").unwrap();
        let record = rt.get_container("c1").unwrap();
        assert_eq!(record.status, ContainerStatus::Running);
        assert!(record.started_at.is_some());

        rt.pause("c1").unwrap();
        assert_eq!(rt.get_container("c1").unwrap().status, ContainerStatus::Paused);

        rt.unpause("c1").unwrap();
        assert_eq!(rt.get_container("c1").unwrap().status, ContainerStatus::Running);

        rt.stop("c1").unwrap();
        let record = rt.get_container("c1").unwrap();
        assert_eq!(record.status, ContainerStatus::Stopped);
        assert!(record.stopped_at.is_some());
    }

    #[test]
    fn remove_deletes_the_record() {
        let dir = tempdir().unwrap();
        let mut rt = runtime(&dir);
        rt.create("c1", "img").unwrap();
        assert!(rt.remove("c1").unwrap());
        assert!(rt.get_container("c1").is_none());
        assert!(!rt.remove("c1").unwrap());
    }

    #[test]
    fn state_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        {
            let mut rt = DummyRuntime::new(&path);
            rt.create("c1", "img").unwrap();
            rt.start("c1").unwrap();
        }
        let rt = DummyRuntime::new(&path);
        let record = rt.get_container("c1").unwrap();
        assert_eq!(record.status, ContainerStatus::Running);
        assert_eq!(record.image, "img");
    }

    #[test]
    fn corrupt_state_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let rt = DummyRuntime::new(&path);
        assert!(rt.get_containers().is_empty());
    }

    #[test]
    fn state_file_layout_has_all_top_level_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut rt = DummyRuntime::new(&path);
        rt.create("c1", "img").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        for key in ["containers", "images", "networks", "volumes"] {
            assert!(doc.get(key).is_some(), "missing top-level key {}", key);
        }
        assert_eq!(doc["containers"]["c1"]["status"], "created");
    }

    #[test]
    fn clean_resets_everything() {
        let dir = tempdir().unwrap();
        let mut rt = runtime(&dir);
        rt.create("c1", "img").unwrap();
        rt.clean().unwrap();
        assert!(rt.get_containers().is_empty());
    }
}
