//! Persistent key → JSON settings store.
//!
//! One JSON file holds everything keyed by deck short name: field
//! mappings and inspection snapshots. The store is opened once per run
//! and flushed after every mutation.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use packdrill_core::{FieldMapping, InspectionSnapshot};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read or write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode settings: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Open the settings file at `path`. A missing file starts empty; an
    /// unreadable one is logged and treated as empty rather than
    /// blocking every command.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!(path = %path.display(), "settings file is not a JSON object, starting fresh");
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        Self { path, values }
    }

    fn flush(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&Value::Object(self.values.clone()))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key, error = %err, "ignoring undecodable settings entry");
                None
            }
        }
    }

    fn set<T: serde::Serialize>(&mut self, key: String, value: &T) -> Result<(), SettingsError> {
        self.values.insert(key, serde_json::to_value(value)?);
        self.flush()
    }

    pub fn mapping_for(&self, short_name: &str) -> Option<FieldMapping> {
        self.get(&mapping_key(short_name))
    }

    pub fn set_mapping(
        &mut self,
        short_name: &str,
        mapping: &FieldMapping,
    ) -> Result<(), SettingsError> {
        self.set(mapping_key(short_name), mapping)
    }

    pub fn snapshot_for(&self, short_name: &str) -> Option<InspectionSnapshot> {
        self.get(&inspection_key(short_name))
    }

    pub fn set_snapshot(&mut self, snapshot: &InspectionSnapshot) -> Result<(), SettingsError> {
        self.set(inspection_key(&snapshot.short_name), snapshot)
    }
}

fn mapping_key(short_name: &str) -> String {
    format!("mapping:{short_name}")
}

fn inspection_key(short_name: &str) -> String {
    format!("inspection:{short_name}")
}
