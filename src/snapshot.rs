//! Saved configuration snapshots
//!
//! Generated configurations can be kept under a name in a JSON file so a
//! later run can list, show or delete them.
//!
//! ```ignore
//! let mut store = SnapshotStore::open(".nacforge/snapshots.json")?;
//! let id = store.save("pilot", "first floor pilot", &config).id;
//! store.persist()?;
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::generator::{filename, sha256_hex, GeneratedConfig};

const FORMAT_VERSION: u32 = 1;

/// Errors raised by the snapshot store
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("no snapshot matches '{0}'")]
    NotFound(String),

    #[error("'{prefix}' matches {count} snapshots; use a longer id")]
    Ambiguous { prefix: String, count: usize },
}

/// Result type alias for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// A saved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub vendor: String,
    pub platform: String,
    #[serde(default)]
    pub filename: String,

    /// Rendered configuration text
    pub config: String,

    /// SHA-256 of `config`
    #[serde(default)]
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// First eight characters of the id, as shown in listings
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    /// Derive the filename and hash when a stored entry lacks them
    fn fill_derived(&mut self) {
        if self.filename.is_empty() {
            self.filename = filename(&self.vendor, &self.platform, self.timestamp.date_naive());
        }
        if self.hash.is_empty() {
            self.hash = sha256_hex(&self.config);
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    snapshots: Vec<Snapshot>,
}

/// Snapshots backed by one JSON file
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    /// Load the store; a missing file is an empty store
    ///
    /// Accepts the versioned format written by [`persist`](Self::persist)
    /// and a bare JSON array of snapshots.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let corrupt = |e: serde_json::Error| SnapshotError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        };
        let mut snapshots = match fs::read_to_string(&path) {
            Ok(content) => {
                let value: serde_json::Value = serde_json::from_str(&content).map_err(corrupt)?;
                if value.is_array() {
                    debug!(path = %path.display(), "reading bare snapshot array");
                    serde_json::from_value(value).map_err(corrupt)?
                } else {
                    let file: SnapshotFile = serde_json::from_value(value).map_err(corrupt)?;
                    if file.version != FORMAT_VERSION {
                        return Err(SnapshotError::Corrupt {
                            path,
                            message: format!("unsupported version {}", file.version),
                        });
                    }
                    file.snapshots
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot file yet");
                Vec::new()
            }
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        for snapshot in &mut snapshots {
            snapshot.fill_derived();
        }
        Ok(Self { path, snapshots })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a generated configuration; call [`persist`](Self::persist) to write it
    pub fn save(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        config: &GeneratedConfig,
    ) -> &Snapshot {
        let snapshot = Snapshot {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            vendor: config.vendor.clone(),
            platform: config.platform.clone(),
            filename: config.filename.clone(),
            config: config.content.clone(),
            hash: config.hash.clone(),
            timestamp: Utc::now(),
        };
        info!(id = %snapshot.id, name = %snapshot.name, "saved snapshot");
        self.snapshots.push(snapshot);
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Snapshots, oldest first
    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Find by full id or unique id prefix
    pub fn get(&self, id: &str) -> Result<&Snapshot> {
        let index = self.position(id)?;
        Ok(&self.snapshots[index])
    }

    pub fn remove(&mut self, id: &str) -> Result<Snapshot> {
        let index = self.position(id)?;
        let snapshot = self.snapshots.remove(index);
        info!(id = %snapshot.id, name = %snapshot.name, "removed snapshot");
        Ok(snapshot)
    }

    /// Write the store via a temporary file and rename
    pub fn persist(&self) -> Result<()> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SnapshotError::Io { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let file = SnapshotFile {
            version: FORMAT_VERSION,
            snapshots: self.snapshots.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| SnapshotError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;

        debug!(path = %self.path.display(), count = self.snapshots.len(), "persisted snapshots");
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize> {
        let wanted = id.trim().to_lowercase().replace('-', "");
        if wanted.is_empty() {
            return Err(SnapshotError::NotFound(id.to_string()));
        }

        let matches: Vec<usize> = self
            .snapshots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.id.simple().to_string().starts_with(&wanted))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(SnapshotError::NotFound(id.to_string())),
            many => Err(SnapshotError::Ambiguous {
                prefix: id.to_string(),
                count: many.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> GeneratedConfig {
        GeneratedConfig {
            vendor: "cisco".into(),
            platform: "ios-xe".into(),
            content: content.into(),
            filename: "cisco-ios-xe-dot1x-config-2024-03-01.txt".into(),
            hash: "abc".into(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("snapshots.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("snapshots.json");

        let mut store = SnapshotStore::open(&path).unwrap();
        let first = store.save("pilot", "first floor", &config("aaa new-model\n")).clone();
        store.save("rollout", "", &config("aaa new-model\n!\n"));
        store.persist().unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let mut reopened = SnapshotStore::open(&path).unwrap();
        assert_eq!(reopened.list().len(), 2);
        assert_eq!(reopened.get(&first.id.to_string()).unwrap(), &first);
        assert_eq!(reopened.get(&first.short_id()).unwrap().name, "pilot");

        let removed = reopened.remove(&first.short_id()).unwrap();
        assert_eq!(removed.id, first.id);
        reopened.persist().unwrap();

        let last = SnapshotStore::open(&path).unwrap();
        assert_eq!(last.list().len(), 1);
        assert_eq!(last.list()[0].name, "rollout");
    }

    #[test]
    fn test_open_accepts_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "6f1c2a4e-8d3b-4c1a-9e2f-0a1b2c3d4e5f",
                "name": "lab",
                "description": "bench switch",
                "vendor": "aruba",
                "platform": "aos-cx",
                "config": "aaa authentication port-access dot1x authenticator\n",
                "timestamp": "2024-03-01T09:30:00Z"
            }]"#,
        )
        .unwrap();

        let store = SnapshotStore::open(&path).unwrap();
        let s = store.get("6f1c2a4e").unwrap();
        assert_eq!(s.name, "lab");
        assert_eq!(s.filename, "aruba-aos-cx-dot1x-config-2024-03-01.txt");
        assert_eq!(s.hash, sha256_hex(&s.config));
    }

    #[test]
    fn test_lookup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path().join("s.json")).unwrap();
        store.save("a", "", &config("x"));
        store.save("b", "", &config("y"));

        assert!(matches!(store.get("zzzz"), Err(SnapshotError::NotFound(_))));
        assert!(matches!(store.get(""), Err(SnapshotError::NotFound(_))));
        // A one-character prefix may or may not be shared
        let shared = store.list()[0].id.simple().to_string()[..1].to_string();
        let count = store
            .list()
            .iter()
            .filter(|s| s.id.simple().to_string().starts_with(&shared))
            .count();
        match store.get(&shared) {
            Ok(_) => assert_eq!(count, 1),
            Err(SnapshotError::Ambiguous { count: n, .. }) => assert_eq!(n, count),
            Err(e) => panic!("unexpected {}", e),
        }
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SnapshotStore::open(&path),
            Err(SnapshotError::Corrupt { .. })
        ));

        fs::write(&path, r#"{"version": 9, "snapshots": []}"#).unwrap();
        assert!(matches!(
            SnapshotStore::open(&path),
            Err(SnapshotError::Corrupt { .. })
        ));
    }
}
