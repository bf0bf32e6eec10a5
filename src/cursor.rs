//! Storage for the pagination cursor carried between polls.
//!
//! On the automation platform the cursor store belongs to the host. The
//! trigger only sees it through [`CursorStore`], so the CLI can stand in for
//! the host with [`FileCursorStore`] and tests can use [`InMemoryCursorStore`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LinearError, Result};

pub trait CursorStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;

    fn delete(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryCursorStore {
    data: HashMap<String, String>,
}

impl InMemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorStore for InMemoryCursorStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Default)]
struct CursorFile {
    cursors: HashMap<String, StoredCursor>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StoredCursor {
    pub value: String,
    #[serde(default)]
    pub timestamp: u64,
}

/// JSON-file backed store. Every write is flushed to disk immediately.
pub struct FileCursorStore {
    path: PathBuf,
    file: CursorFile,
}

impl FileCursorStore {
    /// Open the store at `path`. A missing or corrupt file starts empty; any
    /// other read failure is returned so existing cursors are not overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt cursor file");
                    CursorFile::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => CursorFile::default(),
            Err(e) => return Err(LinearError::CursorStore { path, source: e }),
        };

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry(&self, key: &str) -> Option<&StoredCursor> {
        self.file.cursors.get(key)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LinearError::CursorStore {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.file)?;

        std::fs::write(&self.path, contents).map_err(|e| LinearError::CursorStore {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), "cursor file saved");
        Ok(())
    }
}

impl CursorStore for FileCursorStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file.cursors.get(key).map(|c| c.value.clone()))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();

        self.file
            .cursors
            .insert(key.to_string(), StoredCursor { value, timestamp });
        self.save()
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.file.cursors.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}
