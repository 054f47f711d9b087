//! Remembered document path, surviving restarts.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MemoryError;

/// The single key under which the document path is remembered.
pub const PATH_MEMORY_KEY: &str = "draftZeroFilePath";

const MEMORY_VERSION: u32 = 1;
const MEMORY_FILENAME: &str = "path-memory.json";

pub trait PathMemory: Send {
    fn get(&self, key: &str) -> Result<Option<PathBuf>, MemoryError>;
    fn set(&mut self, key: &str, path: &Path) -> Result<(), MemoryError>;
    fn clear(&mut self, key: &str) -> Result<(), MemoryError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryFile {
    version: u32,
    entries: BTreeMap<String, PathBuf>,
}

/// Key/path entries stored as a small JSON document.
#[derive(Debug, Clone)]
pub struct JsonPathMemory {
    path: PathBuf,
}

impl JsonPathMemory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `path-memory.json` in the platform config directory, if one can be determined.
    pub fn default_location() -> Option<PathBuf> {
        ProjectDirs::from("com", "draftzero", "draftzero")
            .map(|dirs| dirs.config_dir().join(MEMORY_FILENAME))
    }

    pub fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<MemoryFile, MemoryError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(MemoryFile {
                    version: MEMORY_VERSION,
                    ..Default::default()
                })
            }
            Err(source) => {
                return Err(MemoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let file: MemoryFile = serde_json::from_str(&json).map_err(|source| MemoryError::Json {
            path: self.path.clone(),
            source,
        })?;
        if file.version != MEMORY_VERSION {
            return Err(MemoryError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }

    fn store(&self, file: &MemoryFile) -> Result<(), MemoryError> {
        let io_err = |source| MemoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(file).map_err(|source| MemoryError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)?;
        debug!(memory = %self.path.display(), "path memory updated");
        Ok(())
    }
}

impl PathMemory for JsonPathMemory {
    fn get(&self, key: &str) -> Result<Option<PathBuf>, MemoryError> {
        Ok(self.load()?.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, path: &Path) -> Result<(), MemoryError> {
        let mut file = self.load()?;
        file.entries.insert(key.to_string(), path.to_path_buf());
        self.store(&file)
    }

    fn clear(&mut self, key: &str) -> Result<(), MemoryError> {
        let mut file = self.load()?;
        if file.entries.remove(key).is_none() {
            return Ok(());
        }
        self.store(&file)
    }
}

/// Process-local memory; nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPathMemory {
    entries: HashMap<String, PathBuf>,
}

impl InMemoryPathMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(key.to_string(), path.into());
        self
    }
}

impl PathMemory for InMemoryPathMemory {
    fn get(&self, key: &str) -> Result<Option<PathBuf>, MemoryError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, path: &Path) -> Result<(), MemoryError> {
        self.entries.insert(key.to_string(), path.to_path_buf());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), MemoryError> {
        self.entries.remove(key);
        Ok(())
    }
}
