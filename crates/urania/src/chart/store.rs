use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::birth::BirthChartRecord;
use crate::error::{AstroError, Result};

/// Whether a save may replace an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    CreateOnly,
    Overwrite,
}

/// Persistence for natal charts keyed by an opaque identity.
pub trait BirthChartStore: Send + Sync {
    fn load(&self, identity: &str) -> Result<Option<BirthChartRecord>>;

    /// Must fail with [`AstroError::PersistenceConflict`] when a record exists
    /// and `mode` is [`WriteMode::CreateOnly`].
    fn save(&self, identity: &str, record: &BirthChartRecord, mode: WriteMode) -> Result<()>;
}

impl<S: BirthChartStore + ?Sized> BirthChartStore for &S {
    fn load(&self, identity: &str) -> Result<Option<BirthChartRecord>> {
        (**self).load(identity)
    }

    fn save(&self, identity: &str, record: &BirthChartRecord, mode: WriteMode) -> Result<()> {
        (**self).save(identity, record, mode)
    }
}

fn conflict(identity: &str) -> AstroError {
    warn!("Refusing to overwrite birth chart for '{}'", identity);
    AstroError::PersistenceConflict {
        identity: identity.to_string(),
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, BirthChartRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BirthChartStore for MemoryStore {
    fn load(&self, identity: &str) -> Result<Option<BirthChartRecord>> {
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        Ok(records.get(identity).cloned())
    }

    fn save(&self, identity: &str, record: &BirthChartRecord, mode: WriteMode) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        if mode == WriteMode::CreateOnly && records.contains_key(identity) {
            return Err(conflict(identity));
        }
        records.insert(identity.to_string(), record.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per identity under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| AstroError::Storage {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for an identity. Identities are used as file stems, so only
    /// ASCII letters, digits, `-` and `_` are accepted.
    pub fn path_for(&self, identity: &str) -> Result<PathBuf> {
        let valid = !identity.is_empty()
            && identity.len() <= 128
            && identity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AstroError::invalid("identity", identity));
        }
        Ok(self.dir.join(format!("{identity}.json")))
    }

    /// Write `text` to a uniquely named temp file in the store directory.
    fn write_temp(&self, identity: &str, text: &str) -> Result<NamedTempFile> {
        let storage_err = |source| AstroError::Storage {
            path: self.dir.clone(),
            source,
        };
        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{identity}."))
            .suffix(".json.tmp")
            .tempfile_in(&self.dir)
            .map_err(storage_err)?;
        file.write_all(text.as_bytes()).map_err(storage_err)?;
        file.as_file().sync_all().map_err(storage_err)?;
        Ok(file)
    }
}

impl BirthChartStore for JsonFileStore {
    fn load(&self, identity: &str) -> Result<Option<BirthChartRecord>> {
        let path = self.path_for(identity)?;
        match fs::read_to_string(&path) {
            Ok(text) => BirthChartRecord::from_json(&text).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AstroError::Storage { path, source }),
        }
    }

    fn save(&self, identity: &str, record: &BirthChartRecord, mode: WriteMode) -> Result<()> {
        let path = self.path_for(identity)?;
        if mode == WriteMode::CreateOnly && path.exists() {
            return Err(conflict(identity));
        }
        let tmp = self.write_temp(identity, &record.to_json()?)?;

        // A failed persist drops the temp file along with the error.
        let outcome = match mode {
            WriteMode::Overwrite => tmp.persist(&path),
            WriteMode::CreateOnly => tmp.persist_noclobber(&path),
        };
        match outcome {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(conflict(identity))
            }
            Err(err) => Err(AstroError::Storage {
                path,
                source: err.error,
            }),
        }
    }
}
