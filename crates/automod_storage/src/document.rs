#![forbid(unsafe_code)]

//! Whole-document JSON persistence. Every save overwrites the document; the
//! last writer wins.

use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("failed to render document: {0}")]
    Render(#[source] serde_json::Error),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

pub trait DocumentStore<T> {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<T>, StoreError>;

    fn save(&self, doc: &T) -> Result<(), StoreError>;

    /// Missing, empty, unreadable or corrupt documents all fall back to the default.
    fn load_or_default(&self) -> T
    where
        T: Default,
    {
        match self.load() {
            Ok(Some(doc)) => doc,
            Ok(None) => T::default(),
            Err(err) => {
                tracing::warn!(%err, "document unreadable, starting from defaults");
                T::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, doc: &T) -> Result<(), StoreError> {
        let serialized = serde_json::to_vec_pretty(doc).map_err(StoreError::Render)?;
        atomic_write(&self.path, &serialized)
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source| StoreError::Io {
        path: dir.clone(),
        source,
    };
    fs::create_dir_all(&dir).map_err(io_err)?;
    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    temp.write_all(data).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Process-local store for tests and hosts that keep nothing on disk.
#[derive(Debug)]
pub struct MemoryStore<T> {
    doc: Mutex<Option<T>>,
    saves: Mutex<usize>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            doc: Mutex::new(None),
            saves: Mutex::new(0),
        }
    }

    pub fn with_document(doc: T) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DocumentStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<Option<T>, StoreError> {
        self.doc
            .lock()
            .map(|doc| doc.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, doc: &T) -> Result<(), StoreError> {
        *self.doc.lock().map_err(|_| StoreError::Poisoned)? = Some(doc.clone());
        *self.saves.lock().map_err(|_| StoreError::Poisoned)? += 1;
        Ok(())
    }
}
