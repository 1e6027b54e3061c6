mod config;
pub mod database;

pub use config::{Config, DurationsConfig, NotificationsConfig, StorageConfig, UiConfig};
pub use database::{Database, SqliteStore};

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `POMOWIDGET_DATA_DIR` wins outright. Otherwise `~/.config/pomowidget/`, or
/// `~/.config/pomowidget-dev/` when `POMOWIDGET_ENV=dev`.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("POMOWIDGET_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOWIDGET_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomowidget-dev")
            } else {
                base_dir.join("pomowidget")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Key-value slot holding the serialized timer state.
pub trait StateStore {
    fn get(&self) -> Result<Option<String>, StorageError>;
    fn set(&mut self, blob: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    blob: Option<String>,
    writes: usize,
    failing: bool,
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().blob = Some(blob.into());
        store
    }

    /// Make every subsequent operation fail.
    pub fn fail(&self) {
        self.inner.borrow_mut().failing = true;
    }

    pub fn blob(&self) -> Option<String> {
        self.inner.borrow().blob.clone()
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.inner.borrow().failing {
            return Err(StorageError::QueryFailed("memory store set to fail".into()));
        }
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.inner.borrow().blob.clone())
    }

    fn set(&mut self, blob: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut inner = self.inner.borrow_mut();
        inner.blob = Some(blob.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.check()?;
        self.inner.borrow_mut().blob = None;
        Ok(())
    }
}
