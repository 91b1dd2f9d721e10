//! Persisted client state, modelled on browser local storage.
//!
//! # Design
//! `Storage` is a string key/value store. `MemoryStorage` backs tests and
//! short-lived hosts; `FileStorage` keeps every item in one JSON object on
//! disk and rewrites the file on each change.
//!
//! The auth token has a single canonical encoding: a JSON string. Reads go
//! through `load_token` everywhere, which also accepts a raw (unquoted) token
//! written by older hosts.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const ADVERTISE_KEY: &str = "advertise";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.items).remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    /// The file is written before the in-memory map changes, so a failed
    /// write leaves both as they were.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = lock(&self.items);
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = lock(&self.items);
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.flush(&next)?;
        *items = next;
        Ok(())
    }
}

/// Persisted auth token, or `None` when absent or blank.
pub fn load_token<S: Storage + ?Sized>(storage: &S) -> Option<String> {
    let raw = storage.get_item(TOKEN_KEY)?;
    let token = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::String(token)) => token,
        Ok(_) => {
            warn!("stored token is JSON but not a string, using it verbatim");
            raw.trim().to_string()
        }
        Err(_) => raw.trim().to_string(),
    };
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Token for an authenticated call: a non-blank `explicit` value, else the
/// persisted one.
pub fn resolve_token<S: Storage + ?Sized>(storage: &S, explicit: Option<&str>) -> Option<String> {
    match explicit.map(str::trim) {
        Some(token) if !token.is_empty() => Some(token.to_string()),
        _ => load_token(storage),
    }
}

pub fn save_token<S: Storage + ?Sized>(storage: &S, token: &str) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(token)?;
    storage.set_item(TOKEN_KEY, &encoded)
}

pub fn clear_token<S: Storage + ?Sized>(storage: &S) -> Result<(), StorageError> {
    storage.remove_item(TOKEN_KEY)
}
