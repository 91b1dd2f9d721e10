//! Advertisement draft: one persisted slot holding whatever the user typed.

use log::warn;
use serde_json::Value;

use crate::storage::{Storage, StorageError, ADVERTISE_KEY};

/// Holds the draft in memory and mirrors every change to storage.
///
/// There is no shape validation, merge, expiry or versioning: the stored
/// value is exactly the last one set, `null` included.
pub struct AdvertiseStore<S> {
    storage: S,
    advertise: Value,
}

impl<S: Storage> AdvertiseStore<S> {
    /// Restore the persisted draft. A missing or undecodable entry yields `null`.
    pub fn load(storage: S) -> Self {
        let advertise = match storage.get_item(ADVERTISE_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding undecodable advertise draft: {e}");
                Value::Null
            }),
            None => Value::Null,
        };
        Self { storage, advertise }
    }

    pub fn advertise(&self) -> &Value {
        &self.advertise
    }

    /// Replace the whole draft and persist it. On a storage failure the
    /// previous draft is kept.
    pub fn set_advertise(&mut self, value: Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        self.storage.set_item(ADVERTISE_KEY, &raw)?;
        self.advertise = value;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(ADVERTISE_KEY)?;
        self.advertise = Value::Null;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
