//! Persisted session state: a bearer token and a JSON user snapshot.
//!
//! # Design
//! `SessionStorage` mirrors the browser's key/value storage so the session
//! layer and the HTTP client can share it without knowing where it lives.
//! `MemoryStorage` serves tests and short-lived hosts; `FileStorage` keeps the
//! keys in a JSON file that is rewritten on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::types::User;

pub const TOKEN_KEY: &str = "odonto.auth.token";
pub const USER_KEY: &str = "odonto.auth.user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Non-empty bearer token, if one is stored.
pub fn load_token(storage: &dyn SessionStorage) -> Option<String> {
    storage.get_item(TOKEN_KEY).filter(|t| !t.trim().is_empty())
}

/// Stored user snapshot. A snapshot that no longer parses counts as absent.
pub fn load_user(storage: &dyn SessionStorage) -> Option<User> {
    let raw = storage.get_item(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::warn!(%err, "discarding unreadable user snapshot");
            None
        }
    }
}

pub fn store_session(
    storage: &dyn SessionStorage,
    token: &str,
    user: &User,
) -> Result<(), StorageError> {
    let snapshot = serde_json::to_string(user)?;
    storage.set_item(TOKEN_KEY, token)?;
    storage.set_item(USER_KEY, &snapshot)
}

/// Remove both session keys. Both removals are attempted even if the first
/// one fails.
pub fn clear_session(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    let token = storage.remove_item(TOKEN_KEY);
    let user = storage.remove_item(USER_KEY);
    token.and(user)
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Key/value storage persisted as a flat JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.remove(key).is_some() {
            self.persist(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;
    use chrono::NaiveDate;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            phone: "11999990000".to_string(),
            cpf: "12345678900".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
            role: UserRole::Common,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("clinic-core-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn store_then_load_session() {
        let storage = MemoryStorage::new();
        store_session(&storage, "tok", &user()).unwrap();
        assert_eq!(load_token(&storage).as_deref(), Some("tok"));
        assert_eq!(load_user(&storage), Some(user()));
    }

    #[test]
    fn clear_removes_both_keys() {
        let storage = MemoryStorage::new();
        store_session(&storage, "tok", &user()).unwrap();
        clear_session(&storage).unwrap();
        assert!(storage.get_item(TOKEN_KEY).is_none());
        assert!(storage.get_item(USER_KEY).is_none());
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "  ").unwrap();
        assert!(load_token(&storage).is_none());
    }

    #[test]
    fn corrupt_user_snapshot_counts_as_absent() {
        let storage = MemoryStorage::new();
        storage.set_item(USER_KEY, "{not json").unwrap();
        assert!(load_user(&storage).is_none());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        let storage = FileStorage::open(&path).unwrap();
        store_session(&storage, "persisted", &user()).unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(load_token(&reopened).as_deref(), Some("persisted"));
        assert_eq!(load_user(&reopened).map(|u| u.id), Some("u1".to_string()));

        clear_session(&reopened).unwrap();
        let cleared = FileStorage::open(&path).unwrap();
        assert!(load_token(&cleared).is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json at all").unwrap();
        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
        std::fs::remove_file(&path).unwrap();
    }
}
