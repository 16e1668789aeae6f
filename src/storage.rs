use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;

use crate::error::StorageError;

/// Registry of credential records (ordered sequence).
pub const REGISTERED_USERS: &str = "registeredUsers";
/// Current session identity.
pub const ADMIN: &str = "admin";
/// Opaque session token, stored as plain text.
pub const TOKEN: &str = "token";
/// Roster snapshot (ordered sequence of employees).
pub const EMPLOYEES: &str = "employees";

/// Tree holding the whole key-value namespace.
const NAMESPACE: &str = "local_storage";

/// Raw byte-level access to the namespace. Sled in production; tests wrap it
/// to inject faults.
pub trait KeyValue: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Replace the value under `key` and make it durable.
    fn insert(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn flush(&self) -> Result<(), StorageError>;
}

/// One Sled tree inside a Sled database.
pub struct SledNamespace {
    db: Db,
    tree: sled::Tree,
}

impl SledNamespace {
    pub fn new(db: Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(NAMESPACE)?;
        Ok(Self { db, tree })
    }
}

impl KeyValue for SledNamespace {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key.as_bytes())?.map(|bytes| bytes.to_vec()))
    }

    fn insert(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value)?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

/// Persistent key-value namespace.
/// Every value is a whole snapshot serialized to text; there are no partial
/// writes and no transactions spanning more than one key.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn KeyValue>,
}

impl Storage {
    /// Open or create the Sled database at the given path
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self::with_backend(Arc::new(SledNamespace::new(db)?)))
    }

    /// Throwaway database removed on drop. Used by tests and dry runs.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self::with_backend(Arc::new(SledNamespace::new(db)?)))
    }

    pub fn with_backend(inner: Arc<dyn KeyValue>) -> Self {
        Self { inner }
    }

    /// Read and deserialize the JSON snapshot under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.inner.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StorageError::Codec {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Serialize `value` to JSON and replace whatever was under `key`.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json_bytes = serde_json::to_vec(value).map_err(|source| StorageError::Codec {
            key: key.to_string(),
            source,
        })?;
        self.inner.insert(key, &json_bytes)?;
        tracing::debug!(key, "snapshot written");
        Ok(())
    }

    /// Raw text value (the session token is not JSON).
    pub fn get_text(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.inner.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::Utf8(key.to_string())),
            None => Ok(None),
        }
    }

    pub fn put_text(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.insert(key, value.as_bytes())?;
        tracing::debug!(key, "text value written");
        Ok(())
    }

    /// Remove `key`; removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)?;
        tracing::debug!(key, "key removed");
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.inner.get(key)?.is_some())
    }

    /// Flush everything to disk before the process exits.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Credential, EmployeeStatus, NewEmployee};

    #[test]
    fn test_put_get_remove_json_snapshot() {
        let storage = Storage::temporary().expect("Failed to open storage");
        let users = vec![Credential {
            id: "1700000000000".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        }];

        assert!(storage.get::<Vec<Credential>>(REGISTERED_USERS).unwrap().is_none());
        storage.put(REGISTERED_USERS, &users).expect("Put failed");
        assert!(storage.contains(REGISTERED_USERS).unwrap());

        let loaded: Vec<Credential> = storage.get(REGISTERED_USERS).unwrap().unwrap();
        assert_eq!(loaded, users);

        storage.remove(REGISTERED_USERS).expect("Remove failed");
        assert!(!storage.contains(REGISTERED_USERS).unwrap());
        // Second removal is a no-op
        storage.remove(REGISTERED_USERS).expect("Idempotent remove failed");
    }

    #[test]
    fn test_token_is_plain_text() {
        let storage = Storage::temporary().unwrap();
        storage.put_text(TOKEN, "token-42").unwrap();
        assert_eq!(storage.get_text(TOKEN).unwrap().as_deref(), Some("token-42"));
    }

    #[test]
    fn test_corrupt_snapshot_is_a_codec_error() {
        let storage = Storage::temporary().unwrap();
        storage.put_text(EMPLOYEES, "not json").unwrap();
        let err = storage.get::<Vec<NewEmployee>>(EMPLOYEES).unwrap_err();
        assert!(matches!(err, StorageError::Codec { ref key, .. } if key == EMPLOYEES));
    }

    #[test]
    fn test_failing_backend_surfaces_errors_and_keeps_last_value() {
        let (_backend, flaky, _notices) = crate::testing::flaky_backend();
        let storage = Storage::with_backend(flaky.clone());
        storage.put_text(TOKEN, "token-1").unwrap();

        flaky.fail_writes(true);
        let err = storage.put_text(TOKEN, "token-2").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(storage.remove(TOKEN).is_err());
        assert_eq!(storage.get_text(TOKEN).unwrap().as_deref(), Some("token-1"));
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        let path = path.to_str().unwrap();
        let employee = NewEmployee {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane.smith@company.com".to_string(),
            phone: "+1 (555) 234-5678".to_string(),
            department: "Marketing".to_string(),
            role: "Marketing Manager".to_string(),
            status: EmployeeStatus::Active,
            date_joined: "2023-03-20".to_string(),
            avatar: Some("https://example.com/jane.png".to_string()),
        };

        {
            let storage = Storage::open(path).unwrap();
            storage.put(EMPLOYEES, &vec![employee.clone()]).unwrap();
            storage.flush().unwrap();
        }

        let storage = Storage::open(path).unwrap();
        let loaded: Vec<NewEmployee> = storage.get(EMPLOYEES).unwrap().unwrap();
        assert_eq!(loaded, vec![employee]);
    }
}
