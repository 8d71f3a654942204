use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Failure of the durable key/value store (the persistence error class).
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Origin-scoped string key/value storage that survives restarts.
pub trait DurableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One directory per backend origin, one file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn for_origin(origin: &str) -> anyhow::Result<Self> {
        Ok(Self::at(storage_base_dir()?.join(origin_id(origin))))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::Unavailable(format!("invalid key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl DurableStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let p = self.key_path(key)?;
        match std::fs::read_to_string(&p) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let p = self.key_path(key)?;
        let io = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io)?;
        let tmp = p.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io)?;
        std::fs::rename(&tmp, &p).map_err(io)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let p = self.key_path(key)?;
        match std::fs::remove_file(&p) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

pub fn storage_base_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("shopfront")
        .join("storage"))
}

fn origin_id(origin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(origin.trim_end_matches('/').to_ascii_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
pub mod testing {
    use super::{DurableStorage, StorageError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory storage whose map can be shared between "reloads".
    #[derive(Clone, Default)]
    pub struct MemoryStorage {
        pub items: Rc<RefCell<HashMap<String, String>>>,
        pub fail_writes: Rc<RefCell<bool>>,
        pub fail_reads: Rc<RefCell<bool>>,
    }

    impl MemoryStorage {
        pub fn raw(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        pub fn set_raw(&self, key: &str, value: &str) {
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }

        pub fn failing_writes(&self, on: bool) {
            *self.fail_writes.borrow_mut() = on;
        }

        pub fn failing_reads(&self, on: bool) {
            *self.fail_reads.borrow_mut() = on;
        }
    }

    impl DurableStorage for MemoryStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            if *self.fail_reads.borrow() {
                return Err(StorageError::Unavailable("reads disabled".into()));
            }
            Ok(self.items.borrow().get(key).cloned())
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if *self.fail_writes.borrow() {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.set_raw(key, value);
            Ok(())
        }

        fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
            if *self.fail_writes.borrow() {
                return Err(StorageError::Unavailable("storage disabled".into()));
            }
            self.items.borrow_mut().remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{origin_id, DurableStorage, FileStorage};
    use tempfile::TempDir;

    #[test]
    fn file_storage_set_get_remove() {
        let tmp = TempDir::new().expect("temp dir");
        let mut s = FileStorage::at(tmp.path().join("origin"));
        assert_eq!(s.get_item("user").unwrap(), None);
        s.set_item("user", "{\"a\":1}").unwrap();
        assert_eq!(s.get_item("user").unwrap().as_deref(), Some("{\"a\":1}"));
        s.remove_item("user").unwrap();
        s.remove_item("user").unwrap();
        assert_eq!(s.get_item("user").unwrap(), None);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let tmp = TempDir::new().expect("temp dir");
        let mut s = FileStorage::at(tmp.path());
        assert!(s.set_item("../escape", "x").is_err());
    }

    #[test]
    fn origin_scoping_ignores_trailing_slash_and_case() {
        assert_eq!(
            origin_id("http://LOCALHOST:8000/"),
            origin_id("http://localhost:8000")
        );
        assert_ne!(
            origin_id("http://localhost:8000"),
            origin_id("http://localhost:8001")
        );
    }
}
