//! A filesystem store for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! Each store key maps to a file below the store's base directory, with `/` delimited key segments mapped to nested directories.
//!
//! ## Licence
//! `zarrtree_filesystem` is licensed under either of
//! - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//! - the MIT license <http://opensource.org/licenses/MIT>, at your option.

use zarrtree_storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeyError, StoreKeys, StoreKeysPrefixes, StorePrefix, StorePrefixes,
    WritableStorageTraits,
};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use walkdir::WalkDir;

use std::{
    collections::HashMap,
    fs::OpenOptions,
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

/// A store mapping each key to a file below a base directory.
///
/// Listings are sorted.
/// Directories left empty by an erase are removed, so an erased prefix disappears from listings.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
    readonly: bool,
    files: Mutex<HashMap<StoreKey, Arc<RwLock<()>>>>,
}

impl FilesystemStore {
    /// Open the directory `base_path` as a store, creating it if needed.
    ///
    /// Trailing separators are dropped. The store is read only if the directory is.
    ///
    /// # Errors
    /// Returns a [`FilesystemStoreCreateError`] if `base_path` is empty, not unicode or an existing file.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, FilesystemStoreCreateError> {
        let base_path = base_path.as_ref();
        if base_path.as_os_str().is_empty() {
            return Err(FilesystemStoreCreateError::EmptyBasePath);
        }
        // trailing separators produce no component
        let base_path: PathBuf = base_path.components().collect();
        if base_path.to_str().is_none() {
            return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
        }

        let readonly = if base_path.exists() {
            let metadata = std::fs::metadata(&base_path)?;
            if !metadata.is_dir() {
                return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
            }
            metadata.permissions().readonly()
        } else {
            std::fs::create_dir_all(&base_path)?;
            false
        };

        Ok(Self {
            base_path,
            readonly,
            files: Mutex::default(),
        })
    }

    /// The directory holding the store.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The file backing `key`.
    #[must_use]
    pub fn key_path(&self, key: &StoreKey) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(key.as_str().split('/'));
        path
    }

    /// The directory backing `prefix`.
    #[must_use]
    pub fn prefix_path_of(&self, prefix: &StorePrefix) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(prefix.as_str().split('/').filter(|s| !s.is_empty()));
        path
    }

    fn path_key(&self, path: &Path) -> Result<StoreKey, StoreKeyError> {
        let relative = pathdiff::diff_paths(path, &self.base_path).unwrap_or_default();
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        StoreKey::new(key)
    }

    fn file_lock(&self, key: &StoreKey) -> Arc<RwLock<()>> {
        let mut files = self.files.lock();
        files
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::default()))
            .clone()
    }

    /// Remove empty directories from `dir` upwards, stopping at the base path.
    fn prune_empty_dirs(&self, dir: Option<&Path>) {
        let mut dir = dir;
        while let Some(path) = dir {
            if path == self.base_path || !path.starts_with(&self.base_path) {
                break;
            }
            // remove_dir only succeeds on an empty directory
            if std::fs::remove_dir(path).is_err() {
                break;
            }
            dir = path.parent();
        }
    }

    fn keys_under(&self, path: &Path) -> StoreKeys {
        let mut keys: StoreKeys = WalkDir::new(path)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|v| v.file_type().is_file())
            .filter_map(|v| self.path_key(v.path()).ok())
            .collect();
        keys.sort();
        keys
    }
}

impl ReadableStorageTraits for FilesystemStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let file = self.file_lock(key);
        let _lock = file.read();
        let mut file = match OpenOptions::new().read(true).open(self.key_path(key)) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if file.metadata()?.is_dir() {
            return Ok(None);
        }
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(Some(Bytes::from(buffer)))
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let key_path = self.key_path(key);
        match std::fs::metadata(key_path) {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn root(&self) -> String {
        self.base_path.to_string_lossy().into_owned()
    }
}

impl WritableStorageTraits for FilesystemStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.file_lock(key);
        let _lock = file.write();

        let key_path = self.key_path(key);
        if let Some(parent) = key_path.parent() {
            if parent.exists() {
                if !parent.is_dir() {
                    return Err(StorageError::Other(format!(
                        "cannot write {key}: {} is not a directory",
                        parent.display()
                    )));
                }
            } else {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(key_path)?;
        file.write_all(&value)?;
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.file_lock(key);
        let _lock = file.write();

        let key_path = self.key_path(key);
        match std::fs::remove_file(&key_path) {
            Ok(()) => {
                self.prune_empty_dirs(key_path.parent());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        // holding the table blocks every per-key lock
        let _lock = self.files.lock();

        let prefix_path = self.prefix_path_of(prefix);
        if prefix.is_root() {
            for entry in std::fs::read_dir(&prefix_path)? {
                let path = entry?.path();
                if path.is_dir() {
                    std::fs::remove_dir_all(path)?;
                } else {
                    std::fs::remove_file(path)?;
                }
            }
            return Ok(());
        }
        match std::fs::remove_dir_all(&prefix_path) {
            Ok(()) => {
                self.prune_empty_dirs(prefix_path.parent());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ListableStorageTraits for FilesystemStore {
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let prefix_path = self.prefix_path_of(prefix);
        if !prefix_path.is_dir() {
            return Ok(vec![]);
        }
        Ok(self.keys_under(&prefix_path))
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let prefix_path = self.prefix_path_of(prefix);
        let mut keys: StoreKeys = vec![];
        let mut prefixes: StorePrefixes = vec![];
        if let Ok(dir) = std::fs::read_dir(prefix_path) {
            for entry in dir {
                let entry = entry?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if entry.file_type()?.is_dir() {
                    prefixes.push(prefix.child(&name)?);
                } else {
                    keys.push(StoreKey::new(prefix.as_str().to_owned() + &name)?);
                }
            }
        }
        keys.sort();
        prefixes.sort();
        Ok(StoreKeysPrefixes::new(keys, prefixes))
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        let mut size = 0;
        for key in self.list_prefix(prefix)? {
            if let Some(size_key) = self.size_key(&key)? {
                size += size_key;
            }
        }
        Ok(size)
    }
}

/// Errors opening a [`FilesystemStore`].
#[derive(Debug, Error)]
pub enum FilesystemStoreCreateError {
    /// The directory could not be inspected or created.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An empty base path.
    #[error("the base path of a filesystem store must not be empty")]
    EmptyBasePath,
    /// A base path that is not unicode or is a file.
    #[error("{0} cannot be used as a store directory")]
    InvalidBasePath(PathBuf),
}
