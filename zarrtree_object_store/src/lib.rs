//! [`object_store`] store support for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! [`BlockingObjectStore`] exposes any [`object_store::ObjectStore`] (Amazon S3, Google Cloud Storage, Azure, HTTP, local files, memory) through the synchronous `zarrtree_storage` traits.
//! Every call blocks the calling thread on the underlying request via an [`AsyncToSyncBlockOn`] implementation.
//!
//! ```
//! # use std::sync::Arc;
//! use object_store::memory::InMemory;
//! use zarrtree_object_store::BlockingObjectStore;
//! use zarrtree_storage::{ReadableStorageTraits, StoreKey, WritableStorageTraits};
//!
//! let store = BlockingObjectStore::new(InMemory::new(), "bucket/h.zr3")?;
//! let key = StoreKey::new("zarr.json")?;
//! store.set(&key, vec![b'{', b'}'].into())?;
//! assert!(store.exists(&key)?);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `zarrtree_object_store` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

pub use object_store;

use futures::TryStreamExt;
use object_store::{path::Path, ObjectStore, PutPayload};
use thiserror::Error;

use zarrtree_storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, StorePrefixes, WritableStorageTraits,
};

/// Blocks on asynchronous object store requests.
pub trait AsyncToSyncBlockOn: Send + Sync {
    /// Run `future` to completion on the current thread.
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output;
}

/// Blocks with [`futures::executor::block_on`].
///
/// Suitable for clients that do not rely on a specific async runtime, such as [`object_store::memory::InMemory`] and `object_store::local::LocalFileSystem`.
/// Network clients generally need a runtime specific implementation, e.g. one holding a [`tokio`](https://docs.rs/tokio) runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuturesBlockOn;

impl AsyncToSyncBlockOn for FuturesBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        futures::executor::block_on(future)
    }
}

/// An object store creation error.
#[derive(Debug, Error)]
pub enum ObjectStoreCreateError {
    /// The root is empty.
    #[error("object store root cannot be empty")]
    EmptyRoot,
}

/// Maps an [`object_store::Error`] to a [`StorageError`].
fn handle_err(err: object_store::Error) -> StorageError {
    StorageError::Other(err.to_string())
}

/// A synchronous store backed by an [`object_store::ObjectStore`].
///
/// All keys are stored below a root path within the object store (e.g. a prefix within a bucket).
/// Object stores have no directories, so writes need no intermediate containers and prefixes exist only while objects exist beneath them.
#[derive(Debug)]
pub struct BlockingObjectStore<T: ObjectStore, B: AsyncToSyncBlockOn = FuturesBlockOn> {
    object_store: T,
    root: Path,
    block_on: B,
}

impl<T: ObjectStore> BlockingObjectStore<T> {
    /// Create a new [`BlockingObjectStore`] rooted at `root` within `object_store`.
    ///
    /// Leading and trailing `/` of `root` are ignored.
    ///
    /// # Errors
    /// Returns [`ObjectStoreCreateError::EmptyRoot`] if `root` is empty.
    pub fn new(object_store: T, root: &str) -> Result<Self, ObjectStoreCreateError> {
        Self::new_with_block_on(object_store, root, FuturesBlockOn)
    }
}

impl<T: ObjectStore, B: AsyncToSyncBlockOn> BlockingObjectStore<T, B> {
    /// Create a new [`BlockingObjectStore`] which blocks on requests with `block_on`.
    ///
    /// # Errors
    /// Returns [`ObjectStoreCreateError::EmptyRoot`] if `root` is empty.
    pub fn new_with_block_on(
        object_store: T,
        root: &str,
        block_on: B,
    ) -> Result<Self, ObjectStoreCreateError> {
        let root = root.trim_matches('/');
        if root.is_empty() {
            return Err(ObjectStoreCreateError::EmptyRoot);
        }
        Ok(Self {
            object_store,
            root: Path::from(root),
            block_on,
        })
    }

    fn key_to_path(&self, key: &StoreKey) -> Path {
        Path::from(format!("{}/{}", self.root, key.as_str()))
    }

    fn prefix_to_path(&self, prefix: &StorePrefix) -> Path {
        let prefix = prefix.as_str().trim_end_matches('/');
        if prefix.is_empty() {
            self.root.clone()
        } else {
            Path::from(format!("{}/{prefix}", self.root))
        }
    }

    fn path_to_relative<'a>(&self, path: &'a Path) -> Result<&'a str, StorageError> {
        path.as_ref()
            .strip_prefix(self.root.as_ref())
            .and_then(|relative| relative.strip_prefix('/'))
            .ok_or_else(|| StorageError::Other(format!("{path} is outside of {}", self.root)))
    }

    fn path_to_key(&self, path: &Path) -> Result<StoreKey, StorageError> {
        Ok(StoreKey::new(self.path_to_relative(path)?)?)
    }

    fn path_to_prefix(&self, path: &Path) -> Result<StorePrefix, StorageError> {
        Ok(StorePrefix::new(self.path_to_relative(path)?.to_string() + "/")?)
    }
}

impl<T: ObjectStore, B: AsyncToSyncBlockOn> ReadableStorageTraits for BlockingObjectStore<T, B> {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let path = self.key_to_path(key);
        let value = self.block_on.block_on(async {
            match self.object_store.get(&path).await {
                Ok(result) => result.bytes().await.map(Some),
                Err(object_store::Error::NotFound { .. }) => Ok(None),
                Err(err) => Err(err),
            }
        });
        value.map_err(handle_err)
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let path = self.key_to_path(key);
        match self.block_on.block_on(self.object_store.head(&path)) {
            Ok(meta) => Ok(Some(meta.size)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(err) => Err(handle_err(err)),
        }
    }

    fn root(&self) -> String {
        format!("{}/{}", self.object_store, self.root)
    }
}

impl<T: ObjectStore, B: AsyncToSyncBlockOn> WritableStorageTraits for BlockingObjectStore<T, B> {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let path = self.key_to_path(key);
        self.block_on
            .block_on(self.object_store.put(&path, PutPayload::from(value)))
            .map_err(handle_err)?;
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let path = self.key_to_path(key);
        match self.block_on.block_on(self.object_store.delete(&path)) {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(handle_err(err)),
        }
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let path = self.prefix_to_path(prefix);
        let erased: Result<(), object_store::Error> = self.block_on.block_on(async {
            let locations: Vec<Path> = self
                .object_store
                .list(Some(&path))
                .map_ok(|meta| meta.location)
                .try_collect()
                .await?;
            for location in locations {
                match self.object_store.delete(&location).await {
                    Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
            Ok(())
        });
        erased.map_err(handle_err)
    }
}

impl<T: ObjectStore, B: AsyncToSyncBlockOn> ListableStorageTraits for BlockingObjectStore<T, B> {
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let path = self.prefix_to_path(prefix);
        let locations: Vec<Path> = self
            .block_on
            .block_on(
                self.object_store
                    .list(Some(&path))
                    .map_ok(|meta| meta.location)
                    .try_collect(),
            )
            .map_err(handle_err)?;
        let mut keys = locations
            .iter()
            .map(|location| self.path_to_key(location))
            .collect::<Result<StoreKeys, _>>()?;
        keys.sort();
        Ok(keys)
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let path = self.prefix_to_path(prefix);
        let list_result = self
            .block_on
            .block_on(self.object_store.list_with_delimiter(Some(&path)))
            .map_err(handle_err)?;
        let mut keys = list_result
            .objects
            .iter()
            .map(|meta| self.path_to_key(&meta.location))
            .collect::<Result<StoreKeys, _>>()?;
        let mut prefixes = list_result
            .common_prefixes
            .iter()
            .map(|path| self.path_to_prefix(path))
            .collect::<Result<StorePrefixes, _>>()?;
        keys.sort();
        prefixes.sort();
        Ok(StoreKeysPrefixes::new(keys, prefixes))
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        let path = self.prefix_to_path(prefix);
        let sizes: Vec<u64> = self
            .block_on
            .block_on(
                self.object_store
                    .list(Some(&path))
                    .map_ok(|meta| meta.size)
                    .try_collect(),
            )
            .map_err(handle_err)?;
        Ok(sizes.into_iter().sum())
    }
}
