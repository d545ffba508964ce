//! The storage API for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! A Zarr store is a key-value namespace used to store and retrieve the documents and chunks of a Zarr hierarchy.
//! For example: a filesystem directory, an object storage bucket and prefix, or an in-memory map.
//!
//! Keys ([`StoreKey`]) are `/` delimited strings and prefixes ([`StorePrefix`]) are either empty (the store root) or end with `/`.
//! A store knows nothing about arrays or groups, and never caches whether a key exists.
//!
//! This crate includes an in-memory store implementation ([`store::MemoryStore`]) and a metrics recording adapter.
//! Filesystem and object storage backends live in `zarrtree_filesystem` and `zarrtree_object_store`.
//!
//! ## Licence
//! `zarrtree_storage` is licensed under either of
//! - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//! - the MIT license <http://opensource.org/licenses/MIT>, at your option.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod maybe;
pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

pub use maybe::{MaybeSend, MaybeSync};

#[cfg(any(test, feature = "tests"))]
/// Conformance checks shared by the store backends.
pub mod store_test;

use std::sync::Arc;

use thiserror::Error;

pub use store_key::{valid_segment, StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

pub use self::storage_sync::{
    ListableStorageTraits, ReadableStorageTraits, ReadableWritableListableStorageTraits,
    WritableStorageTraits,
};

/// A shared handle to a store that can be read, written and listed.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

/// Store values, [`bytes::Bytes`].
pub type Bytes = bytes::Bytes;

/// A value read from a store, [`None`] if the key holds nothing.
pub type MaybeBytes = Option<Bytes>;

/// The result of listing one level of a store: child keys and child prefixes.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Pair sorted `keys` with sorted `prefixes`.
    #[must_use]
    pub fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// The child keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// The child prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }

    /// Whether the listing found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.prefixes.is_empty()
    }
}

/// Errors raised by stores and by the documents read from them.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The store rejects writes.
    #[error("store is read only")]
    ReadOnly,
    /// The backend hit an IO error.
    #[error(transparent)]
    IOError(#[from] Arc<std::io::Error>),
    /// The document under a key could not be decoded.
    #[error("invalid metadata document at {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// A malformed prefix.
    #[error("invalid store prefix {0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// A malformed key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// The backend cannot do what was asked.
    #[error("{0}")]
    Unsupported(String),
    /// Anything else, described by a message.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(Arc::new(err))
    }
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
