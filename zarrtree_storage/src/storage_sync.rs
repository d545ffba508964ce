use auto_impl::auto_impl;

use super::{
    Bytes, MaybeBytes, MaybeSend, MaybeSync, StorageError, StoreKey, StoreKeys, StoreKeysPrefixes,
    StorePrefix,
};

/// Key lookups against a store.
#[auto_impl(Arc, &)]
pub trait ReadableStorageTraits: MaybeSend + MaybeSync {
    /// Fetch the value stored under `key`, or [`None`] if nothing is stored there.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;

    /// The length of the value stored under `key`, or [`None`] if nothing is stored there.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;

    /// Whether a value is stored under `key`.
    ///
    /// Every call goes to the backend, nothing is cached.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn exists(&self, key: &StoreKey) -> Result<bool, StorageError> {
        self.size_key(key).map(|size| size.is_some())
    }

    /// Where the store lives, for display.
    ///
    /// A directory for a filesystem store, a URL-like string for the others.
    fn root(&self) -> String;
}

/// Key enumeration over a store.
#[auto_impl(Arc, &)]
pub trait ListableStorageTraits: MaybeSend + MaybeSync {
    /// Every key of the store, sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.list_prefix(&StorePrefix::root())
    }

    /// Every key starting with `prefix`, at any depth, sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// The keys and prefixes exactly one level below `prefix`, each sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;

    /// The summed length of every value under `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails or cannot report sizes.
    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError>;

    /// The summed length of every value in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails or cannot report sizes.
    fn size(&self) -> Result<u64, StorageError> {
        self.size_prefix(&StorePrefix::root())
    }
}

/// Key mutation of a store.
#[auto_impl(Arc, &)]
pub trait WritableStorageTraits: MaybeSend + MaybeSync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Backends with directories create them as needed.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the value cannot be written.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Remove the value under `key`. A missing key is not an error.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Remove the values under each of `keys`.
    ///
    /// # Errors
    /// Returns the first [`StorageError`] encountered.
    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        for key in keys {
            self.erase(key)?;
        }
        Ok(())
    }

    /// Remove every value whose key starts with `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend fails.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A store that can be read, written and listed.
///
/// This is the store capability a hierarchy is built on.
/// It is implemented for everything implementing the three component traits.
pub trait ReadableWritableListableStorageTraits:
    ReadableStorageTraits + WritableStorageTraits + ListableStorageTraits
{
}

impl<T> ReadableWritableListableStorageTraits for T where
    T: ReadableStorageTraits + WritableStorageTraits + ListableStorageTraits + ?Sized
{
}
