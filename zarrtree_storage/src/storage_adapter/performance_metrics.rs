//! Store traffic counters.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

#[derive(Debug, Default)]
struct Counter(AtomicUsize);

impl Counter {
    fn add(&self, n: usize) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    fn bump(&self) {
        self.add(1);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Wraps a store and counts the requests and bytes passing through it.
///
/// Tests use it to assert how much store traffic an operation causes.
/// Requests are passed straight to the inner store.
///
/// ### Example
/// ```rust
/// # use std::sync::Arc;
/// # use zarrtree_storage::store::MemoryStore;
/// # use zarrtree_storage::storage_adapter::performance_metrics::PerformanceMetricsStorageAdapter;
/// # use zarrtree_storage::{ReadableStorageTraits, StoreKey, WritableStorageTraits};
/// let store = PerformanceMetricsStorageAdapter::new(Arc::new(MemoryStore::new()));
/// let key = StoreKey::new("zarr.json").unwrap();
/// store.set(&key, vec![1, 2, 3].into()).unwrap();
/// assert!(store.exists(&key).unwrap());
/// assert_eq!((store.writes(), store.bytes_written()), (1, 3));
/// assert_eq!(store.existence_checks(), 1);
/// ```
#[derive(Debug)]
pub struct PerformanceMetricsStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    reads: Counter,
    bytes_read: Counter,
    writes: Counter,
    bytes_written: Counter,
    existence_checks: Counter,
    lists: Counter,
    keys_erased: Counter,
}

impl<TStorage: ?Sized> PerformanceMetricsStorageAdapter<TStorage> {
    /// Start counting traffic to `storage` from zero.
    #[must_use]
    pub fn new(storage: Arc<TStorage>) -> Self {
        Self {
            storage,
            reads: Counter::default(),
            bytes_read: Counter::default(),
            writes: Counter::default(),
            bytes_written: Counter::default(),
            existence_checks: Counter::default(),
            lists: Counter::default(),
            keys_erased: Counter::default(),
        }
    }

    fn counters(&self) -> [&Counter; 7] {
        [
            &self.reads,
            &self.bytes_read,
            &self.writes,
            &self.bytes_written,
            &self.existence_checks,
            &self.lists,
            &self.keys_erased,
        ]
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.counters().into_iter().for_each(Counter::clear);
    }

    /// `get` calls.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Bytes returned by `get`.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read.get()
    }

    /// `set` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Bytes passed to `set`.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written.get()
    }

    /// `exists` and `size_key` calls.
    pub fn existence_checks(&self) -> usize {
        self.existence_checks.get()
    }

    /// `list`, `list_prefix` and `list_dir` calls.
    pub fn lists(&self) -> usize {
        self.lists.get()
    }

    /// Keys passed to `erase` or `erase_values`, whether or not they held a value.
    ///
    /// Prefix erasure is not counted.
    pub fn keys_erased(&self) -> usize {
        self.keys_erased.get()
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits
    for PerformanceMetricsStorageAdapter<TStorage>
{
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        self.reads.bump();
        let value = self.storage.get(key)?;
        self.bytes_read.add(value.as_ref().map_or(0, Bytes::len));
        Ok(value)
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        self.existence_checks.bump();
        self.storage.size_key(key)
    }

    fn exists(&self, key: &StoreKey) -> Result<bool, StorageError> {
        self.existence_checks.bump();
        self.storage.exists(key)
    }

    fn root(&self) -> String {
        self.storage.root()
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> ListableStorageTraits
    for PerformanceMetricsStorageAdapter<TStorage>
{
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.lists.bump();
        self.storage.list()
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        self.lists.bump();
        self.storage.list_prefix(prefix)
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        self.lists.bump();
        self.storage.list_dir(prefix)
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        self.storage.size_prefix(prefix)
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits
    for PerformanceMetricsStorageAdapter<TStorage>
{
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.writes.bump();
        self.bytes_written.add(value.len());
        self.storage.set(key, value)
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.keys_erased.bump();
        self.storage.erase(key)
    }

    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        self.keys_erased.add(keys.len());
        self.storage.erase_values(keys)
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.storage.erase_prefix(prefix)
    }
}
