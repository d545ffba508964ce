//! Conformance checks shared by every store backend.
//!
//! Run [`store_write`] first, then any of the read/list checks, and [`store_erase`] last.

use crate::{
    ListableStorageTraits, ReadableStorageTraits, StorageError, StoreKey, StoreKeysPrefixes,
    StorePrefix, WritableStorageTraits,
};

fn key(key: &str) -> StoreKey {
    StoreKey::new(key).unwrap()
}

fn prefix(prefix: &str) -> StorePrefix {
    StorePrefix::new(prefix).unwrap()
}

fn keys(keys: &[&str]) -> Vec<StoreKey> {
    keys.iter().map(|k| key(k)).collect()
}

fn prefixes(prefixes: &[&str]) -> Vec<StorePrefix> {
    prefixes.iter().map(|p| prefix(p)).collect()
}

/// Write the conformance data set.
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a store key or prefix is invalid.
pub fn store_write<T: WritableStorageTraits>(store: &T) -> Result<(), StorageError> {
    store.set(&key("a/b"), vec![0, 1, 2, 3].into())?;
    store.set(&key("a/c"), vec![0].into())?;
    store.set(&key("a/d/e"), Vec::<u8>::new().into())?;
    store.set(&key("a/f/g"), vec![9, 9].into())?;
    store.set(&key("a/f/g"), vec![0, 1].into())?; // overwrite
    store.set(&key("a/f/h"), vec![0, 1, 2].into())?;

    store.set(&key("b"), vec![0].into())?;
    store.erase(&key("b"))?;
    store.erase(&key("b"))?; // erasing a missing key succeeds
    store.erase(&key("x/y"))?;

    store.set(&key("i/j/k"), vec![0, 1].into())?;
    store.set(&key("i/l"), vec![0].into())?;
    store.erase_prefix(&prefix("i/"))?;
    store.erase_prefix(&prefix("missing/"))?;
    Ok(())
}

/// Check values written by [`store_write`].
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a value does not match the conformance data set.
pub fn store_read<T: ReadableStorageTraits>(store: &T) -> Result<(), StorageError> {
    assert_eq!(store.get(&key("a/b"))?.unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(store.get(&key("a/c"))?.unwrap(), vec![0]);
    assert!(store.get(&key("a/d/e"))?.unwrap().is_empty());
    assert_eq!(store.get(&key("a/f/g"))?.unwrap(), vec![0, 1]);
    assert!(store.get(&key("b"))?.is_none());
    assert!(store.get(&key("i/j/k"))?.is_none());

    assert!(store.exists(&key("a/b"))?);
    assert!(store.exists(&key("a/d/e"))?);
    assert!(!store.exists(&key("b"))?);
    assert!(!store.exists(&key("a/d"))?);

    assert_eq!(store.size_key(&key("a/b"))?, Some(4));
    assert_eq!(store.size_key(&key("a/d/e"))?, Some(0));
    assert_eq!(store.size_key(&key("b"))?, None);
    Ok(())
}

/// Check keys and prefixes listed after [`store_write`].
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a listing does not match the conformance data set.
pub fn store_list<T: ListableStorageTraits>(store: &T) -> Result<(), StorageError> {
    let all = keys(&["a/b", "a/c", "a/d/e", "a/f/g", "a/f/h"]);
    assert_eq!(store.list()?, all);
    assert_eq!(store.list_prefix(&StorePrefix::root())?, all);
    assert_eq!(store.list_prefix(&prefix("a/"))?, all);
    assert_eq!(store.list_prefix(&prefix("a/f/"))?, keys(&["a/f/g", "a/f/h"]));
    assert!(store.list_prefix(&prefix("i/"))?.is_empty());

    assert_eq!(
        store.list_dir(&StorePrefix::root())?,
        StoreKeysPrefixes::new(vec![], prefixes(&["a/"]))
    );
    assert_eq!(
        store.list_dir(&prefix("a/"))?,
        StoreKeysPrefixes::new(keys(&["a/b", "a/c"]), prefixes(&["a/d/", "a/f/"]))
    );
    assert_eq!(
        store.list_dir(&prefix("a/f/"))?,
        StoreKeysPrefixes::new(keys(&["a/f/g", "a/f/h"]), vec![])
    );
    assert!(store.list_dir(&prefix("i/"))?.is_empty());
    assert!(store.list_dir(&prefix("a/b/"))?.is_empty());
    Ok(())
}

/// Check sizes after [`store_write`].
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a size does not match the conformance data set.
pub fn store_list_size<T: ListableStorageTraits>(store: &T) -> Result<(), StorageError> {
    assert_eq!(store.size_prefix(&prefix("a/"))?, 10);
    assert_eq!(store.size_prefix(&prefix("a/f/"))?, 5);
    assert_eq!(store.size_prefix(&prefix("i/"))?, 0);
    assert_eq!(store.size()?, 10);
    Ok(())
}

/// Erase the conformance data set and check that emptied prefixes disappear from listings.
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a listing does not match the expected state.
pub fn store_erase<T: ReadableStorageTraits + WritableStorageTraits + ListableStorageTraits>(
    store: &T,
) -> Result<(), StorageError> {
    store.erase_prefix(&prefix("a/f/"))?;
    assert!(store.list_prefix(&prefix("a/f/"))?.is_empty());
    assert!(!store.exists(&key("a/f/g"))?);
    assert_eq!(
        store.list_dir(&prefix("a/"))?,
        StoreKeysPrefixes::new(keys(&["a/b", "a/c"]), prefixes(&["a/d/"]))
    );

    store.erase(&key("a/d/e"))?;
    assert_eq!(
        store.list_dir(&prefix("a/"))?,
        StoreKeysPrefixes::new(keys(&["a/b", "a/c"]), vec![])
    );

    store.erase_values(&keys(&["a/b", "a/c"]))?;
    assert!(store.list()?.is_empty());
    assert!(store.list_dir(&StorePrefix::root())?.is_empty());
    assert_eq!(store.size()?, 0);
    Ok(())
}

/// Check that names starting with `.` are ordinary keys, and that `.` and `..` segments never form a key.
///
/// Run on a store left empty by [`store_erase`].
///
/// # Errors
/// Returns a [`StorageError`] if a store operation fails.
///
/// # Panics
/// Panics if a dotted key does not round trip or a relative segment is accepted.
pub fn store_dot_names<T: ReadableStorageTraits + WritableStorageTraits + ListableStorageTraits>(
    store: &T,
) -> Result<(), StorageError> {
    for relative in ["..", "../zarr.json", "meta/../../x", "a/./b", "."] {
        assert!(StoreKey::new(relative).is_err(), "{relative}");
        assert!(StorePrefix::new(format!("{relative}/")).is_err(), "{relative}/");
    }
    assert!(StorePrefix::root().child("..").is_err());

    store.set(&key(".zgroup"), vec![1].into())?;
    store.set(&key(".dent/.zarray"), vec![2, 3].into())?;
    assert_eq!(store.get(&key(".dent/.zarray"))?.unwrap(), vec![2, 3]);
    assert_eq!(
        store.list_dir(&StorePrefix::root())?,
        StoreKeysPrefixes::new(keys(&[".zgroup"]), prefixes(&[".dent/"]))
    );
    store.erase_prefix(&prefix(".dent/"))?;
    store.erase(&key(".zgroup"))?;
    assert!(store.list()?.is_empty());
    Ok(())
}
