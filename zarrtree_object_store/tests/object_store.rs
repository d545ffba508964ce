#![allow(missing_docs)]

use std::error::Error;

use object_store::{local::LocalFileSystem, memory::InMemory, ObjectStore};
use zarrtree_object_store::{AsyncToSyncBlockOn, BlockingObjectStore};
use zarrtree_storage::{ListableStorageTraits, StorePrefix, WritableStorageTraits};

struct TokioBlockOn(tokio::runtime::Runtime);

impl AsyncToSyncBlockOn for TokioBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

#[test]
fn memory() -> Result<(), Box<dyn Error>> {
    let store = BlockingObjectStore::new(InMemory::new(), "bucket/h.zr3")?;
    zarrtree_storage::store_test::store_write(&store)?;
    zarrtree_storage::store_test::store_read(&store)?;
    zarrtree_storage::store_test::store_list(&store)?;
    zarrtree_storage::store_test::store_list_size(&store)?;
    zarrtree_storage::store_test::store_erase(&store)?;
    zarrtree_storage::store_test::store_dot_names(&store)?;
    Ok(())
}

#[test]
fn memory_tokio() -> Result<(), Box<dyn Error>> {
    let store = BlockingObjectStore::new_with_block_on(
        InMemory::new(),
        "bucket",
        TokioBlockOn(tokio::runtime::Runtime::new()?),
    )?;
    zarrtree_storage::store_test::store_write(&store)?;
    zarrtree_storage::store_test::store_read(&store)?;
    zarrtree_storage::store_test::store_list(&store)?;
    zarrtree_storage::store_test::store_erase(&store)?;
    zarrtree_storage::store_test::store_dot_names(&store)?;
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn local_filesystem() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let store = BlockingObjectStore::new(LocalFileSystem::new_with_prefix(path.path())?, "h.zr3")?;
    zarrtree_storage::store_test::store_write(&store)?;
    zarrtree_storage::store_test::store_read(&store)?;
    zarrtree_storage::store_test::store_list(&store)?;
    zarrtree_storage::store_test::store_list_size(&store)?;
    Ok(())
}

#[test]
fn root_isolation() -> Result<(), Box<dyn Error>> {
    let memory: std::sync::Arc<dyn ObjectStore> = std::sync::Arc::new(InMemory::new());
    let store_a = BlockingObjectStore::new(memory.clone(), "a")?;
    let store_b = BlockingObjectStore::new(memory, "b")?;
    store_a.set(&"zarr.json".try_into()?, vec![0].into())?;
    assert_eq!(store_a.list()?.len(), 1);
    assert!(store_b.list()?.is_empty());
    assert!(store_b.list_dir(&StorePrefix::root())?.is_empty());
    Ok(())
}
