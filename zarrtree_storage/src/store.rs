//! Stores included with `zarrtree_storage`.

mod memory_store;
pub use memory_store::MemoryStore;
