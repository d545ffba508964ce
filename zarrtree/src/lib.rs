//! `zarrtree` is a Rust library for hierarchies of [Zarr](https://zarr.dev) arrays and groups over pluggable key-value stores.
//!
//! It supports both [Zarr V3](https://zarr-specs.readthedocs.io/en/latest/v3/core/index.html) (the `meta/root` and `data/root` key layout)
//! and [Zarr V2](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html) (`.zarray`, `.zgroup` and `.zattrs` documents).
//! The version of a hierarchy is fixed when it is created with [`create_hierarchy`](hierarchy::create_hierarchy)
//! or inferred when it is opened with [`get_hierarchy`](hierarchy::get_hierarchy).
//!
//! ## Getting Started
//! - Create a store: a [`MemoryStore`](storage::store::MemoryStore), a
//!   [`FilesystemStore`](https://docs.rs/zarrtree_filesystem) (`filesystem` feature) or an
//!   [`BlockingObjectStore`](https://docs.rs/zarrtree_object_store) (`object_store` feature).
//! - Configure an [`ArrayRegistry`](array::ArrayRegistry) with the data types and compressors arrays may use.
//! - Create or open a [`Hierarchy`](hierarchy::Hierarchy), then create and open [arrays](array) and [groups](group) in it.
//! - Enumerate the [nodes](node) of a hierarchy with [`Hierarchy::get_children`](hierarchy::Hierarchy::get_children)
//!   and [`Hierarchy::get_nodes`](hierarchy::Hierarchy::get_nodes).
//!
//! ## Crate Features
//! - `filesystem` (default): re-export `zarrtree_filesystem` as [`filesystem`].
//! - `gzip` (default): the [`GzipCodec`](array::codec::GzipCodec) compressor.
//! - `object_store`: re-export `zarrtree_object_store` as `object_store`.
//!
//! ## Logging
//! `zarrtree` logs information and warnings using the [`log`] crate.
//! A logging implementation must be enabled to capture logs.
//!
//! ## Example
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use zarrtree::{
//!     array::{ArrayBuilder, ArrayRegistry},
//!     hierarchy::create_hierarchy,
//!     node::NodeKind,
//!     plugin::ZarrVersions,
//!     storage::store::MemoryStore,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let hierarchy = create_hierarchy(store, ZarrVersions::V3, Arc::new(ArrayRegistry::new()))?;
//!
//! hierarchy.create_group("/marvin", serde_json::Map::new(), vec![])?;
//! let array = hierarchy.create_array(
//!     "/marvin/android",
//!     &ArrayBuilder::new(vec![4, 4], "<i4", vec![2, 2], 0i64),
//! )?;
//! array.store_element::<i32>(&[1, 2], 42)?;
//! array.flush()?;
//!
//! let children = hierarchy.get_children("/marvin")?;
//! assert_eq!(children["android"], NodeKind::Array);
//! println!("{}", hierarchy.tree()?);
//! // /
//! //   marvin
//! //     android [4, 4] <i4
//! # Ok(())
//! # }
//! ```

pub mod array;
pub mod config;
pub mod group;
pub mod hierarchy;
pub mod node;

pub use zarrtree_chunk_key_encoding as chunk_key_encoding;
#[cfg(feature = "filesystem")]
pub use zarrtree_filesystem as filesystem;
pub use zarrtree_metadata as metadata;
#[cfg(feature = "object_store")]
pub use zarrtree_object_store as object_store;
pub use zarrtree_plugin as plugin;
pub use zarrtree_storage as storage;
