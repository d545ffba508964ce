//! Zarr metadata documents for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! This crate holds the serializable forms of the documents persisted in a hierarchy:
//! - [`v3`]: the `zarr.json` hierarchy marker, `*.array.json` and `*.group.json` documents.
//! - [`v2`]: `.zarray`, `.zgroup`, and `.zattrs` documents.
//!
//! Documents are plain data. Key layout and validation are handled by the `zarrtree` crate.
//!
//! ## Licence
//! `zarrtree_metadata` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

pub mod v2;
pub mod v3;

mod array_shape;
pub use array_shape::ArrayShape;

mod configuration;
pub use configuration::Configuration;

mod chunk_key_separator;
pub use chunk_key_separator::ChunkKeySeparator;

mod chunk_memory_layout;
pub use chunk_memory_layout::ChunkMemoryLayout;

mod fill_value;
pub use fill_value::FillValueMetadata;

/// Free-form user attributes of an array or group.
pub type AttributesMap = serde_json::Map<String, serde_json::Value>;

/// Extension markers of an array or group. Round-tripped, otherwise unused.
pub type ExtensionsMetadata = Vec<serde_json::Value>;
