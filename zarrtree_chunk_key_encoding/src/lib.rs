//! Chunk key encodings for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! A chunk key encoding maps the grid indices of a chunk to a [`StoreKey`] relative to the data prefix of its array.
//!
//! | Zarr version | Encoding                      | `(2, 1)` with `/` | `(2, 1)` with `.` | rank 0 |
//! |--------------|-------------------------------|-------------------|-------------------|--------|
//! | V3           | [`DefaultChunkKeyEncoding`]   | `c/2/1`           | `c.2.1`           | `c`    |
//! | V2           | [`V2ChunkKeyEncoding`]        | `2/1`             | `2.1`             | `0`    |
//!
//! ## Licence
//! `zarrtree_chunk_key_encoding` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod default;
mod v2;

use std::sync::Arc;

use derive_more::{Deref, From};
use zarrtree_metadata::ChunkKeySeparator;
use zarrtree_plugin::ZarrVersions;
use zarrtree_storage::{MaybeSend, MaybeSync, StoreKey};

pub use default::DefaultChunkKeyEncoding;
pub use v2::V2ChunkKeyEncoding;

/// A shared, type erased chunk key encoding.
#[derive(Debug, Clone, From, Deref)]
pub struct ChunkKeyEncoding(Arc<dyn ChunkKeyEncodingTraits>);

impl<T: ChunkKeyEncodingTraits + 'static> From<T> for ChunkKeyEncoding {
    fn from(chunk_key_encoding: T) -> Self {
        Self::new(chunk_key_encoding)
    }
}

impl ChunkKeyEncoding {
    /// Erase the type of `chunk_key_encoding`.
    pub fn new<T: ChunkKeyEncodingTraits + 'static>(chunk_key_encoding: T) -> Self {
        let chunk_key_encoding: Arc<dyn ChunkKeyEncodingTraits> = Arc::new(chunk_key_encoding);
        chunk_key_encoding.into()
    }

    /// The encoding arrays of a Zarr `version` hierarchy use, with `separator`.
    #[must_use]
    pub fn for_version(version: ZarrVersions, separator: ChunkKeySeparator) -> Self {
        match version {
            ZarrVersions::V3 => DefaultChunkKeyEncoding::new(separator).into(),
            ZarrVersions::V2 => V2ChunkKeyEncoding::new(separator).into(),
        }
    }
}

/// Maps chunk grid indices to a key below the data prefix of an array.
pub trait ChunkKeyEncodingTraits: core::fmt::Debug + MaybeSend + MaybeSync {
    /// The separator placed between chunk grid indices.
    fn separator(&self) -> ChunkKeySeparator;

    /// The key of the chunk at `chunk_grid_indices`.
    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey;
}

/// Join `chunk_grid_indices` with `separator`, optionally preceded by `prefix`.
fn join_indices(prefix: Option<&str>, chunk_grid_indices: &[u64], separator: ChunkKeySeparator) -> String {
    use itertools::Itertools;

    let separator = char::from(separator).to_string();
    let mut buffers = vec![itoa::Buffer::new(); chunk_grid_indices.len()];
    prefix
        .into_iter()
        .chain(
            buffers
                .iter_mut()
                .zip(chunk_grid_indices)
                .map(|(buffer, &index)| buffer.format(index)),
        )
        .join(&separator)
}
