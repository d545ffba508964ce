//! Zarr V3 chunk keys: `c` followed by the grid indices.

use zarrtree_metadata::ChunkKeySeparator;
use zarrtree_storage::StoreKey;

use crate::{join_indices, ChunkKeyEncodingTraits};

/// The V3 chunk key encoding.
///
/// Chunk `(2, 1)` is stored at `c/2/1` with the `/` separator and at `c.2.1` with `.`.
/// The only chunk of a rank 0 array is stored at `c`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultChunkKeyEncoding {
    separator: ChunkKeySeparator,
}

impl DefaultChunkKeyEncoding {
    /// Encode with `separator` between the `c` and each index.
    #[must_use]
    pub const fn new(separator: ChunkKeySeparator) -> Self {
        Self { separator }
    }
}

impl Default for DefaultChunkKeyEncoding {
    fn default() -> Self {
        Self::new(ChunkKeySeparator::Slash)
    }
}

impl ChunkKeyEncodingTraits for DefaultChunkKeyEncoding {
    fn separator(&self) -> ChunkKeySeparator {
        self.separator
    }

    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey {
        let key = join_indices(Some("c"), chunk_grid_indices, self.separator);
        // digits, `c` and a separator never form an empty or `/` bounded segment
        unsafe { StoreKey::new_unchecked(key) }
    }
}
