//! Zarr V2 chunk keys: the grid indices alone.

use zarrtree_metadata::ChunkKeySeparator;
use zarrtree_storage::StoreKey;

use crate::{join_indices, ChunkKeyEncodingTraits};

/// The V2 chunk key encoding.
///
/// Chunk `(2, 1)` is stored at `2.1` with the `.` separator and at `2/1` with `/`.
/// The only chunk of a rank 0 array is stored at `0`.
#[derive(Debug, Clone, Copy)]
pub struct V2ChunkKeyEncoding {
    separator: ChunkKeySeparator,
}

impl V2ChunkKeyEncoding {
    /// Encode with `separator` between indices.
    #[must_use]
    pub const fn new(separator: ChunkKeySeparator) -> Self {
        Self { separator }
    }
}

impl Default for V2ChunkKeyEncoding {
    fn default() -> Self {
        Self::new(ChunkKeySeparator::Dot)
    }
}

impl ChunkKeyEncodingTraits for V2ChunkKeyEncoding {
    fn separator(&self) -> ChunkKeySeparator {
        self.separator
    }

    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey {
        let key = match chunk_grid_indices {
            [] => "0".to_string(),
            indices => join_indices(None, indices, self.separator),
        };
        unsafe { StoreKey::new_unchecked(key) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(separator: ChunkKeySeparator, indices: &[u64]) -> String {
        V2ChunkKeyEncoding::new(separator)
            .encode(indices)
            .as_str()
            .to_string()
    }

    #[test]
    fn v2_dot() {
        assert_eq!(encode(ChunkKeySeparator::Dot, &[2, 1]), "2.1");
        assert_eq!(encode(ChunkKeySeparator::Dot, &[1, 23, 45]), "1.23.45");
        assert_eq!(
            V2ChunkKeyEncoding::default().separator(),
            ChunkKeySeparator::Dot
        );
    }

    #[test]
    fn v2_slash() {
        assert_eq!(encode(ChunkKeySeparator::Slash, &[2, 1]), "2/1");
        assert_eq!(encode(ChunkKeySeparator::Slash, &[7]), "7");
    }

    #[test]
    fn v2_rank_zero() {
        assert_eq!(encode(ChunkKeySeparator::Dot, &[]), "0");
    }
}
