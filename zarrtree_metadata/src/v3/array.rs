use monostate::MustBe;
use serde::{Deserialize, Serialize};

use crate::{
    array_shape::deserialize_shape, ArrayShape, AttributesMap, ChunkKeySeparator,
    ChunkMemoryLayout, ExtensionsMetadata, FillValueMetadata,
};

use super::CompressorMetadataV3;

/// The `chunk_grid` member of a V3 array document. Only regular grids are supported.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ChunkGridMetadataV3 {
    #[serde(rename = "type")]
    grid_type: MustBe!("regular"),
    /// The shape of each chunk.
    #[serde(deserialize_with = "deserialize_shape")]
    pub chunk_shape: ArrayShape,
    /// The chunk key separator.
    #[serde(default = "default_separator")]
    pub separator: ChunkKeySeparator,
}

const fn default_separator() -> ChunkKeySeparator {
    ChunkKeySeparator::Slash
}

impl ChunkGridMetadataV3 {
    /// Create a regular chunk grid.
    #[must_use]
    pub fn new(chunk_shape: ArrayShape, separator: ChunkKeySeparator) -> Self {
        Self {
            grid_type: Default::default(),
            chunk_shape,
            separator,
        }
    }
}

/// A V3 array document, stored at `meta/root{path}.array.json`.
///
/// ```json
/// {
///     "shape": [4, 4],
///     "chunk_grid": { "type": "regular", "chunk_shape": [2, 2], "separator": "/" },
///     "attributes": { "question": "life", "answer": 42 },
///     "data_type": "<f8",
///     "chunk_memory_layout": "C",
///     "compressor": {
///         "codec": "https://purl.org/zarr/spec/codec/gzip/1.0",
///         "configuration": { "level": 1 }
///     },
///     "fill_value": 6.6,
///     "extensions": []
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ArrayMetadataV3 {
    /// The array shape.
    #[serde(deserialize_with = "deserialize_shape")]
    pub shape: ArrayShape,
    /// The chunk grid.
    pub chunk_grid: ChunkGridMetadataV3,
    /// User attributes.
    #[serde(default)]
    pub attributes: AttributesMap,
    /// The data type code, e.g. `<f8`.
    pub data_type: String,
    /// The order of elements within a chunk.
    #[serde(default)]
    pub chunk_memory_layout: ChunkMemoryLayout,
    /// The compressor. Absent for uncompressed chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CompressorMetadataV3>,
    /// The fill value.
    #[serde(default)]
    pub fill_value: FillValueMetadata,
    /// Extensions.
    #[serde(default)]
    pub extensions: ExtensionsMetadata,
}
