use monostate::MustBe;
use serde::{Deserialize, Serialize};

use crate::{
    array_shape::deserialize_shape, ArrayShape, ChunkKeySeparator, ChunkMemoryLayout,
    FillValueMetadata,
};

use super::MetadataV2;

/// A V2 array document, stored at `{path}/.zarray`. Attributes are stored separately in `.zattrs`.
///
/// ```json
/// {
///     "zarr_format": 2,
///     "shape": [4, 4],
///     "chunks": [2, 2],
///     "dtype": "<f8",
///     "compressor": { "id": "gzip", "level": 1 },
///     "fill_value": 5.5,
///     "order": "C",
///     "filters": null,
///     "dimension_separator": "."
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ArrayMetadataV2 {
    zarr_format: MustBe!(2u64),
    /// The array shape.
    #[serde(deserialize_with = "deserialize_shape")]
    pub shape: ArrayShape,
    /// The shape of each chunk.
    #[serde(deserialize_with = "deserialize_shape")]
    pub chunks: ArrayShape,
    /// The numpy style data type code, e.g. `<f8` or `|b1`.
    pub dtype: String,
    /// The compressor. [`None`] for uncompressed chunks.
    pub compressor: Option<MetadataV2>,
    /// The fill value.
    #[serde(default)]
    pub fill_value: FillValueMetadata,
    /// The order of elements within a chunk.
    #[serde(default)]
    pub order: ChunkMemoryLayout,
    /// Filters. Carried through but not applied.
    #[serde(default)]
    pub filters: Option<Vec<MetadataV2>>,
    /// The chunk key separator.
    #[serde(default = "default_dimension_separator")]
    pub dimension_separator: ChunkKeySeparator,
}

const fn default_dimension_separator() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

impl ArrayMetadataV2 {
    /// Create V2 array metadata.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ArrayShape,
        dtype: String,
        compressor: Option<MetadataV2>,
        fill_value: FillValueMetadata,
        order: ChunkMemoryLayout,
        dimension_separator: ChunkKeySeparator,
    ) -> Self {
        Self {
            zarr_format: Default::default(),
            shape,
            chunks,
            dtype,
            compressor,
            fill_value,
            order,
            filters: None,
            dimension_separator,
        }
    }
}
