//! Zarr V3 documents.
//!
//! These follow the V3 core protocol draft that places array and group documents under `meta/root` and chunks under `data/root`.

mod array;
pub use array::{ArrayMetadataV3, ChunkGridMetadataV3};

mod compressor;
pub use compressor::{CompressorMetadataV3, CODEC_URI_BASE};

mod group;
pub use group::GroupMetadataV3;

mod hierarchy;
pub use hierarchy::{HierarchyMetadataV3, ZARR_V3_PROTOCOL};
