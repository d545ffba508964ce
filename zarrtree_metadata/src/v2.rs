//! Zarr V2 documents.
//!
//! - `.zarray`: [`ArrayMetadataV2`]
//! - `.zgroup`: [`GroupMetadataV2`]
//! - `.zattrs`: an [`AttributesMap`](crate::AttributesMap)

mod array;
pub use array::ArrayMetadataV2;

mod group;
pub use group::GroupMetadataV2;

mod metadata;
pub use metadata::MetadataV2;
