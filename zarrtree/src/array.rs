//! Zarr arrays.
//!
//! An array is a node in a Zarr hierarchy holding multidimensional chunked data and associated metadata.
//! It is defined by the following parameters, which are encoded in its metadata document:
//!  - **shape**: the length of each array dimension,
//!  - **chunk shape**: the shape of every chunk of the regular chunk grid,
//!  - **data type**: the element type and byte order, e.g. `<f8`,
//!  - **chunk memory layout**: `C` (row-major) or `F` (column-major) order of elements within a chunk,
//!  - **chunk key separator**: `/` or `.`, used to encode chunk grid indices as store keys,
//!  - **compressor**: the codec applied to encoded chunks, `binary` for none,
//!  - **fill value**: the value of elements of chunks that have never been written,
//!  - (optional) **attributes**: user-defined attributes,
//!  - (optional) **extensions**: round-tripped but not interpreted.
//!
//! Use an [`ArrayBuilder`] to create an array and [`Array::open`] to open an existing one.

mod array_builder;
mod array_data;
mod array_errors;
mod chunked_array;
mod element;
mod registry;

pub mod codec;
pub mod data_type;

use zarrtree_metadata::{
    v2::{ArrayMetadataV2, MetadataV2},
    v3::{ArrayMetadataV3, ChunkGridMetadataV3, CompressorMetadataV3},
    ArrayShape, AttributesMap, ChunkKeySeparator, ChunkMemoryLayout, Configuration,
    ExtensionsMetadata, FillValueMetadata,
};
use zarrtree_plugin::ZarrVersions;
use zarrtree_storage::StoreKey;

pub use self::array_builder::ArrayBuilder;
pub use self::array_data::ArrayData;
pub use self::array_errors::{ArrayCreateError, ArrayError};
pub use self::chunked_array::{ChunkedArray, ChunkedArrayParameters};
pub use self::data_type::{DataType, Endianness, UnknownDataTypeError};
pub use self::element::Element;
pub use self::registry::{build_chunked_array, ArrayDataBuilder, ArrayRegistry, ArrayRegistryKey};

use self::codec::{CompressorPlugin, RawCodec};
use crate::{
    config::global_config,
    hierarchy::Hierarchy,
    node::{NodeKind, NodePath},
};

/// Version independent array metadata.
///
/// This is the content of a V3 `.array.json` document, or of a V2 `.zarray` and `.zattrs` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMetadata {
    /// The array shape.
    pub shape: ArrayShape,
    /// The chunk shape.
    pub chunk_shape: ArrayShape,
    /// The data type string, e.g. `<f8`.
    pub data_type: String,
    /// The order of elements within a chunk.
    pub chunk_memory_layout: ChunkMemoryLayout,
    /// The chunk key separator.
    pub chunk_key_separator: ChunkKeySeparator,
    /// The compressor name, `binary` for none.
    pub compressor: String,
    /// The compressor configuration.
    pub compressor_configuration: Configuration,
    /// The fill value.
    pub fill_value: FillValueMetadata,
    /// User attributes.
    pub attributes: AttributesMap,
    /// Extensions. V2 documents have none.
    pub extensions: ExtensionsMetadata,
}

impl ArrayMetadata {
    /// Convert to a V3 array document. A `binary` compressor is omitted.
    #[must_use]
    pub fn to_v3(&self) -> ArrayMetadataV3 {
        let compressor = (self.compressor != RawCodec::NAME).then(|| {
            CompressorMetadataV3::new(&self.compressor, self.compressor_configuration.clone())
        });
        ArrayMetadataV3 {
            shape: self.shape.clone(),
            chunk_grid: ChunkGridMetadataV3::new(self.chunk_shape.clone(), self.chunk_key_separator),
            attributes: self.attributes.clone(),
            data_type: self.data_type.clone(),
            chunk_memory_layout: self.chunk_memory_layout,
            compressor,
            fill_value: self.fill_value.clone(),
            extensions: self.extensions.clone(),
        }
    }

    /// Convert from a V3 array document. An absent compressor is `binary`.
    #[must_use]
    pub fn from_v3(metadata: ArrayMetadataV3) -> Self {
        let (compressor, compressor_configuration) = match metadata.compressor {
            Some(compressor) => (compressor.name().to_string(), compressor.configuration),
            None => (RawCodec::NAME.to_string(), Configuration::default()),
        };
        Self {
            shape: metadata.shape,
            chunk_shape: metadata.chunk_grid.chunk_shape,
            data_type: metadata.data_type,
            chunk_memory_layout: metadata.chunk_memory_layout,
            chunk_key_separator: metadata.chunk_grid.separator,
            compressor,
            compressor_configuration,
            fill_value: metadata.fill_value,
            attributes: metadata.attributes,
            extensions: metadata.extensions,
        }
    }

    /// Convert to a V2 `.zarray` document. Attributes and extensions are not included.
    #[must_use]
    pub fn to_v2(&self) -> ArrayMetadataV2 {
        let compressor = (self.compressor != RawCodec::NAME)
            .then(|| MetadataV2::new(self.compressor.clone(), self.compressor_configuration.clone()));
        ArrayMetadataV2::new(
            self.shape.clone(),
            self.chunk_shape.clone(),
            self.data_type.clone(),
            compressor,
            self.fill_value.clone(),
            self.chunk_memory_layout,
            self.chunk_key_separator,
        )
    }

    /// Convert from a V2 `.zarray` document and the content of `.zattrs`.
    #[must_use]
    pub fn from_v2(metadata: ArrayMetadataV2, attributes: AttributesMap) -> Self {
        let (compressor, compressor_configuration) = match metadata.compressor {
            Some(compressor) => (
                compressor.id().to_string(),
                compressor.configuration().clone(),
            ),
            None => (RawCodec::NAME.to_string(), Configuration::default()),
        };
        Self {
            shape: metadata.shape,
            chunk_shape: metadata.chunks,
            data_type: metadata.dtype,
            chunk_memory_layout: metadata.order,
            chunk_key_separator: metadata.dimension_separator,
            compressor,
            compressor_configuration,
            fill_value: metadata.fill_value,
            attributes,
            extensions: ExtensionsMetadata::default(),
        }
    }

    /// Validate the shape and chunk shape.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if the ranks differ, a dimension is zero, a chunk dimension exceeds the array dimension,
    /// or the number of elements of a chunk overflows [`usize`].
    pub fn validate(&self) -> Result<(), ArrayCreateError> {
        if self.chunk_shape.len() != self.shape.len() {
            return Err(ArrayCreateError::InvalidChunkGridDimensionality(
                self.chunk_shape.len(),
                self.shape.len(),
            ));
        }
        if self.shape.contains(&0) {
            return Err(ArrayCreateError::InvalidShape(self.shape.clone()));
        }
        if std::iter::zip(&self.chunk_shape, &self.shape)
            .any(|(&chunk, &shape)| chunk == 0 || chunk > shape)
        {
            return Err(ArrayCreateError::InvalidChunkShape {
                chunk_shape: self.chunk_shape.clone(),
                shape: self.shape.clone(),
            });
        }
        if chunked_array::chunk_num_elements(&self.chunk_shape).is_none() {
            return Err(ArrayCreateError::ChunkTooLarge(self.chunk_shape.clone()));
        }
        Ok(())
    }
}

/// A Zarr array bound to a [`Hierarchy`].
///
/// Elements are cached in a pool of decoded chunks.
/// Modified chunks are written back on eviction, on [`Array::flush`], and on drop.
#[derive(Debug)]
pub struct Array {
    path: NodePath,
    metadata: ArrayMetadata,
    data: ArrayData,
}

impl Array {
    /// Create an array at `path` and write its metadata.
    ///
    /// The array is resolved through the registry of `hierarchy` before any metadata is written.
    pub(crate) fn create(
        hierarchy: &Hierarchy,
        path: NodePath,
        metadata: ArrayMetadata,
        chunk_pool_size: usize,
    ) -> Result<Self, ArrayCreateError> {
        metadata.validate()?;
        let storage = &**hierarchy.storage();
        let layout = hierarchy.layout();
        if let Some(existing) = crate::node::classify(storage, layout, &path)? {
            if existing.is_group() {
                return Err(ArrayCreateError::NodeKindConflict {
                    existing_path: path.clone(),
                    path,
                    existing,
                });
            }
        }
        for ancestor in path.ancestors() {
            if storage.exists(&layout.array_metadata_key(&ancestor))? {
                return Err(ArrayCreateError::NodeKindConflict {
                    path,
                    existing_path: ancestor,
                    existing: NodeKind::Array,
                });
            }
        }

        let data = Self::build_data(hierarchy, &path, &metadata, chunk_pool_size)?;
        layout.store_array_metadata(storage, &path, &metadata)?;
        Ok(Self {
            path,
            metadata,
            data,
        })
    }

    /// Open an existing array at `path` of `hierarchy`.
    ///
    /// The chunk pool size is taken from the [global configuration](crate::config::Config::chunk_pool_size).
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::MissingMetadata`] if there is no array at `path`,
    /// or another [`ArrayCreateError`] if the metadata is invalid or not supported by the registry.
    pub fn open(hierarchy: &Hierarchy, path: &str) -> Result<Self, ArrayCreateError> {
        let chunk_pool_size = global_config().chunk_pool_size();
        Self::open_opt(hierarchy, path, chunk_pool_size)
    }

    /// Open an existing array at `path` of `hierarchy` with a pool of `chunk_pool_size` chunks.
    #[allow(clippy::missing_errors_doc)]
    pub fn open_opt(
        hierarchy: &Hierarchy,
        path: &str,
        chunk_pool_size: usize,
    ) -> Result<Self, ArrayCreateError> {
        let path = NodePath::new(path)?;
        let metadata = hierarchy
            .layout()
            .retrieve_array_metadata(&**hierarchy.storage(), &path)?
            .ok_or_else(|| ArrayCreateError::MissingMetadata(path.clone()))?;
        metadata.validate()?;
        let data = Self::build_data(hierarchy, &path, &metadata, chunk_pool_size)?;
        Ok(Self {
            path,
            metadata,
            data,
        })
    }

    fn build_data(
        hierarchy: &Hierarchy,
        path: &NodePath,
        metadata: &ArrayMetadata,
        chunk_pool_size: usize,
    ) -> Result<ArrayData, ArrayCreateError> {
        let layout = hierarchy.layout();
        let parameters = ChunkedArrayParameters {
            storage: hierarchy.storage().clone(),
            data_prefix: layout.data_prefix(path),
            shape: metadata.shape.clone(),
            chunk_shape: metadata.chunk_shape.clone(),
            endianness: Endianness::Native,
            chunk_memory_layout: metadata.chunk_memory_layout,
            chunk_key_encoding: layout.chunk_key_encoding(metadata.chunk_key_separator),
            compressor_configuration: metadata.compressor_configuration.clone(),
            chunk_pool_size,
            fill_value: metadata.fill_value.clone(),
        };
        hierarchy
            .registry()
            .build(&metadata.compressor, &metadata.data_type, parameters)
    }

    /// The node path.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The array metadata.
    #[must_use]
    pub fn metadata(&self) -> &ArrayMetadata {
        &self.metadata
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.metadata.shape
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        &self.metadata.chunk_shape
    }

    /// The data type string, e.g. `<f8`.
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.metadata.data_type
    }

    /// The compressor name.
    #[must_use]
    pub fn compressor(&self) -> &str {
        &self.metadata.compressor
    }

    /// The user attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributesMap {
        &self.metadata.attributes
    }

    /// The chunk pool size.
    #[must_use]
    pub fn chunk_pool_size(&self) -> usize {
        self.data.chunk_pool_size()
    }

    /// The chunked array data.
    #[must_use]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// The typed chunked array.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if `T` does not match the data type.
    pub fn typed<T: Element>(&self) -> Result<&ChunkedArray<T>, ArrayError> {
        self.data.as_typed()
    }

    /// Read the element at `indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `T` does not match the data type, `indices` are out of bounds, or the chunk cannot be read.
    pub fn retrieve_element<T: Element>(&self, indices: &[u64]) -> Result<T, ArrayError> {
        self.typed::<T>()?.get(indices)
    }

    /// Write `element` at `indices`. The write reaches the store on eviction, flush or drop.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `T` does not match the data type, `indices` are out of bounds, or a chunk cannot be read or written.
    pub fn store_element<T: Element>(&self, indices: &[u64], element: T) -> Result<(), ArrayError> {
        self.typed::<T>()?.set(indices, element)
    }

    /// Read the elements of the chunk at `chunk_indices` in chunk memory layout order.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `T` does not match the data type, `chunk_indices` are out of bounds, or the chunk cannot be read.
    pub fn retrieve_chunk<T: Element>(&self, chunk_indices: &[u64]) -> Result<Vec<T>, ArrayError> {
        self.typed::<T>()?.retrieve_chunk(chunk_indices)
    }

    /// Write a whole chunk at `chunk_indices` from `elements` in chunk memory layout order.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `T` does not match the data type, `chunk_indices` are out of bounds,
    /// the number of elements is wrong, or the chunk cannot be written.
    pub fn store_chunk<T: Element>(
        &self,
        chunk_indices: &[u64],
        elements: &[T],
    ) -> Result<(), ArrayError> {
        self.typed::<T>()?.store_chunk(chunk_indices, elements)
    }

    /// Erase the chunk at `chunk_indices`. Its elements read as the fill value afterwards.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are out of bounds or the chunk cannot be erased.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        self.data.erase_chunk(chunk_indices)
    }

    /// Write all modified pooled chunks to the store.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a chunk cannot be written.
    pub fn flush(&self) -> Result<(), ArrayError> {
        self.data.flush()
    }

    /// The store key of the chunk at `chunk_indices`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        self.data.chunk_key(chunk_indices)
    }
}

/// The default chunk key separator of a Zarr version: `/` for V3, `.` for V2.
#[must_use]
pub fn default_chunk_key_separator(version: ZarrVersions) -> ChunkKeySeparator {
    match version {
        ZarrVersions::V3 => ChunkKeySeparator::Slash,
        ZarrVersions::V2 => ChunkKeySeparator::Dot,
    }
}
