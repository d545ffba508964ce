use zarrtree_metadata::{
    ArrayShape, AttributesMap, ChunkKeySeparator, ChunkMemoryLayout, Configuration,
    ExtensionsMetadata, FillValueMetadata,
};
use zarrtree_plugin::ZarrVersions;

use super::{
    codec::{CompressorPlugin, RawCodec},
    default_chunk_key_separator, Array, ArrayCreateError, ArrayMetadata,
};
use crate::{config::global_config, hierarchy::Hierarchy, node::NodePath};

/// An [`Array`] builder.
///
/// [`ArrayBuilder`] is initialised from an array shape, data type, chunk shape, and fill value.
///  - The default compressor is `binary` (no compression).
///  - The default chunk memory layout is `C`.
///  - The default chunk key separator depends on the Zarr version of the hierarchy: `/` for V3 and `.` for V2.
///  - Attributes and extensions are empty.
///  - The chunk pool size defaults to the [global configuration](crate::config::Config::chunk_pool_size).
///
/// Use the methods in the array builder to change the configuration away from these defaults,
/// and then create the array in a hierarchy with [`ArrayBuilder::build`].
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # use std::sync::Arc;
/// use zarrtree::{array::{ArrayBuilder, ArrayRegistry}, hierarchy::create_hierarchy, plugin::ZarrVersions};
/// # let store = Arc::new(zarrtree::storage::store::MemoryStore::new());
/// let hierarchy = create_hierarchy(store, ZarrVersions::V3, Arc::new(ArrayRegistry::new()))?;
/// let array = ArrayBuilder::new(
///     vec![4, 4], // array shape
///     "<f8",      // data type
///     vec![2, 2], // chunk shape
///     6.6,        // fill value
/// )
/// .build(&hierarchy, "/arthur/dent")?;
/// assert_eq!(array.retrieve_element::<f64>(&[2, 1])?, 6.6);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArrayBuilder {
    /// Array shape.
    pub shape: ArrayShape,
    /// Data type string.
    pub data_type: String,
    /// Chunk shape.
    pub chunk_shape: ArrayShape,
    /// Fill value.
    pub fill_value: FillValueMetadata,
    /// Chunk memory layout.
    pub chunk_memory_layout: ChunkMemoryLayout,
    /// Chunk key separator. [`None`] for the default of the hierarchy version.
    pub chunk_key_separator: Option<ChunkKeySeparator>,
    /// Compressor name.
    pub compressor: String,
    /// Compressor configuration.
    pub compressor_configuration: Configuration,
    /// Attributes.
    pub attributes: AttributesMap,
    /// Extensions.
    pub extensions: ExtensionsMetadata,
    /// Chunk pool size. [`None`] for the global default.
    pub chunk_pool_size: Option<usize>,
}

impl ArrayBuilder {
    /// Create a new array builder.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: impl Into<String>,
        chunk_shape: ArrayShape,
        fill_value: impl Into<FillValueMetadata>,
    ) -> Self {
        Self {
            shape,
            data_type: data_type.into(),
            chunk_shape,
            fill_value: fill_value.into(),
            chunk_memory_layout: ChunkMemoryLayout::default(),
            chunk_key_separator: None,
            compressor: RawCodec::NAME.to_string(),
            compressor_configuration: Configuration::default(),
            attributes: AttributesMap::default(),
            extensions: ExtensionsMetadata::default(),
            chunk_pool_size: None,
        }
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type, e.g. `<f8`.
    pub fn data_type(&mut self, data_type: impl Into<String>) -> &mut Self {
        self.data_type = data_type.into();
        self
    }

    /// Set the chunk shape.
    pub fn chunk_shape(&mut self, chunk_shape: ArrayShape) -> &mut Self {
        self.chunk_shape = chunk_shape;
        self
    }

    /// Set the fill value.
    pub fn fill_value(&mut self, fill_value: impl Into<FillValueMetadata>) -> &mut Self {
        self.fill_value = fill_value.into();
        self
    }

    /// Set the chunk memory layout.
    pub fn chunk_memory_layout(&mut self, chunk_memory_layout: ChunkMemoryLayout) -> &mut Self {
        self.chunk_memory_layout = chunk_memory_layout;
        self
    }

    /// Set the chunk key separator.
    pub fn chunk_key_separator(&mut self, chunk_key_separator: ChunkKeySeparator) -> &mut Self {
        self.chunk_key_separator = Some(chunk_key_separator);
        self
    }

    /// Set the compressor by name, with its configuration.
    pub fn compressor(
        &mut self,
        compressor: impl Into<String>,
        configuration: Configuration,
    ) -> &mut Self {
        self.compressor = compressor.into();
        self.compressor_configuration = configuration;
        self
    }

    /// Set the user defined attributes.
    pub fn attributes(&mut self, attributes: AttributesMap) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Set the extensions.
    pub fn extensions(&mut self, extensions: ExtensionsMetadata) -> &mut Self {
        self.extensions = extensions;
        self
    }

    /// Set the number of decoded chunks held in memory by the created array.
    pub fn chunk_pool_size(&mut self, chunk_pool_size: usize) -> &mut Self {
        self.chunk_pool_size = Some(chunk_pool_size);
        self
    }

    /// The array metadata for a hierarchy of `version`.
    #[must_use]
    pub fn metadata(&self, version: ZarrVersions) -> ArrayMetadata {
        ArrayMetadata {
            shape: self.shape.clone(),
            chunk_shape: self.chunk_shape.clone(),
            data_type: self.data_type.clone(),
            chunk_memory_layout: self.chunk_memory_layout,
            chunk_key_separator: self
                .chunk_key_separator
                .unwrap_or_else(|| default_chunk_key_separator(version)),
            compressor: self.compressor.clone(),
            compressor_configuration: self.compressor_configuration.clone(),
            fill_value: self.fill_value.clone(),
            attributes: self.attributes.clone(),
            extensions: self.extensions.clone(),
        }
    }

    /// Create the array at `path` of `hierarchy` and write its metadata.
    ///
    /// An existing array at `path` is replaced.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if
    ///  - `path` is invalid,
    ///  - the shape or chunk shape is invalid,
    ///  - a group exists at `path` or an array exists at an ancestor of `path`,
    ///  - the data type and compressor are not registered, or the fill value is incompatible, or
    ///  - there was a storage error.
    pub fn build(&self, hierarchy: &Hierarchy, path: &str) -> Result<Array, ArrayCreateError> {
        let path = NodePath::new(path)?;
        let chunk_pool_size = self
            .chunk_pool_size
            .unwrap_or_else(|| global_config().chunk_pool_size());
        Array::create(
            hierarchy,
            path,
            self.metadata(hierarchy.version()),
            chunk_pool_size,
        )
    }
}
