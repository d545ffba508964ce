//! The data type and compressor registry.
//!
//! An [`ArrayRegistry`] maps a `(data type, compressor name)` pair to an [`ArrayDataBuilder`],
//! the routine that creates a typed [`ChunkedArray`] for that pair.
//! A hierarchy resolves every array it creates or opens through its registry, so the element type and compressor
//! are chosen at runtime from the strings persisted in array metadata.
//!
//! Registration takes `&mut self`. A registry is configured first and then shared as an [`Arc`](std::sync::Arc),
//! after which it is read-only.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use zarrtree::array::{ArrayRegistry, DataType};
//! let mut registry = ArrayRegistry::new();
//! # #[cfg(feature = "gzip")]
//! registry.register_compressor::<zarrtree::array::codec::GzipCodec>()?;
//! assert!(registry.contains(DataType::Float64, "binary"));
//! let registry = Arc::new(registry);
//! # Ok::<_, zarrtree::plugin::RegistryError>(())
//! ```

use std::sync::Arc;

use derive_more::Display;
use half::f16;
use zarrtree_plugin::{ExtensionRegistry, RegistryError};

use super::{
    codec::{CompressorPlugin, RawCodec},
    ArrayCreateError, ArrayData, ChunkedArray, ChunkedArrayParameters, DataType, Element,
};

/// A routine creating a typed chunked array.
pub type ArrayDataBuilder = fn(ChunkedArrayParameters) -> Result<ArrayData, ArrayCreateError>;

/// The identifier of an [`ArrayDataBuilder`] in an [`ArrayRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Display)]
#[display("data type {data_type} with compressor {compressor}")]
pub struct ArrayRegistryKey {
    /// The data type.
    pub data_type: DataType,
    /// The compressor name.
    pub compressor: String,
}

/// A caller-owned registry of [`ArrayDataBuilder`]s.
#[derive(Debug, Clone)]
pub struct ArrayRegistry(ExtensionRegistry<ArrayRegistryKey, ArrayDataBuilder>);

/// Build a chunked array of element `T` compressed with `C`.
///
/// # Errors
/// Returns an [`ArrayCreateError`] if the compressor configuration or fill value is invalid.
pub fn build_chunked_array<T: Element, C: CompressorPlugin>(
    parameters: ChunkedArrayParameters,
) -> Result<ArrayData, ArrayCreateError> {
    let compressor = Arc::new(C::from_configuration(
        &parameters.compressor_configuration,
    )?);
    let array = ChunkedArray::<T>::new(parameters, compressor)?;
    Ok(T::into_array_data(array))
}

fn builder_for<C: CompressorPlugin>(data_type: DataType) -> ArrayDataBuilder {
    match data_type {
        DataType::Bool => build_chunked_array::<bool, C>,
        DataType::Int8 => build_chunked_array::<i8, C>,
        DataType::Int16 => build_chunked_array::<i16, C>,
        DataType::Int32 => build_chunked_array::<i32, C>,
        DataType::Int64 => build_chunked_array::<i64, C>,
        DataType::UInt8 => build_chunked_array::<u8, C>,
        DataType::UInt16 => build_chunked_array::<u16, C>,
        DataType::UInt32 => build_chunked_array::<u32, C>,
        DataType::UInt64 => build_chunked_array::<u64, C>,
        DataType::Float16 => build_chunked_array::<f16, C>,
        DataType::Float32 => build_chunked_array::<f32, C>,
        DataType::Float64 => build_chunked_array::<f64, C>,
    }
}

impl Default for ArrayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayRegistry {
    /// Create a registry holding every data type with the `binary` compressor.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for data_type in DataType::ALL {
            registry.0.register(
                ArrayRegistryKey {
                    data_type,
                    compressor: RawCodec::NAME.to_string(),
                },
                builder_for::<RawCodec>(data_type),
            )
            // An empty registry has no duplicates
            .unwrap_or_default();
        }
        registry
    }

    /// Create a registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self(ExtensionRegistry::new("array builder"))
    }

    /// Register `builder` for `data_type` and `compressor`.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the pair is already registered.
    pub fn register(
        &mut self,
        data_type: DataType,
        compressor: &str,
        builder: ArrayDataBuilder,
    ) -> Result<(), RegistryError> {
        let key = ArrayRegistryKey {
            data_type,
            compressor: compressor.to_string(),
        };
        self.0.register(key, builder)
    }

    /// Register the compressor `C` for every data type.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if `C` is already registered for any data type.
    /// No entries are added in that case.
    pub fn register_compressor<C: CompressorPlugin>(&mut self) -> Result<(), RegistryError> {
        if let Some(data_type) = DataType::ALL
            .into_iter()
            .find(|&data_type| self.contains(data_type, C::NAME))
        {
            return Err(RegistryError::AlreadyRegistered {
                extension_type: "array builder",
                identifier: ArrayRegistryKey {
                    data_type,
                    compressor: C::NAME.to_string(),
                }
                .to_string(),
            });
        }
        for data_type in DataType::ALL {
            self.register(data_type, C::NAME, builder_for::<C>(data_type))?;
        }
        Ok(())
    }

    /// Returns true if a builder is registered for `data_type` and `compressor`.
    #[must_use]
    pub fn contains(&self, data_type: DataType, compressor: &str) -> bool {
        self.0.contains(&ArrayRegistryKey {
            data_type,
            compressor: compressor.to_string(),
        })
    }

    /// The registered pairs, in order.
    pub fn keys(&self) -> impl Iterator<Item = &ArrayRegistryKey> {
        self.0.identifiers()
    }

    /// The number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the chunked array for the data type string `data_type` (e.g. `<f8`) and `compressor`.
    ///
    /// The endianness marker of `data_type` overrides the endianness of `parameters`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::UnknownDataType`] if the data type is not supported,
    /// [`ArrayCreateError::UnknownCompressor`] if no builder is registered for the pair,
    /// or the error of the builder.
    pub fn build(
        &self,
        compressor: &str,
        data_type: &str,
        mut parameters: ChunkedArrayParameters,
    ) -> Result<ArrayData, ArrayCreateError> {
        let (data_type_parsed, endianness) = DataType::parse(data_type)?;
        let key = ArrayRegistryKey {
            data_type: data_type_parsed,
            compressor: compressor.to_string(),
        };
        let builder = self
            .0
            .get(&key)
            .ok_or_else(|| ArrayCreateError::UnknownCompressor {
                compressor: compressor.to_string(),
                data_type: data_type.to_string(),
            })?;
        parameters.endianness = endianness;
        builder(parameters)
    }
}
