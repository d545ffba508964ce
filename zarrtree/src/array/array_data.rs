use half::f16;

use super::{ArrayError, ChunkedArray, DataType, Element, Endianness};
use zarrtree_storage::StoreKey;

/// A chunked array of any supported element type.
///
/// This is the result of resolving a data type and compressor through an [`ArrayRegistry`](super::ArrayRegistry).
/// Use [`ArrayData::as_typed`] to access the elements.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ArrayData {
    Bool(ChunkedArray<bool>),
    Int8(ChunkedArray<i8>),
    Int16(ChunkedArray<i16>),
    Int32(ChunkedArray<i32>),
    Int64(ChunkedArray<i64>),
    UInt8(ChunkedArray<u8>),
    UInt16(ChunkedArray<u16>),
    UInt32(ChunkedArray<u32>),
    UInt64(ChunkedArray<u64>),
    Float16(ChunkedArray<f16>),
    Float32(ChunkedArray<f32>),
    Float64(ChunkedArray<f64>),
}

macro_rules! array_data_apply {
    ($self:expr, $array:ident => $body:expr) => {
        match $self {
            ArrayData::Bool($array) => $body,
            ArrayData::Int8($array) => $body,
            ArrayData::Int16($array) => $body,
            ArrayData::Int32($array) => $body,
            ArrayData::Int64($array) => $body,
            ArrayData::UInt8($array) => $body,
            ArrayData::UInt16($array) => $body,
            ArrayData::UInt32($array) => $body,
            ArrayData::UInt64($array) => $body,
            ArrayData::Float16($array) => $body,
            ArrayData::Float32($array) => $body,
            ArrayData::Float64($array) => $body,
        }
    };
}

impl ArrayData {
    /// The data type of the elements.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float16(_) => DataType::Float16,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
        }
    }

    /// The typed chunked array.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if `T` does not match the data type.
    pub fn as_typed<T: Element>(&self) -> Result<&ChunkedArray<T>, ArrayError> {
        T::from_array_data(self).ok_or(ArrayError::IncompatibleElementType(self.data_type()))
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        array_data_apply!(self, array => array.shape())
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        array_data_apply!(self, array => array.chunk_shape())
    }

    /// The byte order of encoded elements.
    #[must_use]
    pub fn endianness(&self) -> Endianness {
        array_data_apply!(self, array => array.endianness())
    }

    /// The chunk pool size.
    #[must_use]
    pub fn chunk_pool_size(&self) -> usize {
        array_data_apply!(self, array => array.chunk_pool_size())
    }

    /// The name of the compressor.
    #[must_use]
    pub fn compressor_name(&self) -> &'static str {
        array_data_apply!(self, array => array.compressor().name())
    }

    /// The store key of the chunk at `chunk_indices`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        array_data_apply!(self, array => array.chunk_key(chunk_indices))
    }

    /// Write all modified pooled chunks to the store.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a chunk cannot be written.
    pub fn flush(&self) -> Result<(), ArrayError> {
        array_data_apply!(self, array => array.flush())
    }

    /// Erase the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are out of bounds or the chunk cannot be erased.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        array_data_apply!(self, array => array.erase_chunk(chunk_indices))
    }
}
