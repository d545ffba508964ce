use thiserror::Error;
use zarrtree_metadata::{ArrayShape, FillValueMetadata};
use zarrtree_plugin::{PluginCreateError, RegistryError};
use zarrtree_storage::StorageError;

use super::{codec::CodecError, DataType, UnknownDataTypeError};
use crate::node::{NodeKind, NodePath, NodePathError};

/// Errors creating or opening an [`Array`](super::Array).
#[derive(Clone, Debug, Error)]
pub enum ArrayCreateError {
    /// A malformed node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// The store failed or held an undecodable document.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// No array document exists at the path.
    #[error("array metadata is missing at {_0}")]
    MissingMetadata(NodePath),
    /// A data type string outside the supported set.
    #[error(transparent)]
    UnknownDataType(#[from] UnknownDataTypeError),
    /// The registry has no entry for the compressor and data type pair.
    #[error("unknown compressor {compressor} for data type {data_type}")]
    UnknownCompressor {
        /// The compressor name.
        compressor: String,
        /// The data type string.
        data_type: String,
    },
    /// The chunk shape and the array shape have different ranks.
    #[error("chunk shape has {0} dimensions but the array has {1}")]
    InvalidChunkGridDimensionality(usize, usize),
    /// An array shape with a zero extent.
    #[error("array shape {_0:?} has a zero extent")]
    InvalidShape(ArrayShape),
    /// A chunk shape with a zero extent or an extent beyond the array shape.
    #[error("chunk shape {chunk_shape:?} does not fit array shape {shape:?}")]
    InvalidChunkShape {
        /// The chunk shape.
        chunk_shape: ArrayShape,
        /// The array shape.
        shape: ArrayShape,
    },
    /// A chunk shape with more elements or bytes than can be addressed.
    #[error("chunk shape {_0:?} is too large")]
    ChunkTooLarge(ArrayShape),
    /// A fill value the data type cannot represent.
    #[error("fill value {fill_value_metadata} is not a `{data_type}`")]
    InvalidFillValueMetadata {
        /// The data type.
        data_type: DataType,
        /// The rejected fill value.
        fill_value_metadata: FillValueMetadata,
    },
    /// The compressor rejected its configuration.
    #[error(transparent)]
    CompressorCreateError(#[from] PluginCreateError),
    /// A node of another kind exists at the path or at an ancestor path.
    #[error("cannot create an array at {path}: {existing_path} is an {existing}")]
    NodeKindConflict {
        /// The requested path.
        path: NodePath,
        /// The path of the conflicting node.
        existing_path: NodePath,
        /// The kind of the conflicting node.
        existing: NodeKind,
    },
    /// The registry could not be populated.
    #[error(transparent)]
    RegistryError(#[from] RegistryError),
}

/// Errors reading or writing array elements and chunks.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ArrayError {
    /// The store failed.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// The compressor failed.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// Element indices outside the array.
    #[error("indices {_0:?} are outside array shape {_1:?}")]
    InvalidArrayIndices(Vec<u64>, ArrayShape),
    /// Chunk indices outside the chunk grid.
    #[error("chunk {_0:?} is outside the chunk grid")]
    InvalidChunkGridIndicesError(Vec<u64>),
    /// A stored chunk decoded to the wrong number of bytes.
    #[error("chunk decoded to {_0} bytes instead of {_1}")]
    UnexpectedChunkDecodedSize(usize, usize),
    /// A chunk write with the wrong number of elements.
    #[error("{_0} elements given for a chunk of {_1}")]
    InvalidElementCount(usize, usize),
    /// The Rust element type does not represent the array data type.
    #[error("element type does not match array data type {_0}")]
    IncompatibleElementType(DataType),
}
