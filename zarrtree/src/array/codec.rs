//! Chunk compressors.
//!
//! A compressor transforms the encoded bytes of a chunk before they are written to a store, and reverses the
//! transformation when a chunk is read. Compressors are identified by name:
//! - `binary`: [`RawCodec`], no compression.
//! - `gzip`: [`GzipCodec`], gzip compression (requires the `gzip` feature).
//!
//! Additional compressors implement [`CompressorPlugin`] and are registered with
//! [`ArrayRegistry::register_compressor`](crate::array::ArrayRegistry::register_compressor).

mod raw;

#[cfg(feature = "gzip")]
mod gzip;

use std::{borrow::Cow, sync::Arc};

use thiserror::Error;
use zarrtree_metadata::Configuration;
use zarrtree_plugin::PluginCreateError;
use zarrtree_storage::{MaybeSend, MaybeSync};

#[cfg(feature = "gzip")]
pub use gzip::{GzipCodec, GzipCodecConfiguration, GzipCompressionLevelError};
pub use raw::RawCodec;

/// A compressor failure.
#[derive(Clone, Debug, Error)]
pub enum CodecError {
    /// The compression stream failed.
    #[error(transparent)]
    IOError(#[from] Arc<std::io::Error>),
    /// Anything else, described by a message.
    #[error("{_0}")]
    Other(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(Arc::new(err))
    }
}

impl From<String> for CodecError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

/// Transforms chunk bytes on their way to and from the store.
pub trait CompressorTraits: core::fmt::Debug + MaybeSend + MaybeSync {
    /// The compressor name, e.g. `gzip`.
    fn name(&self) -> &'static str;

    /// The parameters written to array metadata.
    fn configuration(&self) -> Configuration;

    /// Compress the bytes of a chunk.
    ///
    /// # Errors
    /// Returns [`CodecError`] if compression fails.
    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError>;

    /// Restore the bytes of a chunk.
    ///
    /// # Errors
    /// Returns [`CodecError`] if the bytes are not a valid stream.
    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError>;
}

/// A compressor that can be registered with an [`ArrayRegistry`](crate::array::ArrayRegistry).
pub trait CompressorPlugin: CompressorTraits + Sized + 'static {
    /// The name arrays refer to the compressor by.
    const NAME: &'static str;

    /// Build the compressor from the parameters stored in array metadata.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the parameters are rejected.
    fn from_configuration(configuration: &Configuration) -> Result<Self, PluginCreateError>;
}

/// A compressor shared between the arrays using it.
pub type Compressor = Arc<dyn CompressorTraits>;
