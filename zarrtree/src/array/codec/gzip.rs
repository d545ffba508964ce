//! The `gzip` compressor, [RFC 1952](https://datatracker.ietf.org/doc/html/rfc1952) streams via `flate2`.
//!
//! Its configuration is a single level:
//! ```rust
//! # let JSON = r#"
//! {
//!     "level": 1
//! }
//! # "#;
//! # use zarrtree::array::codec::GzipCodecConfiguration;
//! # serde_json::from_str::<GzipCodecConfiguration>(JSON).unwrap();
//! ```

use std::{
    borrow::Cow,
    io::{Read, Write},
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zarrtree_metadata::Configuration;
use zarrtree_plugin::{PluginConfigurationInvalidError, PluginCreateError};

use super::{CodecError, CompressorPlugin, CompressorTraits};

/// Parameters of the `gzip` compressor.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct GzipCodecConfiguration {
    /// 0 (store) to 9 (smallest).
    pub level: u32,
}

/// A gzip level above 9.
#[derive(Clone, Copy, Debug, Error)]
#[error("gzip level {0} is above 9")]
pub struct GzipCompressionLevelError(u32);

/// Gzip compression of chunk bytes.
#[derive(Clone, Copy, Debug)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// Compress at `level`.
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if `level` is above 9.
    pub fn new(level: u32) -> Result<Self, GzipCompressionLevelError> {
        match level {
            0..=9 => Ok(Self {
                level: Compression::new(level),
            }),
            _ => Err(GzipCompressionLevelError(level)),
        }
    }

    /// Compress at `configuration.level`.
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if the level is above 9.
    pub fn new_with_configuration(
        configuration: &GzipCodecConfiguration,
    ) -> Result<Self, GzipCompressionLevelError> {
        Self::new(configuration.level)
    }
}

impl CompressorTraits for GzipCodec {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configuration(&self) -> Configuration {
        Configuration::from_serializable(&GzipCodecConfiguration {
            level: self.level.level(),
        })
    }

    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(&decoded_value)?;
        Ok(Cow::Owned(encoder.finish()?))
    }

    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut decoded = Vec::with_capacity(encoded_value.len());
        GzDecoder::new(encoded_value.as_ref()).read_to_end(&mut decoded)?;
        Ok(Cow::Owned(decoded))
    }
}

impl CompressorPlugin for GzipCodec {
    const NAME: &'static str = "gzip";

    fn from_configuration(configuration: &Configuration) -> Result<Self, PluginCreateError> {
        let gzip_configuration: GzipCodecConfiguration =
            configuration.to_typed().map_err(|_| {
                PluginConfigurationInvalidError::new(format!(
                    "{configuration} is not a gzip configuration"
                ))
            })?;
        Self::new_with_configuration(&gzip_configuration)
            .map_err(|err| PluginConfigurationInvalidError::new(err.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_gzip_configuration_valid() {
        let configuration: Configuration = serde_json::from_str(r#"{"level": 1}"#).unwrap();
        let codec = GzipCodec::from_configuration(&configuration).unwrap();
        assert_eq!(codec.configuration(), configuration);
    }

    #[test]
    fn codec_gzip_configuration_invalid() {
        let configuration: Configuration = serde_json::from_str(r#"{"level": 10}"#).unwrap();
        assert!(GzipCodec::from_configuration(&configuration).is_err());
        assert!(GzipCodec::from_configuration(&Configuration::default()).is_err());
    }

    #[test]
    fn codec_gzip_round_trip() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes: Vec<u8> = elements.iter().flat_map(|e| e.to_le_bytes()).collect();
        let codec = GzipCodec::new(5).unwrap();
        let encoded = codec.encode(Cow::Borrowed(&bytes)).unwrap();
        assert_ne!(encoded.as_ref(), bytes.as_slice());
        let decoded = codec.decode(encoded).unwrap();
        assert_eq!(decoded.as_ref(), bytes.as_slice());
    }
}
