//! The `binary` compressor: chunk bytes are stored as is.

use std::borrow::Cow;

use zarrtree_metadata::Configuration;
use zarrtree_plugin::{PluginConfigurationInvalidError, PluginCreateError};

use super::{CodecError, CompressorPlugin, CompressorTraits};

/// A `binary` (uncompressed) codec.
#[derive(Clone, Debug, Default)]
pub struct RawCodec;

impl RawCodec {
    /// Create a new `binary` codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CompressorTraits for RawCodec {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configuration(&self) -> Configuration {
        Configuration::default()
    }

    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        Ok(decoded_value)
    }

    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        Ok(encoded_value)
    }
}

impl CompressorPlugin for RawCodec {
    const NAME: &'static str = "binary";

    fn from_configuration(configuration: &Configuration) -> Result<Self, PluginCreateError> {
        if configuration.is_empty() {
            Ok(Self)
        } else {
            Err(PluginConfigurationInvalidError::new(format!(
                "binary compressor has no configuration, got {configuration}"
            ))
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_raw() {
        let codec = RawCodec::from_configuration(&Configuration::default()).unwrap();
        let bytes: Vec<u8> = (0..16).collect();
        let encoded = codec.encode(Cow::Borrowed(&bytes)).unwrap();
        assert!(matches!(encoded, Cow::Borrowed(_)));
        assert_eq!(codec.decode(encoded).unwrap().as_ref(), bytes.as_slice());
        assert_eq!(codec.name(), "binary");
    }

    #[test]
    fn codec_raw_configuration_invalid() {
        let configuration: Configuration = serde_json::from_str(r#"{"level": 1}"#).unwrap();
        assert!(RawCodec::from_configuration(&configuration).is_err());
    }
}
