use serde::{Deserialize, Serialize};

use crate::Configuration;

/// The base of V3 codec identifier URIs.
pub const CODEC_URI_BASE: &str = "https://purl.org/zarr/spec/codec/";

/// The `compressor` member of a V3 array document.
///
/// ```json
/// {
///     "codec": "https://purl.org/zarr/spec/codec/gzip/1.0",
///     "configuration": { "level": 1 }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct CompressorMetadataV3 {
    /// The codec identifier URI, ending with `/{name}/{version}`.
    pub codec: String,
    /// The codec configuration.
    #[serde(default)]
    pub configuration: Configuration,
}

impl CompressorMetadataV3 {
    /// Create compressor metadata for the version `1.0` codec `name`.
    #[must_use]
    pub fn new(name: &str, configuration: Configuration) -> Self {
        Self {
            codec: format!("{CODEC_URI_BASE}{name}/1.0"),
            configuration,
        }
    }

    /// The codec name: the second-to-last segment of the codec URI.
    ///
    /// A codec identifier without any `/` is returned as is.
    #[must_use]
    pub fn name(&self) -> &str {
        let mut segments = self.codec.trim_end_matches('/').rsplit('/');
        segments.next();
        segments.next().unwrap_or(&self.codec)
    }
}
