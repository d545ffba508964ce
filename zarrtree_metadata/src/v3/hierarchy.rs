use serde::{Deserialize, Serialize};

use crate::ExtensionsMetadata;

/// The V3 core protocol identifier written to `zarr.json`.
pub const ZARR_V3_PROTOCOL: &str = "https://purl.org/zarr/spec/protocol/core/3.0";

/// The V3 hierarchy marker document, stored at `zarr.json`.
///
/// ```json
/// {
///     "zarr_format": "https://purl.org/zarr/spec/protocol/core/3.0",
///     "metadata_encoding": "https://purl.org/zarr/spec/protocol/core/3.0",
///     "metadata_key_suffix": ".json",
///     "extensions": []
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct HierarchyMetadataV3 {
    /// The format identifier, a protocol URI or an integer version.
    pub zarr_format: serde_json::Value,
    /// The metadata encoding identifier.
    #[serde(default = "default_metadata_encoding")]
    pub metadata_encoding: String,
    /// The suffix of metadata document keys.
    #[serde(default = "default_metadata_key_suffix")]
    pub metadata_key_suffix: String,
    /// Extensions.
    #[serde(default)]
    pub extensions: ExtensionsMetadata,
}

fn default_metadata_encoding() -> String {
    ZARR_V3_PROTOCOL.to_string()
}

fn default_metadata_key_suffix() -> String {
    ".json".to_string()
}

impl Default for HierarchyMetadataV3 {
    fn default() -> Self {
        Self {
            zarr_format: ZARR_V3_PROTOCOL.into(),
            metadata_encoding: default_metadata_encoding(),
            metadata_key_suffix: default_metadata_key_suffix(),
            extensions: ExtensionsMetadata::default(),
        }
    }
}

impl HierarchyMetadataV3 {
    /// Returns the major format version declared by `zarr_format`, if it can be determined.
    ///
    /// Accepts an integer (e.g. `3`) or a protocol URI whose final segment is a version (e.g. `.../core/3.0`).
    #[must_use]
    pub fn zarr_format_version(&self) -> Option<u64> {
        match &self.zarr_format {
            serde_json::Value::Number(number) => number.as_u64(),
            serde_json::Value::String(uri) => uri
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .and_then(|version| version.split('.').next())
                .and_then(|major| major.parse().ok()),
            _ => None,
        }
    }
}
