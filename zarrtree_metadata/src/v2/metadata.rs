use serde::{Deserialize, Serialize};

use crate::Configuration;

/// A V2 compressor object: an `id` beside the compressor's own parameters.
///
/// ```json
/// {
///     "id": "gzip",
///     "level": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: Configuration,
}

impl MetadataV2 {
    /// Pair `id` with the parameters in `configuration`.
    #[must_use]
    pub fn new(id: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// The compressor id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Every field other than `id`.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}
