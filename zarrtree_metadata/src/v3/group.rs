use serde::{Deserialize, Serialize};

use crate::{AttributesMap, ExtensionsMetadata};

/// A V3 group document, stored at `meta/root{path}.group.json`.
///
/// ```json
/// {
///     "attributes": { "spam": "ham" },
///     "extensions": []
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct GroupMetadataV3 {
    /// User attributes.
    #[serde(default)]
    pub attributes: AttributesMap,
    /// Extensions.
    #[serde(default)]
    pub extensions: ExtensionsMetadata,
}

impl GroupMetadataV3 {
    /// Create group metadata with `attributes` and `extensions`.
    #[must_use]
    pub fn new(attributes: AttributesMap, extensions: ExtensionsMetadata) -> Self {
        Self {
            attributes,
            extensions,
        }
    }
}
