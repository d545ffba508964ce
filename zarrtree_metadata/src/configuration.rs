use derive_more::{Deref, DerefMut, From, Into};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A configuration: a JSON object of extension specific parameters, e.g. the `configuration` of a compressor.
#[derive(Default, Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Deref, DerefMut, From, Into)]
#[serde(transparent)]
pub struct Configuration(serde_json::Map<String, serde_json::Value>);

impl Configuration {
    /// Try and convert the configuration to a specific serializable configuration.
    ///
    /// # Errors
    /// Returns a [`serde_json`] error if the configuration cannot be converted.
    pub fn to_typed<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, std::sync::Arc<serde_json::Error>> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
            .map_err(std::sync::Arc::new)
    }

    /// Create a configuration from any serializable value which serializes to a JSON object.
    ///
    /// Values which do not serialize to an object give an empty configuration.
    #[must_use]
    pub fn from_serializable<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::Value::Object(self.0.clone()))
    }
}
