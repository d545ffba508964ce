use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Fill value metadata: the JSON value used for array elements of chunks that have never been written.
///
/// Interpretation depends on the data type. Numbers are used as is, booleans for `bool` arrays,
/// and the strings `"NaN"`, `"Infinity"`, `"-Infinity"` for floating point arrays.
/// `null` means the zero value of the data type.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default, Display, From)]
#[serde(transparent)]
pub struct FillValueMetadata(serde_json::Value);

impl FillValueMetadata {
    /// Create fill value metadata from a JSON value.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<f64> for FillValueMetadata {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self("NaN".into())
        } else if value.is_infinite() {
            Self(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
        } else {
            Self(value.into())
        }
    }
}

impl From<i64> for FillValueMetadata {
    fn from(value: i64) -> Self {
        Self(value.into())
    }
}

impl From<u64> for FillValueMetadata {
    fn from(value: u64) -> Self {
        Self(value.into())
    }
}

impl From<bool> for FillValueMetadata {
    fn from(value: bool) -> Self {
        Self(value.into())
    }
}
