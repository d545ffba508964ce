use derive_more::Display;
use thiserror::Error;

use crate::StorePrefix;

/// A Zarr abstract store key.
///
/// A key is a `/` delimited string which does not start or end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct StoreKey(String);

/// An invalid store key.
#[derive(Debug, Clone, Error)]
#[error("invalid store key {0}")]
pub struct StoreKeyError(String);

/// A list of [`StoreKey`].
pub type StoreKeys = Vec<StoreKey>;

/// Returns true if `segment` can appear between the `/` of a key or prefix.
///
/// Segments are non-empty and are not the relative path names `.` or `..`.
#[must_use]
pub fn valid_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

impl StoreKey {
    /// Create a new Zarr abstract store key from `key`.
    ///
    /// # Errors
    /// Returns [`StoreKeyError`] if `key` is not valid according to [`StoreKey::validate`()].
    pub fn new(key: impl Into<String>) -> Result<Self, StoreKeyError> {
        let key = key.into();
        if Self::validate(&key) {
            Ok(Self(key))
        } else {
            Err(StoreKeyError(key))
        }
    }

    /// Create a new Zarr abstract store key from `key` without validation.
    ///
    /// # Safety
    /// `key` is not validated, so this can result in an invalid store key.
    #[must_use]
    pub unsafe fn new_unchecked(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(Self::validate(&key));
        Self(key)
    }

    /// Extracts a string slice of the underlying Key [String].
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Validates a key.
    ///
    /// A key is valid if it is non-empty and every `/` separated segment is a [valid segment](valid_segment).
    /// So a key never starts or ends with `/`.
    #[must_use]
    pub fn validate(key: &str) -> bool {
        !key.is_empty() && key.split('/').all(valid_segment)
    }

    /// Returns true if the key has prefix `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &StorePrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }

    /// Convert to a child key of `prefix`.
    #[must_use]
    pub fn to_key(&self, prefix: &StorePrefix) -> Self {
        Self(prefix.as_str().to_string() + self.as_str())
    }

    /// Returns the final path segment of the key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.as_str(), |(_, name)| name)
    }

    /// Returns the parent of this key.
    #[must_use]
    pub fn parent(&self) -> StorePrefix {
        let key_split: Vec<_> = self.as_str().split('/').collect();
        let mut parent = key_split[..key_split.len() - 1].join("/");
        if !parent.is_empty() {
            parent.push('/');
        }
        unsafe { StorePrefix::new_unchecked(parent) }
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = StoreKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}
