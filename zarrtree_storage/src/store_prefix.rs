use derive_more::Display;
use thiserror::Error;

use crate::store_key::valid_segment;

/// A Zarr abstract store prefix.
///
/// A prefix is either empty (the store root) or a `/` delimited string which ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct StorePrefix(String);

/// An invalid store prefix.
#[derive(Debug, Clone, Error)]
#[error("invalid store prefix {0}")]
pub struct StorePrefixError(String);

/// A list of [`StorePrefix`].
pub type StorePrefixes = Vec<StorePrefix>;

impl StorePrefix {
    /// Create a new Zarr Prefix from `prefix`.
    ///
    /// # Errors
    /// Returns [`StorePrefixError`] if `prefix` is not valid according to [`StorePrefix::validate`()].
    pub fn new(prefix: impl Into<String>) -> Result<Self, StorePrefixError> {
        let prefix = prefix.into();
        if Self::validate(&prefix) {
            Ok(Self(prefix))
        } else {
            Err(StorePrefixError(prefix))
        }
    }

    /// Create a new Zarr Prefix from `prefix` without validation.
    ///
    /// # Safety
    /// `prefix` is not validated, so this can result in an invalid store prefix.
    #[must_use]
    pub unsafe fn new_unchecked(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        debug_assert!(Self::validate(&prefix));
        Self(prefix)
    }

    /// The root prefix.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Extracts a string slice containing the entire `String`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if this is the root prefix.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates a prefix.
    ///
    /// A prefix is valid if it is empty, or ends with `/` and every segment before it is a
    /// [valid segment](crate::valid_segment).
    #[must_use]
    pub fn validate(prefix: &str) -> bool {
        prefix.is_empty()
            || prefix
                .strip_suffix('/')
                .is_some_and(|p| p.split('/').all(valid_segment))
    }

    /// Returns the final path segment of the prefix, without the trailing `/`.
    #[must_use]
    pub fn name(&self) -> &str {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        trimmed.rsplit_once('/').map_or(trimmed, |(_, name)| name)
    }

    /// Returns the prefix of the child directory `name`.
    ///
    /// # Errors
    /// Returns [`StorePrefixError`] if `name` contains `/` or is not a [valid segment](crate::valid_segment).
    pub fn child(&self, name: &str) -> Result<Self, StorePrefixError> {
        if !valid_segment(name) || name.contains('/') {
            return Err(StorePrefixError(format!("{self}{name}/")));
        }
        Ok(Self(format!("{}{name}/", self.0)))
    }
}

impl TryFrom<&str> for StorePrefix {
    type Error = StorePrefixError;

    fn try_from(prefix: &str) -> Result<Self, Self::Error> {
        Self::new(prefix)
    }
}
