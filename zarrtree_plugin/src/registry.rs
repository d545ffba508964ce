//! An append-only registry of extensions.

use std::{collections::BTreeMap, fmt::Display};

use thiserror::Error;

/// A registry error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier is already registered.
    #[error("{extension_type} already registered: {identifier}")]
    AlreadyRegistered {
        /// The kind of extension, e.g. `compressor`.
        extension_type: &'static str,
        /// The offending identifier.
        identifier: String,
    },
}

/// An append-only registry mapping identifiers to extensions.
///
/// Registration requires exclusive access (`&mut self`), whereas lookups only need a shared reference.
/// Once a registry is shared (e.g. behind an [`Arc`](std::sync::Arc)) it can no longer be extended,
/// so registration cannot race with lookups.
///
/// # Type Parameters
///
/// * `K` - The identifier type (e.g. a data type and compressor name pair)
/// * `P` - The extension type to store (e.g. a builder function)
#[derive(Debug, Clone)]
pub struct ExtensionRegistry<K, P> {
    extension_type: &'static str,
    extensions: BTreeMap<K, P>,
}

impl<K: Ord + Display, P> ExtensionRegistry<K, P> {
    /// Create a new empty registry for extensions of kind `extension_type`.
    #[must_use]
    pub const fn new(extension_type: &'static str) -> Self {
        Self {
            extension_type,
            extensions: BTreeMap::new(),
        }
    }

    /// Register `extension` under `identifier`.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if `identifier` is already registered.
    pub fn register(&mut self, identifier: K, extension: P) -> Result<(), RegistryError> {
        if self.extensions.contains_key(&identifier) {
            return Err(RegistryError::AlreadyRegistered {
                extension_type: self.extension_type,
                identifier: identifier.to_string(),
            });
        }
        self.extensions.insert(identifier, extension);
        Ok(())
    }

    /// Returns the extension registered under `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &K) -> Option<&P> {
        self.extensions.get(identifier)
    }

    /// Returns true if `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &K) -> bool {
        self.extensions.contains_key(identifier)
    }

    /// Returns an iterator over the registered identifiers in order.
    pub fn identifiers(&self) -> impl Iterator<Item = &K> {
        self.extensions.keys()
    }

    /// Returns the number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true if no extensions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
