//! Extension registration primitives for the [`zarrtree`](https://docs.rs/zarrtree) crate.
//!
//! An [`ExtensionRegistry`] maps an identifier (such as a data type and compressor name pair) to a builder.
//! Registries are append-only: registering an identifier twice is a configuration error rather than a silent overwrite.
//!
//! This crate also defines the supported Zarr versions ([`ZarrVersions`]) and the errors raised when an extension cannot be created from its configuration.
//!
//! ## Licence
//! `zarrtree_plugin` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

use thiserror::Error;

mod registry;
pub use registry::{ExtensionRegistry, RegistryError};

mod zarr_version;
pub use zarr_version::{UnsupportedZarrVersionError, ZarrVersions};

/// The configuration handed to an extension could not be used.
#[derive(Clone, Debug, Error)]
#[error("unusable extension configuration: {reason}")]
pub struct PluginConfigurationInvalidError {
    reason: String,
}

impl PluginConfigurationInvalidError {
    /// Reject a configuration for `reason`.
    #[must_use]
    pub fn new(reason: String) -> Self {
        Self { reason }
    }

    /// Why the configuration was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An extension could not be built from its metadata.
#[derive(Clone, Debug, Error)]
pub enum PluginCreateError {
    /// The configuration was rejected.
    #[error(transparent)]
    ConfigurationInvalid(#[from] PluginConfigurationInvalidError),
    /// Anything else, described by a message.
    #[error("{_0}")]
    Other(String),
}

impl From<String> for PluginCreateError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}
