//! `zarrtree` global configuration options.
//!
//! See [`Config`] for the list of options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `zarrtree` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Chunk Pool Size
/// > default: `1`
///
/// The number of decoded chunks an array keeps in memory when the caller does not supply a pool size.
/// Dirty chunks are written back to the store when evicted, flushed, or dropped.
///
/// ## Metadata Indent
/// > default: `4`
///
/// The number of spaces used to indent metadata documents written to a store.
///
/// ## Overwrite Hierarchy
/// > default: [`true`]
///
/// If true, creating a hierarchy over an existing one rewrites its version marker.
/// If false, [`create_hierarchy`](crate::hierarchy::create_hierarchy) fails with
/// [`HierarchyCreateError::AlreadyExists`](crate::hierarchy::HierarchyCreateError::AlreadyExists).
#[derive(Debug, Clone)]
pub struct Config {
    chunk_pool_size: usize,
    metadata_indent: usize,
    overwrite_hierarchy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_pool_size: 1,
            metadata_indent: 4,
            overwrite_hierarchy: true,
        }
    }
}

impl Config {
    /// Get the [chunk pool size](#chunk-pool-size) configuration.
    #[must_use]
    pub fn chunk_pool_size(&self) -> usize {
        self.chunk_pool_size
    }

    /// Set the [chunk pool size](#chunk-pool-size) configuration.
    ///
    /// A pool size of zero is treated as one.
    pub fn set_chunk_pool_size(&mut self, chunk_pool_size: usize) -> &mut Self {
        self.chunk_pool_size = chunk_pool_size.max(1);
        self
    }

    /// Get the [metadata indent](#metadata-indent) configuration.
    #[must_use]
    pub fn metadata_indent(&self) -> usize {
        self.metadata_indent
    }

    /// Set the [metadata indent](#metadata-indent) configuration.
    pub fn set_metadata_indent(&mut self, metadata_indent: usize) -> &mut Self {
        self.metadata_indent = metadata_indent;
        self
    }

    /// Get the [overwrite hierarchy](#overwrite-hierarchy) configuration.
    #[must_use]
    pub fn overwrite_hierarchy(&self) -> bool {
        self.overwrite_hierarchy
    }

    /// Set the [overwrite hierarchy](#overwrite-hierarchy) configuration.
    pub fn set_overwrite_hierarchy(&mut self, overwrite_hierarchy: bool) -> &mut Self {
        self.overwrite_hierarchy = overwrite_hierarchy;
        self
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global `zarrtree` configuration.
///
/// This function deadlocks if the global config is already held mutably by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global `zarrtree` configuration.
///
/// This function deadlocks if the global config is already held mutably by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
