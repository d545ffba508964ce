//! Zarr hierarchies.
//!
//! A [`Hierarchy`] binds a store to a Zarr version and an [`ArrayRegistry`].
//! Every [`Node`], [`Array`] and [`Group`] is reached through a hierarchy, so the version is decided once:
//! - [`create_hierarchy`] writes the version marker of the requested version,
//! - [`get_hierarchy`] infers the version from the store: V3 if `zarr.json` exists, otherwise V2.
//!
//! The version selects a [`HierarchyLayout`], which maps node paths to metadata and chunk keys.
//!
//! The [`Hierarchy::tree`] function can be used to create a string representation of the hierarchy.

mod layout;

use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;
use zarrtree_metadata::{v3::HierarchyMetadataV3, AttributesMap, ExtensionsMetadata};
use zarrtree_plugin::{UnsupportedZarrVersionError, ZarrVersions};
use zarrtree_storage::{
    ReadableStorageTraits, ReadableWritableListableStorage, StorageError, StoreKey,
};

pub use self::layout::{metadata_to_bytes, HierarchyLayout, LayoutV2, LayoutV3};

use crate::{
    array::{Array, ArrayBuilder, ArrayCreateError, ArrayRegistry},
    config::global_config,
    group::{Group, GroupCreateError, GroupMetadata},
    node::{self, Node, NodeError, NodeKind, NodePath},
};

/// A hierarchy creation error.
#[derive(Clone, Debug, Error)]
pub enum HierarchyCreateError {
    /// The store holds a hierarchy of an unsupported version.
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedZarrVersionError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A version marker exists and overwriting is disabled.
    #[error("a hierarchy already exists at {key}")]
    AlreadyExists {
        /// The key of the existing version marker.
        key: StoreKey,
    },
}

/// Options for [`create_hierarchy_opt`].
#[derive(Debug, Clone)]
pub struct HierarchyCreateOptions {
    overwrite: bool,
}

impl Default for HierarchyCreateOptions {
    fn default() -> Self {
        Self {
            overwrite: global_config().overwrite_hierarchy(),
        }
    }
}

impl HierarchyCreateOptions {
    /// Set whether an existing version marker is overwritten.
    ///
    /// Defaults to the [global configuration](crate::config::Config::overwrite_hierarchy).
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Returns true if an existing version marker is overwritten.
    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

/// A Zarr hierarchy bound to a store, a Zarr version and an array registry.
///
/// Cloning is cheap: the store, layout and registry are shared.
#[derive(Clone)]
pub struct Hierarchy {
    storage: ReadableWritableListableStorage,
    layout: Arc<dyn HierarchyLayout>,
    registry: Arc<ArrayRegistry>,
}

impl core::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hierarchy")
            .field("storage", &self.storage.root())
            .field("version", &self.version())
            .field("registry", &self.registry.len())
            .finish()
    }
}

fn layout_for(version: ZarrVersions) -> Arc<dyn HierarchyLayout> {
    match version {
        ZarrVersions::V2 => Arc::new(LayoutV2),
        ZarrVersions::V3 => Arc::new(LayoutV3),
    }
}

/// Create a hierarchy of `version` in `storage` with default [`HierarchyCreateOptions`].
///
/// # Errors
/// Returns a [`HierarchyCreateError`] if the version marker cannot be written.
pub fn create_hierarchy(
    storage: ReadableWritableListableStorage,
    version: ZarrVersions,
    registry: Arc<ArrayRegistry>,
) -> Result<Hierarchy, HierarchyCreateError> {
    create_hierarchy_opt(storage, version, registry, &HierarchyCreateOptions::default())
}

/// Create a hierarchy of `version` in `storage` by writing its version marker.
///
/// # Errors
/// Returns [`HierarchyCreateError::AlreadyExists`] if a marker exists and `options` disable overwriting,
/// or a [`StorageError`] if the marker cannot be written.
pub fn create_hierarchy_opt(
    storage: ReadableWritableListableStorage,
    version: ZarrVersions,
    registry: Arc<ArrayRegistry>,
    options: &HierarchyCreateOptions,
) -> Result<Hierarchy, HierarchyCreateError> {
    let layout = layout_for(version);
    let key = layout.marker_key();
    if !options.overwrite() && storage.exists(&key)? {
        return Err(HierarchyCreateError::AlreadyExists { key });
    }
    layout.store_marker(&*storage)?;
    log::debug!("created {version} hierarchy in {}", storage.root());
    Ok(Hierarchy {
        storage,
        layout,
        registry,
    })
}

/// Open the hierarchy in `storage`, inferring its version.
///
/// A `zarr.json` marker gives V3, its absence gives V2. Nothing is written.
///
/// # Errors
/// Returns [`HierarchyCreateError::UnsupportedVersion`] if `zarr.json` names a version other than 3,
/// or a [`StorageError`] if the marker cannot be read or parsed.
pub fn get_hierarchy(
    storage: ReadableWritableListableStorage,
    registry: Arc<ArrayRegistry>,
) -> Result<Hierarchy, HierarchyCreateError> {
    let marker_key = LayoutV3.marker_key();
    let version = if let Some(bytes) = storage.get(&marker_key)? {
        let marker: HierarchyMetadataV3 = serde_json::from_slice(&bytes)
            .map_err(|err| StorageError::InvalidMetadata(marker_key.clone(), err.to_string()))?;
        match marker.zarr_format_version() {
            Some(3) => ZarrVersions::V3,
            _ => {
                return Err(UnsupportedZarrVersionError(marker.zarr_format.to_string()).into());
            }
        }
    } else {
        ZarrVersions::V2
    };
    log::debug!("inferred {version} hierarchy in {}", storage.root());
    Ok(Hierarchy::new(storage, version, registry))
}

impl Hierarchy {
    /// Bind `storage` as a hierarchy of `version` without reading or writing anything.
    #[must_use]
    pub fn new(
        storage: ReadableWritableListableStorage,
        version: ZarrVersions,
        registry: Arc<ArrayRegistry>,
    ) -> Self {
        Self {
            storage,
            layout: layout_for(version),
            registry,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn storage(&self) -> &ReadableWritableListableStorage {
        &self.storage
    }

    /// The Zarr version.
    #[must_use]
    pub fn version(&self) -> ZarrVersions {
        self.layout.version()
    }

    /// The key layout of the Zarr version.
    #[must_use]
    pub fn layout(&self) -> &dyn HierarchyLayout {
        &*self.layout
    }

    /// The array registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ArrayRegistry> {
        &self.registry
    }

    /// Create an array at `path` from `builder`.
    ///
    /// # Errors
    /// See [`ArrayBuilder::build`].
    pub fn create_array(&self, path: &str, builder: &ArrayBuilder) -> Result<Array, ArrayCreateError> {
        builder.build(self, path)
    }

    /// Open the array at `path`.
    ///
    /// # Errors
    /// See [`Array::open`].
    pub fn open_array(&self, path: &str) -> Result<Array, ArrayCreateError> {
        Array::open(self, path)
    }

    /// Open the array at `path` with a pool of `chunk_pool_size` chunks.
    ///
    /// # Errors
    /// See [`Array::open`].
    pub fn open_array_opt(
        &self,
        path: &str,
        chunk_pool_size: usize,
    ) -> Result<Array, ArrayCreateError> {
        Array::open_opt(self, path, chunk_pool_size)
    }

    /// Create an explicit group at `path` and write its metadata.
    ///
    /// An existing group at `path` is replaced.
    ///
    /// # Errors
    /// Returns [`GroupCreateError::NodeKindConflict`] if an array exists at `path` or at an ancestor of `path`,
    /// or another [`GroupCreateError`] if `path` is invalid or the metadata cannot be written.
    pub fn create_group(
        &self,
        path: &str,
        attributes: AttributesMap,
        extensions: ExtensionsMetadata,
    ) -> Result<Group, GroupCreateError> {
        let path = NodePath::new(path)?;
        Group::create(
            self,
            path,
            GroupMetadata {
                attributes,
                extensions,
            },
        )
    }

    /// Open the explicit or implicit group at `path`.
    ///
    /// # Errors
    /// See [`Group::open`].
    pub fn open_group(&self, path: &str) -> Result<Group, GroupCreateError> {
        Group::open(self, path)
    }

    /// Classify the node at `path`.
    ///
    /// # Errors
    /// See [`Node::open`].
    pub fn node(&self, path: &str) -> Result<Node, NodeError> {
        Node::open(self, path)
    }

    /// The immediate children of the node at `path`, keyed by name. Arrays have no children.
    ///
    /// Objects that are not part of the hierarchy are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if nothing exists at `path`, or another [`NodeError`] on a store failure.
    pub fn get_children(&self, path: &str) -> Result<BTreeMap<String, NodeKind>, NodeError> {
        let path = NodePath::new(path)?;
        node::get_children(&*self.storage, self.layout(), &path)
    }

    /// All nodes from `path` down, including `path` itself, ordered by path.
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if nothing exists at `path`, or another [`NodeError`] on a store failure.
    pub fn get_nodes(&self, path: &str) -> Result<BTreeMap<NodePath, NodeKind>, NodeError> {
        let path = NodePath::new(path)?;
        node::get_nodes(&*self.storage, self.layout(), &path)
    }

    /// Create a string representation of the hierarchy.
    ///
    /// # Errors
    /// Returns a [`NodeError`] if the hierarchy cannot be listed or an array cannot be read.
    pub fn tree(&self) -> Result<String, NodeError> {
        self.tree_of("/")
    }

    /// Create a string representation of the hierarchy below `path`.
    ///
    /// Each descendant is on its own line, indented by two spaces per level.
    /// Arrays are followed by their shape and data type.
    ///
    /// # Errors
    /// Returns a [`NodeError`] if `path` does not exist, the hierarchy cannot be listed, or an array cannot be read.
    pub fn tree_of(&self, path: &str) -> Result<String, NodeError> {
        let parent_path = NodePath::new(path)?;
        let parent_depth = parent_path.depth();
        let mut s = String::from(parent_path.as_str());
        s.push('\n');
        for (path, kind) in node::get_nodes(&*self.storage, self.layout(), &parent_path)? {
            if path == parent_path {
                continue;
            }
            let depth = path.depth().saturating_sub(parent_depth);
            s.push_str(&" ".repeat(depth * 2));
            s.push_str(path.name());
            if kind == NodeKind::Array {
                let metadata = self
                    .layout
                    .retrieve_array_metadata(&*self.storage, &path)?
                    .ok_or_else(|| NodeError::NotFound(path.clone()))?;
                s.push_str(&format!(" {:?} {}", metadata.shape, metadata.data_type));
            }
            s.push('\n');
        }
        Ok(s)
    }

    /// Erase the node at `path` with all of its descendants and chunks.
    ///
    /// Erasing the root empties the store and rewrites the version marker.
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if nothing exists at `path`, or a [`StorageError`] if the store cannot be modified.
    pub fn erase_node(&self, path: &str) -> Result<(), NodeError> {
        let path = NodePath::new(path)?;
        let storage = &*self.storage;
        if node::classify(storage, self.layout(), &path)?.is_none() {
            return Err(NodeError::NotFound(path));
        }
        if path.is_root() {
            storage.erase_prefix(&zarrtree_storage::StorePrefix::root())?;
            self.layout.store_marker(storage)?;
        } else {
            self.layout.erase_metadata(storage, &path)?;
            let metadata_prefix = self.layout.metadata_prefix(&path);
            let data_prefix = self.layout.data_prefix(&path);
            storage.erase_prefix(&metadata_prefix)?;
            if data_prefix != metadata_prefix {
                storage.erase_prefix(&data_prefix)?;
            }
        }
        log::debug!("erased node {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use zarrtree_storage::store::MemoryStore;

    use super::*;

    const EXPECTED_TREE: &str =
        "/\n  array [10, 10] <f4\n  group\n    array [10, 10] <f4\n    subgroup\n      mysubarray [10, 10] <f4\n";

    fn helper_create_dataset(version: ZarrVersions) -> Hierarchy {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, Arc::new(ArrayRegistry::new())).unwrap();
        let builder = ArrayBuilder::new(vec![10, 10], "<f4", vec![5, 5], 0.0);
        hierarchy.create_group("/group", AttributesMap::new(), vec![]).unwrap();
        hierarchy.create_array("/array", &builder).unwrap();
        hierarchy.create_array("/group/array", &builder).unwrap();
        hierarchy
            .create_group("/group/subgroup", AttributesMap::new(), vec![])
            .unwrap();
        hierarchy
            .create_array("/group/subgroup/mysubarray", &builder)
            .unwrap();
        hierarchy
    }

    #[test]
    fn hierarchy_tree() {
        for version in [ZarrVersions::V2, ZarrVersions::V3] {
            let hierarchy = helper_create_dataset(version);
            assert_eq!(hierarchy.tree().unwrap(), EXPECTED_TREE);
            assert_eq!(
                hierarchy.tree_of("/group/subgroup").unwrap(),
                "/group/subgroup\n  mysubarray [10, 10] <f4\n"
            );
        }
    }

    #[test]
    fn hierarchy_markers() {
        let store = Arc::new(MemoryStore::new());
        create_hierarchy(store.clone(), ZarrVersions::V3, Arc::new(ArrayRegistry::new())).unwrap();
        let bytes = store.get(&StoreKey::new("zarr.json").unwrap()).unwrap().unwrap();
        let marker: HierarchyMetadataV3 = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(marker, HierarchyMetadataV3::default());

        let store = Arc::new(MemoryStore::new());
        create_hierarchy(store.clone(), ZarrVersions::V2, Arc::new(ArrayRegistry::new())).unwrap();
        let bytes = store.get(&StoreKey::new(".zgroup").unwrap()).unwrap().unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&bytes).unwrap(),
            serde_json::json!({"zarr_format": 2})
        );
        assert!(!store.exists(&StoreKey::new("zarr.json").unwrap()).unwrap());
    }

    #[test]
    fn hierarchy_no_overwrite() {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(ArrayRegistry::new());
        let options = HierarchyCreateOptions::default().with_overwrite(false);
        create_hierarchy_opt(store.clone(), ZarrVersions::V3, registry.clone(), &options).unwrap();
        let err =
            create_hierarchy_opt(store.clone(), ZarrVersions::V3, registry.clone(), &options)
                .unwrap_err();
        assert!(matches!(err, HierarchyCreateError::AlreadyExists { .. }));
        assert_eq!(err.to_string(), "a hierarchy already exists at zarr.json");
        create_hierarchy(store, ZarrVersions::V3, registry).unwrap();
    }

    #[test]
    fn hierarchy_erase_node() {
        let hierarchy = helper_create_dataset(ZarrVersions::V3);
        let array = hierarchy.open_array("/group/subgroup/mysubarray").unwrap();
        array.store_element::<f32>(&[0, 0], 1.0).unwrap();
        array.flush().unwrap();
        let chunk_key = array.chunk_key(&[0, 0]);
        assert!(hierarchy.storage().exists(&chunk_key).unwrap());

        hierarchy.erase_node("/group").unwrap();
        assert!(!hierarchy.storage().exists(&chunk_key).unwrap());
        assert_eq!(hierarchy.tree().unwrap(), "/\n  array [10, 10] <f4\n");
        assert!(matches!(
            hierarchy.erase_node("/group").unwrap_err(),
            NodeError::NotFound(_)
        ));

        hierarchy.erase_node("/").unwrap();
        assert_eq!(hierarchy.tree().unwrap(), "/\n");
        assert!(hierarchy
            .storage()
            .exists(&StoreKey::new("zarr.json").unwrap())
            .unwrap());
    }
}
