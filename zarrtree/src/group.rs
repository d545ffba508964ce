//! Zarr groups.
//!
//! A group is a node in a Zarr hierarchy that may have child nodes (arrays or groups).
//!
//! An **explicit** group has a metadata document holding its attributes and extensions.
//! An **implicit** group has no document: it exists because a metadata document exists somewhere below it,
//! and it ceases to exist when its last descendant is erased.
//!
//! Use [`Hierarchy::create_group`] to create an explicit group and [`Group::open`] to open an existing one.

use std::collections::BTreeMap;

use thiserror::Error;
use zarrtree_metadata::{AttributesMap, ExtensionsMetadata};
use zarrtree_storage::StorageError;

use crate::{
    hierarchy::Hierarchy,
    node::{classify, get_children, NodeError, NodeKind, NodePath, NodePathError},
};

/// Version independent group metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMetadata {
    /// User attributes.
    pub attributes: AttributesMap,
    /// Extensions. V2 documents have none.
    pub extensions: ExtensionsMetadata,
}

/// A group creation error.
#[derive(Clone, Debug, Error)]
pub enum GroupCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Neither a group metadata document nor any descendant exists at the path.
    #[error("group metadata is missing at {_0}")]
    MissingMetadata(NodePath),
    /// An array exists at the path or at an ancestor path.
    #[error("cannot create a group at {path}: {existing_path} is an {existing}")]
    NodeKindConflict {
        /// The requested path.
        path: NodePath,
        /// The path of the conflicting node.
        existing_path: NodePath,
        /// The kind of the conflicting node.
        existing: NodeKind,
    },
}

/// A Zarr group bound to a [`Hierarchy`].
#[derive(Debug, Clone)]
pub struct Group {
    hierarchy: Hierarchy,
    path: NodePath,
    metadata: GroupMetadata,
    kind: NodeKind,
}

impl Group {
    /// Create an explicit group at `path` and write its metadata.
    pub(crate) fn create(
        hierarchy: &Hierarchy,
        path: NodePath,
        metadata: GroupMetadata,
    ) -> Result<Self, GroupCreateError> {
        let storage = &**hierarchy.storage();
        let layout = hierarchy.layout();
        for existing_path in path.ancestors().into_iter().chain([path.clone()]) {
            if storage.exists(&layout.array_metadata_key(&existing_path))? {
                return Err(GroupCreateError::NodeKindConflict {
                    path,
                    existing_path,
                    existing: NodeKind::Array,
                });
            }
        }
        layout.store_group_metadata(storage, &path, &metadata)?;
        Ok(Self {
            hierarchy: hierarchy.clone(),
            path,
            metadata,
            kind: NodeKind::ExplicitGroup,
        })
    }

    /// Open the group at `path` of `hierarchy`.
    ///
    /// A path without a group metadata document opens as an implicit group with empty attributes
    /// if a metadata document exists below it.
    ///
    /// # Errors
    /// Returns [`GroupCreateError::MissingMetadata`] if there is no group at `path`,
    /// or a [`StorageError`] if the metadata cannot be read or is invalid.
    pub fn open(hierarchy: &Hierarchy, path: &str) -> Result<Self, GroupCreateError> {
        let path = NodePath::new(path)?;
        let storage = &**hierarchy.storage();
        let layout = hierarchy.layout();
        let (metadata, kind) = if let Some(metadata) = layout.retrieve_group_metadata(storage, &path)? {
            (metadata, NodeKind::ExplicitGroup)
        } else if classify(storage, layout, &path)? == Some(NodeKind::ImplicitGroup) {
            (GroupMetadata::default(), NodeKind::ImplicitGroup)
        } else {
            return Err(GroupCreateError::MissingMetadata(path));
        };
        Ok(Self {
            hierarchy: hierarchy.clone(),
            path,
            metadata,
            kind,
        })
    }

    /// The node path.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The group name, empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// The group metadata.
    #[must_use]
    pub fn metadata(&self) -> &GroupMetadata {
        &self.metadata
    }

    /// The user attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributesMap {
        &self.metadata.attributes
    }

    /// The extensions.
    #[must_use]
    pub fn extensions(&self) -> &ExtensionsMetadata {
        &self.metadata.extensions
    }

    /// [`NodeKind::ExplicitGroup`] or [`NodeKind::ImplicitGroup`], at the time the group was opened.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns true if the group had no metadata document when opened.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.kind == NodeKind::ImplicitGroup
    }

    /// The immediate children of the group, keyed by name.
    ///
    /// # Errors
    /// Returns a [`NodeError`] if the group no longer exists or the store cannot be listed.
    pub fn children(&self) -> Result<BTreeMap<String, NodeKind>, NodeError> {
        get_children(&**self.hierarchy.storage(), self.hierarchy.layout(), &self.path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use zarrtree_plugin::ZarrVersions;
    use zarrtree_storage::store::MemoryStore;

    use super::*;
    use crate::{array::ArrayRegistry, hierarchy::create_hierarchy};

    fn attributes() -> AttributesMap {
        json!({"mostly": "harmless"}).as_object().unwrap().clone()
    }

    #[test]
    fn group_create_open() {
        for version in [ZarrVersions::V2, ZarrVersions::V3] {
            let store = Arc::new(MemoryStore::new());
            let hierarchy =
                create_hierarchy(store, version, Arc::new(ArrayRegistry::new())).unwrap();
            let group = hierarchy
                .create_group("/earth/magrathea", attributes(), vec![])
                .unwrap();
            assert_eq!(group.name(), "magrathea");
            assert!(!group.is_implicit());

            let group = Group::open(&hierarchy, "/earth/magrathea").unwrap();
            assert_eq!(group.kind(), NodeKind::ExplicitGroup);
            assert_eq!(group.attributes(), &attributes());

            let earth = Group::open(&hierarchy, "/earth").unwrap();
            assert!(earth.is_implicit());
            assert!(earth.attributes().is_empty());
            assert_eq!(
                earth.children().unwrap(),
                BTreeMap::from([("magrathea".to_string(), NodeKind::ExplicitGroup)])
            );

            assert!(matches!(
                Group::open(&hierarchy, "/vogsphere").unwrap_err(),
                GroupCreateError::MissingMetadata(_)
            ));
        }
    }

    #[test]
    fn group_extensions_v3() {
        let store = Arc::new(MemoryStore::new());
        let hierarchy =
            create_hierarchy(store, ZarrVersions::V3, Arc::new(ArrayRegistry::new())).unwrap();
        hierarchy
            .create_group("/g", AttributesMap::new(), vec![json!({"extension": 1})])
            .unwrap();
        let group = Group::open(&hierarchy, "/g").unwrap();
        assert_eq!(group.extensions(), &vec![json!({"extension": 1})]);
    }
}
