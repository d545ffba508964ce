use std::collections::BTreeMap;

use zarrtree_storage::{ReadableWritableListableStorageTraits, StorageError};

use super::{NodeError, NodeKind, NodePath};
use crate::hierarchy::HierarchyLayout;

/// Classify the node at `path`, returning [`None`] if it is not part of the hierarchy.
///
/// The hierarchy root is always at least an implicit group.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub(crate) fn classify(
    storage: &dyn ReadableWritableListableStorageTraits,
    layout: &dyn HierarchyLayout,
    path: &NodePath,
) -> Result<Option<NodeKind>, StorageError> {
    if storage.exists(&layout.array_metadata_key(path))? {
        Ok(Some(NodeKind::Array))
    } else if storage.exists(&layout.group_metadata_key(path))? {
        Ok(Some(NodeKind::ExplicitGroup))
    } else if path.is_root()
        || storage
            .list_prefix(&layout.metadata_prefix(path))?
            .iter()
            .any(|key| layout.is_metadata_key(key))
    {
        Ok(Some(NodeKind::ImplicitGroup))
    } else {
        Ok(None)
    }
}

/// Get the immediate children of the node at `path`, keyed by name.
///
/// Objects below `path` that are not part of the hierarchy are skipped with a warning.
///
/// # Errors
/// Returns [`NodeError::NotFound`] if nothing exists at `path`, or a [`StorageError`] on a store failure.
pub(crate) fn get_children(
    storage: &dyn ReadableWritableListableStorageTraits,
    layout: &dyn HierarchyLayout,
    path: &NodePath,
) -> Result<BTreeMap<String, NodeKind>, NodeError> {
    let kind = classify(storage, layout, path)?.ok_or_else(|| NodeError::NotFound(path.clone()))?;
    let mut children = BTreeMap::new();
    if kind == NodeKind::Array {
        return Ok(children);
    }
    let listing = storage.list_dir(&layout.metadata_prefix(path))?;
    for name in layout.child_names(&listing) {
        let child_kind = match path.child(&name) {
            Ok(child_path) => classify(storage, layout, &child_path)?,
            Err(_) => None,
        };
        if let Some(child_kind) = child_kind {
            children.insert(name, child_kind);
        } else {
            let object_path = if path.is_root() {
                format!("/{name}")
            } else {
                format!("{path}/{name}")
            };
            log::warn!(
                "Object at {object_path} is not recognized as a component of a Zarr hierarchy. Ignoring."
            );
        }
    }
    Ok(children)
}

/// Recursively get all nodes from `path`, including `path` itself, ordered by path.
///
/// # Errors
/// Returns [`NodeError::NotFound`] if nothing exists at `path`, or a [`StorageError`] on a store failure.
pub(crate) fn get_nodes(
    storage: &dyn ReadableWritableListableStorageTraits,
    layout: &dyn HierarchyLayout,
    path: &NodePath,
) -> Result<BTreeMap<NodePath, NodeKind>, NodeError> {
    let kind = classify(storage, layout, path)?.ok_or_else(|| NodeError::NotFound(path.clone()))?;
    let mut nodes = BTreeMap::from([(path.clone(), kind)]);
    if kind.is_group() {
        for (name, child_kind) in get_children(storage, layout, path)? {
            let child_path = path.child(&name)?;
            if child_kind.is_group() {
                nodes.extend(get_nodes(storage, layout, &child_path)?);
            } else {
                nodes.insert(child_path, child_kind);
            }
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use zarrtree_storage::{store::MemoryStore, StoreKey, WritableStorageTraits};

    use super::*;
    use crate::hierarchy::{LayoutV2, LayoutV3};

    #[test]
    fn classify_v3() {
        let store = Arc::new(MemoryStore::new());
        let layout = LayoutV3;
        store
            .set(
                &StoreKey::new("meta/root/a/b.array.json").unwrap(),
                vec![].into(),
            )
            .unwrap();
        store
            .set(
                &StoreKey::new("meta/root/c.group.json").unwrap(),
                vec![].into(),
            )
            .unwrap();
        let classify = |path: &str| classify(&*store, &layout, &NodePath::new(path).unwrap()).unwrap();
        assert_eq!(classify("/"), Some(NodeKind::ImplicitGroup));
        assert_eq!(classify("/a"), Some(NodeKind::ImplicitGroup));
        assert_eq!(classify("/a/b"), Some(NodeKind::Array));
        assert_eq!(classify("/c"), Some(NodeKind::ExplicitGroup));
        assert_eq!(classify("/d"), None);
        assert_eq!(classify("/a/b/c"), None);
    }

    #[test]
    fn classify_v2() {
        let store = Arc::new(MemoryStore::new());
        let layout = LayoutV2;
        for key in [".zgroup", "a/b/.zarray", "a/b/0.0", "c/.zgroup", "d/e.bin"] {
            store.set(&StoreKey::new(key).unwrap(), vec![].into()).unwrap();
        }
        let classify = |path: &str| classify(&*store, &layout, &NodePath::new(path).unwrap()).unwrap();
        assert_eq!(classify("/"), Some(NodeKind::ExplicitGroup));
        assert_eq!(classify("/a"), Some(NodeKind::ImplicitGroup));
        assert_eq!(classify("/a/b"), Some(NodeKind::Array));
        assert_eq!(classify("/c"), Some(NodeKind::ExplicitGroup));
        assert_eq!(classify("/d"), None);
    }

    #[test]
    fn warning_get_children() {
        testing_logger::setup();
        let store = Arc::new(MemoryStore::new());
        let layout = LayoutV2;
        for key in [".zgroup", "group/.zgroup", "fakenode/content.bin"] {
            store.set(&StoreKey::new(key).unwrap(), vec![].into()).unwrap();
        }
        let children = get_children(&*store, &layout, &NodePath::root()).unwrap();
        assert_eq!(
            children,
            BTreeMap::from([("group".to_string(), NodeKind::ExplicitGroup)])
        );
        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert_eq!(
                captured_logs[0].body,
                "Object at /fakenode is not recognized as a component of a Zarr hierarchy. Ignoring."
            );
            assert_eq!(captured_logs[0].level, log::Level::Warn);
        });
    }

    #[test]
    fn get_nodes_missing() {
        let store = Arc::new(MemoryStore::new());
        let layout = LayoutV3;
        let path = NodePath::new("/missing").unwrap();
        assert!(matches!(
            get_nodes(&*store, &layout, &path).unwrap_err(),
            NodeError::NotFound(_)
        ));
        let nodes = get_nodes(&*store, &layout, &NodePath::root()).unwrap();
        assert_eq!(
            nodes,
            BTreeMap::from([(NodePath::root(), NodeKind::ImplicitGroup)])
        );
    }
}
