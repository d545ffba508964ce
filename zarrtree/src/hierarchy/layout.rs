//! Version specific key layouts of a hierarchy.
//!
//! | Document          | Zarr V3                             | Zarr V2                         |
//! |-------------------|-------------------------------------|---------------------------------|
//! | Version marker    | `zarr.json`                         | `.zgroup`                       |
//! | Array metadata    | `meta/root{path}.array.json`        | `{path}/.zarray` (+ `.zattrs`)  |
//! | Group metadata    | `meta/root{path}.group.json`        | `{path}/.zgroup` (+ `.zattrs`)  |
//! | Chunks            | `data/root{path}/{chunk key}`       | `{path}/{chunk key}`            |

use std::collections::BTreeSet;

use serde::{de::DeserializeOwned, Serialize};
use zarrtree_chunk_key_encoding::ChunkKeyEncoding;
use zarrtree_metadata::{
    v2::{ArrayMetadataV2, GroupMetadataV2},
    v3::{ArrayMetadataV3, GroupMetadataV3, HierarchyMetadataV3},
    AttributesMap, ChunkKeySeparator,
};
use zarrtree_plugin::ZarrVersions;
use zarrtree_storage::{
    Bytes, MaybeSend, MaybeSync, ReadableWritableListableStorageTraits, StorageError, StoreKey,
    StoreKeysPrefixes, StorePrefix,
};

use crate::{array::ArrayMetadata, config::global_config, group::GroupMetadata, node::NodePath};

/// Serialize a metadata document as pretty JSON with the configured indent.
///
/// # Errors
/// Returns [`StorageError::Other`] if `metadata` cannot be serialized.
pub fn metadata_to_bytes<T: Serialize>(metadata: &T) -> Result<Bytes, StorageError> {
    let indent = vec![b' '; global_config().metadata_indent()];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut bytes = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    metadata
        .serialize(&mut serializer)
        .map_err(|err| StorageError::Other(err.to_string()))?;
    Ok(bytes.into())
}

fn store_document<T: Serialize>(
    storage: &dyn ReadableWritableListableStorageTraits,
    key: &StoreKey,
    document: &T,
) -> Result<(), StorageError> {
    log::debug!("write metadata {key}");
    storage.set(key, metadata_to_bytes(document)?)
}

fn retrieve_document<T: DeserializeOwned>(
    storage: &dyn ReadableWritableListableStorageTraits,
    key: &StoreKey,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = storage.get(key)? else {
        return Ok(None);
    };
    log::debug!("read metadata {key}");
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
}

fn key(key: String) -> StoreKey {
    // Node path names are valid segments, so keys built from them are valid
    unsafe { StoreKey::new_unchecked(key) }
}

fn prefix(prefix: String) -> StorePrefix {
    // Node path names are valid segments and prefixes are built with a trailing `/`
    unsafe { StorePrefix::new_unchecked(prefix) }
}

/// The key layout and metadata schema of a Zarr version.
pub trait HierarchyLayout: core::fmt::Debug + MaybeSend + MaybeSync {
    /// The Zarr version.
    fn version(&self) -> ZarrVersions;

    /// The key of the version marker written on hierarchy creation.
    fn marker_key(&self) -> StoreKey;

    /// Write the version marker.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the marker cannot be written.
    fn store_marker(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
    ) -> Result<(), StorageError>;

    /// The key of the array metadata document at `path`.
    fn array_metadata_key(&self, path: &NodePath) -> StoreKey;

    /// The key of the group metadata document at `path`.
    fn group_metadata_key(&self, path: &NodePath) -> StoreKey;

    /// The prefix of the metadata documents of the descendants of `path`.
    fn metadata_prefix(&self, path: &NodePath) -> StorePrefix;

    /// The prefix of the chunk keys of the array at `path`.
    fn data_prefix(&self, path: &NodePath) -> StorePrefix;

    /// Returns true if `key` is a metadata document key.
    fn is_metadata_key(&self, key: &StoreKey) -> bool;

    /// The candidate child names in a `list_dir` listing of a [metadata prefix](HierarchyLayout::metadata_prefix).
    fn child_names(&self, listing: &StoreKeysPrefixes) -> Vec<String>;

    /// The chunk key encoding of arrays with `separator`.
    fn chunk_key_encoding(&self, separator: ChunkKeySeparator) -> ChunkKeyEncoding {
        ChunkKeyEncoding::for_version(self.version(), separator)
    }

    /// Write the array metadata at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the metadata cannot be written.
    fn store_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &ArrayMetadata,
    ) -> Result<(), StorageError>;

    /// Read the array metadata at `path`, [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the metadata cannot be read or is invalid.
    fn retrieve_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<ArrayMetadata>, StorageError>;

    /// Write the group metadata at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the metadata cannot be written.
    fn store_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &GroupMetadata,
    ) -> Result<(), StorageError>;

    /// Read the group metadata at `path`, [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the metadata cannot be read or is invalid.
    fn retrieve_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<GroupMetadata>, StorageError>;

    /// Erase the metadata documents at `path`, leaving descendants in place.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a document cannot be erased.
    fn erase_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<(), StorageError>;
}

/// The Zarr V3 layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutV3;

impl LayoutV3 {
    const ARRAY_SUFFIX: &'static str = ".array.json";
    const GROUP_SUFFIX: &'static str = ".group.json";

    fn document_key(path: &NodePath, suffix: &str) -> StoreKey {
        if path.is_root() {
            key(format!("meta/root{suffix}"))
        } else {
            key(format!("meta/root{path}{suffix}"))
        }
    }
}

impl HierarchyLayout for LayoutV3 {
    fn version(&self) -> ZarrVersions {
        ZarrVersions::V3
    }

    fn marker_key(&self) -> StoreKey {
        key("zarr.json".to_string())
    }

    fn store_marker(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
    ) -> Result<(), StorageError> {
        store_document(storage, &self.marker_key(), &HierarchyMetadataV3::default())
    }

    fn array_metadata_key(&self, path: &NodePath) -> StoreKey {
        Self::document_key(path, Self::ARRAY_SUFFIX)
    }

    fn group_metadata_key(&self, path: &NodePath) -> StoreKey {
        Self::document_key(path, Self::GROUP_SUFFIX)
    }

    fn metadata_prefix(&self, path: &NodePath) -> StorePrefix {
        if path.is_root() {
            prefix("meta/root/".to_string())
        } else {
            prefix(format!("meta/root{path}/"))
        }
    }

    fn data_prefix(&self, path: &NodePath) -> StorePrefix {
        if path.is_root() {
            prefix("data/root/".to_string())
        } else {
            prefix(format!("data/root{path}/"))
        }
    }

    fn is_metadata_key(&self, key: &StoreKey) -> bool {
        let name = key.name();
        name.ends_with(Self::ARRAY_SUFFIX) || name.ends_with(Self::GROUP_SUFFIX)
    }

    fn child_names(&self, listing: &StoreKeysPrefixes) -> Vec<String> {
        let keys = listing.keys().iter().map(|key| {
            let name = key.name();
            name.strip_suffix(Self::ARRAY_SUFFIX)
                .or_else(|| name.strip_suffix(Self::GROUP_SUFFIX))
                .unwrap_or(name)
        });
        let prefixes = listing.prefixes().iter().map(StorePrefix::name);
        keys.chain(prefixes)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn store_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &ArrayMetadata,
    ) -> Result<(), StorageError> {
        store_document(storage, &self.array_metadata_key(path), &metadata.to_v3())
    }

    fn retrieve_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<ArrayMetadata>, StorageError> {
        Ok(
            retrieve_document::<ArrayMetadataV3>(storage, &self.array_metadata_key(path))?
                .map(ArrayMetadata::from_v3),
        )
    }

    fn store_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &GroupMetadata,
    ) -> Result<(), StorageError> {
        let document = GroupMetadataV3::new(metadata.attributes.clone(), metadata.extensions.clone());
        store_document(storage, &self.group_metadata_key(path), &document)
    }

    fn retrieve_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<GroupMetadata>, StorageError> {
        Ok(
            retrieve_document::<GroupMetadataV3>(storage, &self.group_metadata_key(path))?.map(
                |document| GroupMetadata {
                    attributes: document.attributes,
                    extensions: document.extensions,
                },
            ),
        )
    }

    fn erase_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<(), StorageError> {
        storage.erase(&self.array_metadata_key(path))?;
        storage.erase(&self.group_metadata_key(path))
    }
}

/// The Zarr V2 layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutV2;

impl LayoutV2 {
    const ARRAY_KEY: &'static str = ".zarray";
    const GROUP_KEY: &'static str = ".zgroup";
    const ATTRIBUTES_KEY: &'static str = ".zattrs";

    fn document_key(path: &NodePath, name: &str) -> StoreKey {
        if path.is_root() {
            key(name.to_string())
        } else {
            key(format!("{}/{name}", &path.as_str()[1..]))
        }
    }

    fn attributes_key(path: &NodePath) -> StoreKey {
        Self::document_key(path, Self::ATTRIBUTES_KEY)
    }

    fn store_attributes(
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        attributes: &AttributesMap,
    ) -> Result<(), StorageError> {
        let key = Self::attributes_key(path);
        if attributes.is_empty() {
            storage.erase(&key)
        } else {
            store_document(storage, &key, attributes)
        }
    }

    fn retrieve_attributes(
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<AttributesMap, StorageError> {
        Ok(retrieve_document(storage, &Self::attributes_key(path))?.unwrap_or_default())
    }
}

impl HierarchyLayout for LayoutV2 {
    fn version(&self) -> ZarrVersions {
        ZarrVersions::V2
    }

    fn marker_key(&self) -> StoreKey {
        self.group_metadata_key(&NodePath::root())
    }

    fn store_marker(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
    ) -> Result<(), StorageError> {
        store_document(storage, &self.marker_key(), &GroupMetadataV2::default())
    }

    fn array_metadata_key(&self, path: &NodePath) -> StoreKey {
        Self::document_key(path, Self::ARRAY_KEY)
    }

    fn group_metadata_key(&self, path: &NodePath) -> StoreKey {
        Self::document_key(path, Self::GROUP_KEY)
    }

    fn metadata_prefix(&self, path: &NodePath) -> StorePrefix {
        if path.is_root() {
            StorePrefix::root()
        } else {
            prefix(format!("{}/", &path.as_str()[1..]))
        }
    }

    fn data_prefix(&self, path: &NodePath) -> StorePrefix {
        self.metadata_prefix(path)
    }

    fn is_metadata_key(&self, key: &StoreKey) -> bool {
        matches!(
            key.name(),
            Self::ARRAY_KEY | Self::GROUP_KEY | Self::ATTRIBUTES_KEY
        )
    }

    fn child_names(&self, listing: &StoreKeysPrefixes) -> Vec<String> {
        listing
            .prefixes()
            .iter()
            .map(|prefix| prefix.name().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn store_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &ArrayMetadata,
    ) -> Result<(), StorageError> {
        store_document(storage, &self.array_metadata_key(path), &metadata.to_v2())?;
        Self::store_attributes(storage, path, &metadata.attributes)
    }

    fn retrieve_array_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<ArrayMetadata>, StorageError> {
        let Some(document) =
            retrieve_document::<ArrayMetadataV2>(storage, &self.array_metadata_key(path))?
        else {
            return Ok(None);
        };
        let attributes = Self::retrieve_attributes(storage, path)?;
        Ok(Some(ArrayMetadata::from_v2(document, attributes)))
    }

    fn store_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
        metadata: &GroupMetadata,
    ) -> Result<(), StorageError> {
        store_document(
            storage,
            &self.group_metadata_key(path),
            &GroupMetadataV2::default(),
        )?;
        Self::store_attributes(storage, path, &metadata.attributes)
    }

    fn retrieve_group_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<Option<GroupMetadata>, StorageError> {
        if retrieve_document::<GroupMetadataV2>(storage, &self.group_metadata_key(path))?.is_none()
        {
            return Ok(None);
        }
        Ok(Some(GroupMetadata {
            attributes: Self::retrieve_attributes(storage, path)?,
            extensions: Vec::new(),
        }))
    }

    fn erase_metadata(
        &self,
        storage: &dyn ReadableWritableListableStorageTraits,
        path: &NodePath,
    ) -> Result<(), StorageError> {
        storage.erase_values(&[
            self.array_metadata_key(path),
            self.group_metadata_key(path),
            Self::attributes_key(path),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_v3_keys() {
        let layout = LayoutV3;
        let root = NodePath::root();
        let path = NodePath::new("/arthur/dent").unwrap();
        assert_eq!(layout.array_metadata_key(&root).as_str(), "meta/root.array.json");
        assert_eq!(
            layout.array_metadata_key(&path).as_str(),
            "meta/root/arthur/dent.array.json"
        );
        assert_eq!(
            layout.group_metadata_key(&path).as_str(),
            "meta/root/arthur/dent.group.json"
        );
        assert_eq!(layout.metadata_prefix(&root).as_str(), "meta/root/");
        assert_eq!(layout.metadata_prefix(&path).as_str(), "meta/root/arthur/dent/");
        assert_eq!(layout.data_prefix(&path).as_str(), "data/root/arthur/dent/");
        assert_eq!(layout.marker_key().as_str(), "zarr.json");
        assert!(layout.is_metadata_key(&layout.group_metadata_key(&path)));
        assert!(!layout.is_metadata_key(&StoreKey::new("data/root/a/c/0").unwrap()));
    }

    #[test]
    fn layout_v2_keys() {
        let layout = LayoutV2;
        let root = NodePath::root();
        let path = NodePath::new("/arthur/dent").unwrap();
        assert_eq!(layout.array_metadata_key(&root).as_str(), ".zarray");
        assert_eq!(layout.array_metadata_key(&path).as_str(), "arthur/dent/.zarray");
        assert_eq!(layout.group_metadata_key(&path).as_str(), "arthur/dent/.zgroup");
        assert_eq!(LayoutV2::attributes_key(&path).as_str(), "arthur/dent/.zattrs");
        assert!(layout.metadata_prefix(&root).is_root());
        assert_eq!(layout.data_prefix(&path).as_str(), "arthur/dent/");
        assert_eq!(layout.marker_key().as_str(), ".zgroup");
        assert!(layout.is_metadata_key(&LayoutV2::attributes_key(&path)));
        assert!(!layout.is_metadata_key(&StoreKey::new("arthur/dent/0.0").unwrap()));
    }

    #[test]
    fn layout_child_names() {
        let listing = StoreKeysPrefixes::new(
            vec![
                StoreKey::new("meta/root/a/b.array.json").unwrap(),
                StoreKey::new("meta/root/a/c.group.json").unwrap(),
                StoreKey::new("meta/root/a/junk").unwrap(),
            ],
            vec![
                StorePrefix::new("meta/root/a/c/").unwrap(),
                StorePrefix::new("meta/root/a/d/").unwrap(),
            ],
        );
        assert_eq!(LayoutV3.child_names(&listing), ["b", "c", "d", "junk"]);
        assert_eq!(LayoutV2.child_names(&listing), ["c", "d"]);
    }

    #[test]
    fn metadata_indent() {
        let bytes = metadata_to_bytes(&HierarchyMetadataV3::default()).unwrap();
        let json = std::str::from_utf8(&bytes).unwrap();
        assert!(json.starts_with("{\n    \"zarr_format\": \"https://purl.org/zarr/spec/protocol/core/3.0\""));
        assert!(json.contains("\n    \"extensions\": []"));
    }
}
