#![allow(missing_docs)]

use std::{collections::BTreeMap, sync::Arc};

use serde_json::json;
use zarrtree::{
    array::{ArrayBuilder, ArrayCreateError, ArrayError, ArrayRegistry},
    group::GroupCreateError,
    hierarchy::{create_hierarchy, get_hierarchy, Hierarchy, HierarchyCreateError},
    metadata::{AttributesMap, ChunkKeySeparator, ChunkMemoryLayout, Configuration},
    node::{NodeError, NodeKind, NodePath},
    plugin::ZarrVersions,
    storage::{
        store::MemoryStore, ReadableStorageTraits, ReadableWritableListableStorage, StoreKey,
        WritableStorageTraits,
    },
};

const VERSIONS: [ZarrVersions; 2] = [ZarrVersions::V2, ZarrVersions::V3];

fn registry() -> Arc<ArrayRegistry> {
    #[allow(unused_mut)]
    let mut registry = ArrayRegistry::new();
    #[cfg(feature = "gzip")]
    registry
        .register_compressor::<zarrtree::array::codec::GzipCodec>()
        .unwrap();
    Arc::new(registry)
}

fn attributes(value: serde_json::Value) -> AttributesMap {
    value.as_object().unwrap().clone()
}

fn arthur_dent(hierarchy: &Hierarchy) {
    let mut builder = ArrayBuilder::new(vec![4, 4], "<f8", vec![2, 2], 6.6);
    builder.attributes(attributes(json!({"question": "life", "answer": 42})));
    let array = hierarchy.create_array("/arthur/dent", &builder).unwrap();
    array.store_element::<f64>(&[0, 0], 42.0).unwrap();
}

#[test]
fn hierarchy_array_round_trip() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store.clone(), version, registry()).unwrap();
        arthur_dent(&hierarchy);

        let hierarchy = get_hierarchy(store, registry()).unwrap();
        assert_eq!(hierarchy.version(), version);
        let array = hierarchy.open_array("/arthur/dent").unwrap();
        assert_eq!(array.shape(), &[4, 4]);
        assert_eq!(array.chunk_shape(), &[2, 2]);
        assert_eq!(array.data_type(), "<f8");
        assert_eq!(array.compressor(), "binary");
        assert_eq!(array.attributes()["answer"], 42);
        assert_eq!(array.retrieve_element::<f64>(&[2, 1]).unwrap(), 6.6);
        assert_eq!(array.retrieve_element::<f64>(&[0, 0]).unwrap(), 42.0);
        assert!(matches!(
            array.retrieve_element::<f32>(&[0, 0]).unwrap_err(),
            ArrayError::IncompatibleElementType(_)
        ));
    }
}

#[test]
fn hierarchy_chunk_keys() {
    let cases = [
        (ZarrVersions::V3, None, "data/root/arthur/dent/c/1/0"),
        (
            ZarrVersions::V3,
            Some(ChunkKeySeparator::Dot),
            "data/root/arthur/dent/c.1.0",
        ),
        (ZarrVersions::V2, None, "arthur/dent/1.0"),
        (ZarrVersions::V2, Some(ChunkKeySeparator::Slash), "arthur/dent/1/0"),
    ];
    for (version, separator, expected) in cases {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store.clone(), version, registry()).unwrap();
        let mut builder = ArrayBuilder::new(vec![4, 4], "<f8", vec![2, 2], 6.6);
        if let Some(separator) = separator {
            builder.chunk_key_separator(separator);
        }
        let array = hierarchy.create_array("/arthur/dent", &builder).unwrap();
        array.store_element::<f64>(&[2, 1], 1.5).unwrap();
        array.flush().unwrap();
        assert_eq!(array.chunk_key(&[1, 0]).as_str(), expected);
        assert!(store.exists(&StoreKey::new(expected).unwrap()).unwrap());
    }
}

#[test]
fn hierarchy_metadata_documents() {
    let store = Arc::new(MemoryStore::new());
    let hierarchy = create_hierarchy(store.clone(), ZarrVersions::V3, registry()).unwrap();
    arthur_dent(&hierarchy);
    let bytes = store
        .get(&StoreKey::new("meta/root/arthur/dent.array.json").unwrap())
        .unwrap()
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        document,
        json!({
            "shape": [4, 4],
            "chunk_grid": {"type": "regular", "chunk_shape": [2, 2], "separator": "/"},
            "attributes": {"question": "life", "answer": 42},
            "data_type": "<f8",
            "chunk_memory_layout": "C",
            "fill_value": 6.6,
            "extensions": []
        })
    );

    let store = Arc::new(MemoryStore::new());
    let hierarchy = create_hierarchy(store.clone(), ZarrVersions::V2, registry()).unwrap();
    arthur_dent(&hierarchy);
    let bytes = store
        .get(&StoreKey::new("arthur/dent/.zarray").unwrap())
        .unwrap()
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        document,
        json!({
            "zarr_format": 2,
            "shape": [4, 4],
            "chunks": [2, 2],
            "dtype": "<f8",
            "compressor": null,
            "fill_value": 6.6,
            "order": "C",
            "filters": null,
            "dimension_separator": "."
        })
    );
    let bytes = store
        .get(&StoreKey::new("arthur/dent/.zattrs").unwrap())
        .unwrap()
        .unwrap();
    assert!(std::str::from_utf8(&bytes)
        .unwrap()
        .contains("\n    \"question\": \"life\""));
}

#[test]
fn hierarchy_children_and_nodes() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        hierarchy
            .create_group("/marvin", AttributesMap::new(), vec![])
            .unwrap();
        hierarchy
            .create_array(
                "/marvin/android",
                &ArrayBuilder::new(vec![2], "|b1", vec![1], false),
            )
            .unwrap();
        arthur_dent(&hierarchy);

        let children = hierarchy.get_children("/marvin").unwrap();
        assert_eq!(
            children,
            BTreeMap::from([("android".to_string(), NodeKind::Array)])
        );
        assert!(hierarchy.get_children("/marvin/android").unwrap().is_empty());

        let nodes = hierarchy.get_nodes("/").unwrap();
        let nodes: Vec<(&str, NodeKind)> = nodes
            .iter()
            .map(|(path, kind)| (path.as_str(), *kind))
            .collect();
        let root_kind = match version {
            ZarrVersions::V2 => NodeKind::ExplicitGroup,
            ZarrVersions::V3 => NodeKind::ImplicitGroup,
        };
        assert_eq!(
            nodes,
            [
                ("/", root_kind),
                ("/arthur", NodeKind::ImplicitGroup),
                ("/arthur/dent", NodeKind::Array),
                ("/marvin", NodeKind::ExplicitGroup),
                ("/marvin/android", NodeKind::Array),
            ]
        );
        assert!(matches!(
            hierarchy.get_nodes("/zaphod").unwrap_err(),
            NodeError::NotFound(_)
        ));
    }
}

#[test]
fn hierarchy_classification() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        hierarchy
            .create_group("/marvin", AttributesMap::new(), vec![])
            .unwrap();
        arthur_dent(&hierarchy);

        let array = hierarchy.node("/arthur/dent").unwrap();
        assert_eq!(array.kind(), NodeKind::Array);
        assert_eq!(array.name(), "dent");
        assert_eq!(array.get_array().unwrap().shape(), &[4, 4]);
        let err = array.get_group().unwrap_err();
        assert!(matches!(err, NodeError::TypeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "node at /arthur/dent is an array, expected group"
        );

        let explicit = hierarchy.node("/marvin").unwrap();
        assert_eq!(explicit.kind(), NodeKind::ExplicitGroup);
        assert!(matches!(
            explicit.get_array().unwrap_err(),
            NodeError::TypeMismatch { .. }
        ));

        let implicit = hierarchy.node("/arthur").unwrap();
        assert_eq!(implicit.kind(), NodeKind::ImplicitGroup);
        assert!(implicit.get_group().unwrap().is_implicit());

        assert!(matches!(
            hierarchy.node("/zaphod").unwrap_err(),
            NodeError::NotFound(_)
        ));
        assert!(matches!(
            hierarchy.node("zaphod").unwrap_err(),
            NodeError::NodePathError(_)
        ));
    }
}

#[test]
fn hierarchy_node_kind_conflicts() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        hierarchy
            .create_group("/marvin", AttributesMap::new(), vec![])
            .unwrap();
        arthur_dent(&hierarchy);
        let builder = ArrayBuilder::new(vec![4], "<i2", vec![2], 0i64);

        let err = hierarchy.create_array("/marvin", &builder).unwrap_err();
        assert!(matches!(err, ArrayCreateError::NodeKindConflict { .. }));
        assert_eq!(
            err.to_string(),
            "cannot create an array at /marvin: /marvin is an explicit_group"
        );
        assert!(matches!(
            hierarchy.create_array("/arthur", &builder).unwrap_err(),
            ArrayCreateError::NodeKindConflict {
                existing: NodeKind::ImplicitGroup,
                ..
            }
        ));
        assert!(matches!(
            hierarchy.create_array("/arthur/dent/x", &builder).unwrap_err(),
            ArrayCreateError::NodeKindConflict {
                existing: NodeKind::Array,
                ..
            }
        ));
        assert!(matches!(
            hierarchy
                .create_group("/arthur/dent", AttributesMap::new(), vec![])
                .unwrap_err(),
            GroupCreateError::NodeKindConflict { .. }
        ));
        assert!(matches!(
            hierarchy
                .create_group("/arthur/dent/x", AttributesMap::new(), vec![])
                .unwrap_err(),
            GroupCreateError::NodeKindConflict { .. }
        ));
        // replacing an array is allowed
        hierarchy.create_array("/arthur/dent", &builder).unwrap();
        assert_eq!(hierarchy.open_array("/arthur/dent").unwrap().shape(), &[4]);
    }
}

#[test]
fn hierarchy_array_create_errors() {
    let store = Arc::new(MemoryStore::new());
    let hierarchy = create_hierarchy(store.clone(), ZarrVersions::V3, Arc::new(ArrayRegistry::new()))
        .unwrap();

    let mut builder = ArrayBuilder::new(vec![4, 4], "<c16", vec![2, 2], 0.0);
    assert!(matches!(
        hierarchy.create_array("/a", &builder).unwrap_err(),
        ArrayCreateError::UnknownDataType(_)
    ));
    builder
        .data_type("<f8")
        .compressor("zstd", Configuration::default());
    let err = hierarchy.create_array("/a", &builder).unwrap_err();
    assert!(matches!(err, ArrayCreateError::UnknownCompressor { .. }));
    assert_eq!(
        err.to_string(),
        "unknown compressor zstd for data type <f8"
    );
    builder
        .compressor("binary", Configuration::default())
        .chunk_shape(vec![2, 8]);
    assert!(matches!(
        hierarchy.create_array("/a", &builder).unwrap_err(),
        ArrayCreateError::InvalidChunkShape { .. }
    ));
    builder.chunk_shape(vec![2, 2]).fill_value(true);
    assert!(matches!(
        hierarchy.create_array("/a", &builder).unwrap_err(),
        ArrayCreateError::InvalidFillValueMetadata { .. }
    ));
    // nothing is written for a failed creation
    assert!(!store
        .exists(&StoreKey::new("meta/root/a.array.json").unwrap())
        .unwrap());
    assert!(matches!(
        hierarchy.open_array("/a").unwrap_err(),
        ArrayCreateError::MissingMetadata(_)
    ));
}

#[test]
fn hierarchy_open_invalid_array_metadata() {
    let store = Arc::new(MemoryStore::new());
    let hierarchy = create_hierarchy(store.clone(), ZarrVersions::V3, registry()).unwrap();
    let document = json!({
        "shape": [4, 4],
        "chunk_grid": {"type": "regular", "chunk_shape": [0, 2], "separator": "/"},
        "attributes": {},
        "data_type": "<f8",
        "chunk_memory_layout": "C",
        "fill_value": 0.0,
        "extensions": []
    });
    store
        .set(
            &StoreKey::new("meta/root/zero.array.json").unwrap(),
            serde_json::to_vec(&document).unwrap().into(),
        )
        .unwrap();
    assert!(matches!(
        hierarchy.open_array("/zero").unwrap_err(),
        ArrayCreateError::InvalidChunkShape { .. }
    ));

    let store = Arc::new(MemoryStore::new());
    let hierarchy = create_hierarchy(store.clone(), ZarrVersions::V2, registry()).unwrap();
    let document = json!({
        "zarr_format": 2,
        "shape": [4, 4],
        "chunks": [2],
        "dtype": "<f8",
        "compressor": null,
        "fill_value": 0.0,
        "order": "C",
        "filters": null,
        "dimension_separator": "."
    });
    store
        .set(
            &StoreKey::new("rank/.zarray").unwrap(),
            serde_json::to_vec(&document).unwrap().into(),
        )
        .unwrap();
    assert!(matches!(
        hierarchy.open_array("/rank").unwrap_err(),
        ArrayCreateError::InvalidChunkGridDimensionality(1, 2)
    ));
}

#[test]
fn hierarchy_rejects_relative_segments() {
    let path = tempfile::TempDir::new().unwrap();
    let root = path.path().join("store");
    let store: ReadableWritableListableStorage =
        Arc::new(zarrtree_filesystem::FilesystemStore::new(&root).unwrap());
    let hierarchy = create_hierarchy(store, ZarrVersions::V2, registry()).unwrap();
    for node in ["/..", "/../escaped", "/a/../../escaped", "/a/./b"] {
        assert!(matches!(
            hierarchy
                .create_group(node, AttributesMap::new(), vec![])
                .unwrap_err(),
            GroupCreateError::NodePathError(_)
        ));
        let builder = ArrayBuilder::new(vec![4], "<f8", vec![2], 0.0);
        assert!(matches!(
            hierarchy.create_array(node, &builder).unwrap_err(),
            ArrayCreateError::NodePathError(_)
        ));
    }
    assert!(!path.path().join("escaped").exists());
    assert!(!path.path().join(".zgroup").exists());
}

#[test]
fn hierarchy_implicit_group_vanishes() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        arthur_dent(&hierarchy);
        assert_eq!(
            hierarchy.node("/arthur").unwrap().kind(),
            NodeKind::ImplicitGroup
        );
        hierarchy.erase_node("/arthur/dent").unwrap();
        assert!(matches!(
            hierarchy.node("/arthur").unwrap_err(),
            NodeError::NotFound(_)
        ));
        assert!(matches!(
            hierarchy.open_group("/arthur").unwrap_err(),
            GroupCreateError::MissingMetadata(_)
        ));
    }
}

#[test]
fn hierarchy_version_inference() {
    let store = Arc::new(MemoryStore::new());
    assert_eq!(
        get_hierarchy(store.clone(), registry()).unwrap().version(),
        ZarrVersions::V2
    );

    store
        .set(
            &StoreKey::new("zarr.json").unwrap(),
            br#"{"zarr_format": 3}"#.to_vec().into(),
        )
        .unwrap();
    assert_eq!(
        get_hierarchy(store.clone(), registry()).unwrap().version(),
        ZarrVersions::V3
    );

    store
        .set(
            &StoreKey::new("zarr.json").unwrap(),
            br#"{"zarr_format": "https://purl.org/zarr/spec/protocol/core/4.0"}"#
                .to_vec()
                .into(),
        )
        .unwrap();
    let err = get_hierarchy(store.clone(), registry()).unwrap_err();
    assert!(matches!(err, HierarchyCreateError::UnsupportedVersion(_)));

    store
        .set(&StoreKey::new("zarr.json").unwrap(), b"{".to_vec().into())
        .unwrap();
    assert!(matches!(
        get_hierarchy(store, registry()).unwrap_err(),
        HierarchyCreateError::StorageError(_)
    ));
}

#[test]
fn hierarchy_group_attributes() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        hierarchy
            .create_group("/", attributes(json!({"hitchhiker": true})), vec![])
            .unwrap();
        let root = hierarchy.open_group("/").unwrap();
        assert_eq!(root.kind(), NodeKind::ExplicitGroup);
        assert_eq!(root.attributes()["hitchhiker"], true);
        assert_eq!(root.name(), "");
    }
}

#[test]
fn hierarchy_chunk_memory_layout() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        let mut builder = ArrayBuilder::new(vec![2, 3], ">u2", vec![2, 3], 0i64);
        builder.chunk_memory_layout(ChunkMemoryLayout::F);
        let array = hierarchy.create_array("/f", &builder).unwrap();
        array.store_chunk::<u16>(&[0, 0], &[1, 2, 3, 4, 5, 6]).unwrap();
        drop(array);

        let array = hierarchy.open_array("/f").unwrap();
        assert_eq!(array.metadata().chunk_memory_layout, ChunkMemoryLayout::F);
        assert_eq!(array.retrieve_element::<u16>(&[1, 0]).unwrap(), 2);
        assert_eq!(array.retrieve_element::<u16>(&[0, 1]).unwrap(), 3);
        assert_eq!(
            array.retrieve_chunk::<u16>(&[0, 0]).unwrap(),
            vec![1, 2, 3, 4, 5, 6]
        );
    }
}

#[cfg(feature = "gzip")]
#[test]
fn hierarchy_gzip() {
    for version in VERSIONS {
        let store = Arc::new(MemoryStore::new());
        let hierarchy = create_hierarchy(store, version, registry()).unwrap();
        let mut builder = ArrayBuilder::new(vec![8, 8], "<i8", vec![4, 4], -1i64);
        builder.compressor(
            "gzip",
            Configuration::from_serializable(&json!({"level": 5})),
        );
        let array = hierarchy.create_array("/zipped", &builder).unwrap();
        array.store_chunk::<i64>(&[1, 1], &[7; 16]).unwrap();
        drop(array);

        let array = hierarchy.open_array_opt("/zipped", 2).unwrap();
        assert_eq!(array.compressor(), "gzip");
        assert_eq!(array.chunk_pool_size(), 2);
        assert_eq!(array.metadata().compressor_configuration["level"], 5);
        assert_eq!(array.retrieve_element::<i64>(&[5, 5]).unwrap(), 7);
        assert_eq!(array.retrieve_element::<i64>(&[0, 0]).unwrap(), -1);
    }
}

#[test]
fn hierarchy_filesystem() {
    for version in VERSIONS {
        let path = tempfile::TempDir::new().unwrap();
        let store: ReadableWritableListableStorage =
            Arc::new(zarrtree_filesystem::FilesystemStore::new(path.path()).unwrap());
        let hierarchy = create_hierarchy(store.clone(), version, registry()).unwrap();
        hierarchy
            .create_group("/marvin", AttributesMap::new(), vec![])
            .unwrap();
        arthur_dent(&hierarchy);
        let marvin_dir = match version {
            ZarrVersions::V2 => path.path().join("marvin"),
            ZarrVersions::V3 => path.path().join("meta").join("root").join("marvin"),
        };
        std::fs::create_dir_all(&marvin_dir).unwrap();
        std::fs::write(marvin_dir.join("notes.txt"), b"brain").unwrap();

        let hierarchy = get_hierarchy(store, registry()).unwrap();
        assert_eq!(hierarchy.version(), version);
        assert_eq!(
            hierarchy
                .open_array("/arthur/dent")
                .unwrap()
                .retrieve_element::<f64>(&[0, 0])
                .unwrap(),
            42.0
        );
        assert!(hierarchy.get_children("/marvin").unwrap().is_empty());
        let nodes = hierarchy.get_nodes("/").unwrap();
        assert_eq!(
            nodes.keys().map(NodePath::as_str).collect::<Vec<_>>(),
            ["/", "/arthur", "/arthur/dent", "/marvin"]
        );
    }
}
