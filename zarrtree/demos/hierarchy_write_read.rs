#![allow(missing_docs)]

use std::sync::Arc;

use zarrtree::{
    array::{ArrayBuilder, ArrayRegistry},
    hierarchy::{create_hierarchy, get_hierarchy},
    plugin::ZarrVersions,
    storage::ReadableWritableListableStorage,
};

fn hierarchy_write_read() -> Result<(), Box<dyn std::error::Error>> {
    // Create a store
    let path = tempfile::TempDir::new()?;
    let store: ReadableWritableListableStorage =
        Arc::new(zarrtree::filesystem::FilesystemStore::new(path.path())?);
    // let store: ReadableWritableListableStorage = Arc::new(zarrtree::storage::store::MemoryStore::new());

    // Configure the registry
    #[allow(unused_mut)]
    let mut registry = ArrayRegistry::new();
    #[cfg(feature = "gzip")]
    registry.register_compressor::<zarrtree::array::codec::GzipCodec>()?;
    let registry = Arc::new(registry);

    // Create the hierarchy
    let version = match std::env::args().nth(1).as_deref() {
        Some("--v2") => ZarrVersions::V2,
        _ => ZarrVersions::V3,
    };
    let hierarchy = create_hierarchy(store.clone(), version, registry.clone())?;

    // Create a group with attributes
    let mut attributes = serde_json::Map::new();
    attributes.insert("foo".into(), serde_json::Value::String("bar".into()));
    let group = hierarchy.create_group("/group", attributes, vec![])?;
    println!("The group attributes are: {:?}\n", group.attributes());

    // Create an array
    let mut builder = ArrayBuilder::new(
        vec![8, 8], // array shape
        "<f4",      // data type
        vec![4, 4], // chunk shape
        f64::NAN,   // fill value
    );
    #[cfg(feature = "gzip")]
    builder.compressor(
        "gzip",
        zarrtree::metadata::Configuration::from_serializable(&serde_json::json!({"level": 5})),
    );
    builder.chunk_pool_size(2);
    let array = hierarchy.create_array("/group/array", &builder)?;

    // Write some elements and a chunk
    array.store_element::<f32>(&[0, 0], 1.0)?;
    array.store_element::<f32>(&[7, 7], 2.0)?;
    array.store_chunk::<f32>(&[0, 1], &[3.0; 16])?;
    array.flush()?;
    drop(array);

    // Reopen the hierarchy and read back
    let hierarchy = get_hierarchy(store, registry)?;
    println!("{} hierarchy:\n{}", hierarchy.version(), hierarchy.tree()?);
    let array = hierarchy.open_array("/group/array")?;
    for indices in [[0, 0], [0, 4], [3, 3], [7, 7]] {
        println!(
            "array[{indices:?}] = {}",
            array.retrieve_element::<f32>(&indices)?
        );
    }
    println!("chunk [0, 1] is stored at {}", array.chunk_key(&[0, 1]));

    for (path, kind) in hierarchy.get_nodes("/")? {
        println!("{path} {kind}");
    }

    Ok(())
}

fn main() {
    if let Err(err) = hierarchy_write_read() {
        println!("{err:?}");
    }
}
