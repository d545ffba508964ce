//! Inspect Zarr hierarchies stored on a filesystem.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use zarrtree::{
    array::ArrayRegistry,
    filesystem::FilesystemStore,
    hierarchy::{get_hierarchy, Hierarchy},
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "zarrtree")]
#[command(about = "Inspect a Zarr V2 or V3 hierarchy on a filesystem")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the hierarchy as an indented tree
    Tree {
        /// Path to the hierarchy root directory
        store: String,
        /// Node path to start from
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Print one `path kind` line per node
    Nodes {
        /// Path to the hierarchy root directory
        store: String,
        /// Node path to start from
        #[arg(long, default_value = "/")]
        path: String,
    },
}

type Result<T> = std::result::Result<T, anyhow::Error>;

fn open(store: &str) -> Result<Hierarchy> {
    let store = Arc::new(FilesystemStore::new(store)?);
    let mut registry = ArrayRegistry::new();
    registry.register_compressor::<zarrtree::array::codec::GzipCodec>()?;
    let hierarchy = get_hierarchy(store, Arc::new(registry))?;
    log::info!("opened {} hierarchy", hierarchy.version());
    Ok(hierarchy)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Tree { store, path } => {
            print!("{}", open(&store)?.tree_of(&path)?);
        }
        Command::Nodes { store, path } => {
            for (path, kind) in open(&store)?.get_nodes(&path)? {
                println!("{path} {kind}");
            }
        }
    }

    Ok(())
}
