//! File collaborators of the engine.
//!
//! The engine itself never touches the filesystem. This module loads source
//! tables ([`FileTableLoader`]), maps source roles to files
//! ([`SourceManifest`]) and writes the output table ([`FileTableWriter`]).

mod loader;
mod sources;
mod writer;

pub use loader::{FileTableLoader, TableLoader};
pub use sources::{SourceManifest, inspect_table, load_sources};
pub use writer::{FileTableWriter, TableWriter};
