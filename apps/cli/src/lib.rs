//! packdrill application crate: all the I/O around `packdrill-core`.
//!
//! - `package`: zip container access, entry location, media extraction
//! - `collection`: reading the embedded collection database
//! - `db`: the local card store
//! - `settings`: persisted field mappings and inspection snapshots
//! - `import`: the import, inspect and rebuild pipelines
//! - `commands`: CLI entry points over the above

pub mod collection;
pub mod commands;
pub mod db;
pub mod import;
pub mod package;
pub mod paths;
pub mod settings;
