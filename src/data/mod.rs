//! Prop feed loading, market registry and pool snapshots

pub mod props_loader;
pub mod registry;
pub mod snapshot;
pub mod synthetic;

// Re-export commonly used types
pub use props_loader::{load_props, parse_props, save_props, PropFeed, PropRecord};
pub use registry::{PropRegistry, PropSpec};
pub use snapshot::{PropSnapshot, SnapshotHandle};
pub use synthetic::SyntheticPropGenerator;
