pub mod types;

pub use types::SnapshotNode;
