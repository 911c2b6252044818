//! Relationship loading

pub mod batch_loader;

pub use batch_loader::{BatchConfig, BatchLoader, GroupedRows};
