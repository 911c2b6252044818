//! Relationship descriptors and per-record relationship state

pub mod containers;
pub mod metadata;

pub use containers::{Loaded, RelationData, RelationStatus};
pub use metadata::{PivotTable, RelationshipDescriptor, RelationshipKind};
