//! Entity description consumed from the schema layer

pub mod core_trait;
pub mod selection;

pub use core_trait::{Entity, Field, Record};
pub use selection::{Selected, Selection};
