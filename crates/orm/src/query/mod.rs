//! Query Builder Module - immutable, type-checked query state and its compiler

pub mod builder;
pub mod decoder;
pub mod execution;
pub mod insert;
pub mod ordering;
pub mod sql_builder;
pub mod sql_generation;
pub mod types;
pub mod where_clause;
pub mod with;

pub use builder::{Full, Partial, Query, SelectMode};
pub use decoder::RowDecoder;
pub use execution::fetch_rows;
pub use insert::{InsertBuilder, Set, Unset};
pub use sql_builder::SqlBuilder;
pub use types::{OrderDirection, OrderSpec, Predicate};
