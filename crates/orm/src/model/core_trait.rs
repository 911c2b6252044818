//! Core entity traits
//!
//! These are what the schema code generator emits per table: a closed field
//! enumeration, the table name, the relationship descriptors, and row
//! decoding for full and partial records. The query compiler and the batch
//! loader are parameterized by them but never interpret the schema itself.

use std::fmt::Debug;
use std::hash::Hash;

use super::selection::{Selected, Selection};
use crate::backends::{DatabaseRow, DatabaseValue};
use crate::error::ModelResult;
use crate::relationships::RelationshipDescriptor;

/// Closed set of columns of one entity.
///
/// `all()` lists every field in declared order; that order fixes the column
/// positions of every SELECT the compiler produces for the entity.
pub trait Field: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    fn all() -> &'static [Self];

    /// Column name; must be distinct for every field
    fn column(self) -> &'static str;

    /// Position in declared order
    fn position(self) -> usize {
        Self::all()
            .iter()
            .position(|field| *field == self)
            .unwrap_or(usize::MAX)
    }
}

/// A decoded record that can report the value of one of its columns.
///
/// The batch loader uses this to read join keys off parent records. Partial
/// records answer `Selected::NotFetched` for columns left out of the SELECT.
pub trait Record: Send + Sync {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue>;
}

/// A table with typed fields
pub trait Entity: Record + Sized + 'static {
    type Field: Field;

    /// Record produced by partial (projected) queries
    type Partial: Record;

    fn table_name() -> &'static str;

    fn relationships() -> &'static [RelationshipDescriptor] {
        &[]
    }

    /// Fields an INSERT must provide
    fn required_fields() -> &'static [Self::Field] {
        &[]
    }

    /// Decode a row shaped by a full query
    fn from_row(row: &DatabaseRow) -> ModelResult<Self>;

    /// Decode a row shaped by a partial query with the given selection
    fn partial_from_row(
        row: &DatabaseRow,
        selection: &Selection<Self::Field>,
    ) -> ModelResult<Self::Partial>;

    fn relationship(name: &str) -> Option<&'static RelationshipDescriptor> {
        Self::relationships().iter().find(|rel| rel.name == name)
    }

    /// Every column in declared order
    fn columns() -> Vec<&'static str> {
        Self::Field::all().iter().map(|field| field.column()).collect()
    }
}
