//! Positional row decoding
//!
//! Rows produced by the compiler always carry one column per declared field,
//! in declared order, whether or not the field was selected. The decoder
//! therefore consumes exactly one column per field; selection only decides
//! whether the column is read as data or discarded as a placeholder.

use crate::backends::{DatabaseRow, DatabaseValue, FromDatabaseValue};
use crate::error::{ModelError, ModelResult};
use crate::model::{Field, Selected, Selection};

pub struct RowDecoder<'r, F: Field> {
    row: &'r DatabaseRow,
    selection: Option<&'r Selection<F>>,
    cursor: usize,
}

impl<'r, F: Field> RowDecoder<'r, F> {
    /// Decoder for a row of a full query
    pub fn full(row: &'r DatabaseRow) -> ModelResult<Self> {
        Self::check_shape(row)?;
        Ok(Self {
            row,
            selection: None,
            cursor: 0,
        })
    }

    /// Decoder for a row of a partial query with `selection`
    pub fn partial(row: &'r DatabaseRow, selection: &'r Selection<F>) -> ModelResult<Self> {
        Self::check_shape(row)?;
        Ok(Self {
            row,
            selection: Some(selection),
            cursor: 0,
        })
    }

    fn check_shape(row: &DatabaseRow) -> ModelResult<()> {
        let expected = F::all().len();
        if row.column_count() != expected {
            return Err(ModelError::Decode(format!(
                "expected {} columns, row has {}",
                expected,
                row.column_count()
            )));
        }
        Ok(())
    }

    fn next_column(&mut self, field: F) -> ModelResult<&'r DatabaseValue> {
        match F::all().get(self.cursor) {
            Some(expected) if *expected == field => {}
            Some(expected) => {
                return Err(ModelError::Decode(format!(
                    "field {:?} decoded at position {}, which belongs to {:?}",
                    field, self.cursor, expected
                )))
            }
            None => {
                return Err(ModelError::Decode(format!(
                    "field {:?} decoded past the last column",
                    field
                )))
            }
        }

        let value = self.row.get_by_index(self.cursor)?;
        self.cursor += 1;
        Ok(value)
    }

    fn is_selected(&self, field: F) -> bool {
        self.selection.map_or(true, |selection| selection.contains(field))
    }

    /// Non-nullable column
    pub fn value<T: FromDatabaseValue>(&mut self, field: F) -> ModelResult<T> {
        match self.nullable(field)? {
            Some(value) => Ok(value),
            None => Err(ModelError::Decode(format!(
                "column '{}' is NULL",
                field.column()
            ))),
        }
    }

    /// Nullable column
    pub fn nullable<T: FromDatabaseValue>(&mut self, field: F) -> ModelResult<Option<T>> {
        let value = self.next_column(field)?;
        if value.is_null() {
            return Ok(None);
        }
        T::from_database_value(value).map(Some).map_err(|e| match e {
            ModelError::Decode(message) => {
                ModelError::Decode(format!("column '{}': {}", field.column(), message))
            }
            other => other,
        })
    }

    /// Column of a partial record
    pub fn selected<T: FromDatabaseValue>(&mut self, field: F) -> ModelResult<Selected<T>> {
        if !self.is_selected(field) {
            self.next_column(field)?;
            return Ok(Selected::NotFetched);
        }
        self.nullable(field).map(Selected::from)
    }

    /// Fails unless every declared field was decoded
    pub fn finish(self) -> ModelResult<()> {
        if self.cursor != F::all().len() {
            return Err(ModelError::Decode(format!(
                "decoded {} of {} columns",
                self.cursor,
                F::all().len()
            )));
        }
        Ok(())
    }
}
