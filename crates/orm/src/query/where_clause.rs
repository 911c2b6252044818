//! Query Builder WHERE clause operations
//!
//! At most one predicate per field is active. Constraining a field again
//! replaces its predicate in place, so `where_eq(id, 1).where_eq(id, 2)`
//! filters on `id = 2` alone.

use super::builder::{Query, SelectMode};
use super::types::Predicate;
use crate::backends::DatabaseValue;
use crate::model::Entity;

impl<E: Entity, S: SelectMode> Query<E, S> {
    /// `<column> = value`; a NULL value becomes `<column> IS NULL`
    pub fn where_eq(self, field: E::Field, value: impl Into<DatabaseValue>) -> Self {
        let value = value.into();
        if value.is_null() {
            return self.where_null(field);
        }
        self.constrain(Predicate::Equal(field, value))
    }

    /// `<column> IS NULL`
    pub fn where_null(self, field: E::Field) -> Self {
        self.constrain(Predicate::IsNull(field))
    }

    fn constrain(mut self, predicate: Predicate<E::Field>) -> Self {
        let field = predicate.field();
        match self.predicates.iter_mut().find(|p| p.field() == field) {
            Some(existing) => *existing = predicate,
            None => self.predicates.push(predicate),
        }
        self
    }
}
