//! Query Builder Types - predicates and ordering

use std::fmt;

use crate::backends::DatabaseValue;
use crate::model::Field;

/// A WHERE condition bound to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<F: Field> {
    /// `<column> = $n`
    Equal(F, DatabaseValue),
    /// `<column> IS NULL`
    IsNull(F),
}

impl<F: Field> Predicate<F> {
    /// Field the predicate constrains
    pub fn field(&self) -> F {
        match self {
            Predicate::Equal(field, _) | Predicate::IsNull(field) => *field,
        }
    }
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec<F: Field> {
    pub field: F,
    pub direction: OrderDirection,
}
