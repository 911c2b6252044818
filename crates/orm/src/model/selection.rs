//! Field selection and the fetched/not-fetched tri-state

use std::collections::HashSet;

use super::core_trait::Field;

/// Decoded value of one column of a partial record.
///
/// `NotFetched` means the column was left out of the projection and says
/// nothing about the stored value; `Null` means the column was selected and
/// the database returned NULL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selected<T> {
    #[default]
    NotFetched,
    Null,
    Value(T),
}

impl<T> Selected<T> {
    /// Returns true unless the column was left out of the SELECT
    pub fn is_fetched(&self) -> bool {
        !matches!(self, Selected::NotFetched)
    }

    /// Borrow the value, if the column held one
    pub fn value(&self) -> Option<&T> {
        match self {
            Selected::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Take the value, if the column held one
    pub fn into_value(self) -> Option<T> {
        match self {
            Selected::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the inner value, keeping the state
    pub fn as_ref(&self) -> Selected<&T> {
        match self {
            Selected::NotFetched => Selected::NotFetched,
            Selected::Null => Selected::Null,
            Selected::Value(value) => Selected::Value(value),
        }
    }

    /// Map the inner value, keeping the state
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Selected<U> {
        match self {
            Selected::NotFetched => Selected::NotFetched,
            Selected::Null => Selected::Null,
            Selected::Value(value) => Selected::Value(f(value)),
        }
    }

    /// `Some(None)` for fetched NULL, `None` when not fetched
    pub fn fetched(self) -> Option<Option<T>> {
        match self {
            Selected::NotFetched => None,
            Selected::Null => Some(None),
            Selected::Value(value) => Some(Some(value)),
        }
    }
}

impl<T> From<Option<T>> for Selected<T> {
    /// A value known to have been fetched
    fn from(value: Option<T>) -> Self {
        value.map_or(Selected::Null, Selected::Value)
    }
}

/// Set of selected fields of a partial query; order is irrelevant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<F: Field> {
    fields: HashSet<F>,
}

impl<F: Field> Default for Selection<F> {
    fn default() -> Self {
        Self {
            fields: HashSet::new(),
        }
    }
}

impl<F: Field> Selection<F> {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field of the entity
    pub fn all() -> Self {
        F::all().iter().copied().collect()
    }

    /// Add a field; adding it again is a no-op
    pub fn insert(&mut self, field: F) {
        self.fields.insert(field);
    }

    /// Returns true if `field` is selected
    pub fn contains(&self, field: F) -> bool {
        self.fields.contains(&field)
    }

    /// Number of selected fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Selected fields in declared order
    pub fn fields(&self) -> Vec<F> {
        F::all()
            .iter()
            .copied()
            .filter(|field| self.fields.contains(field))
            .collect()
    }
}

impl<F: Field> FromIterator<F> for Selection<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
