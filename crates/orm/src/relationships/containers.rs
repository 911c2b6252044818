//! Per-record relationship state

use std::collections::BTreeMap;
use std::ops::Deref;

use crate::backends::DatabaseRow;
use crate::error::{ModelError, ModelResult};
use crate::model::Entity;

/// Outcome of one relationship for one parent record
#[derive(Debug, Clone, Default)]
pub enum RelationStatus<T = RelationData> {
    #[default]
    NotRequested,
    Loaded(T),
    /// The relationship query failed; the base record is still valid
    Failed(ModelError),
}

impl<T> RelationStatus<T> {
    /// Returns true if the relationship loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, RelationStatus::Loaded(_))
    }

    /// Returns true if the relationship query failed
    pub fn is_failed(&self) -> bool {
        matches!(self, RelationStatus::Failed(_))
    }

    /// Loaded value, if any
    pub fn loaded(&self) -> Option<&T> {
        match self {
            RelationStatus::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Load error, if the relationship failed
    pub fn error(&self) -> Option<&ModelError> {
        match self {
            RelationStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Turn a loaded value into `Ok`, a failure into `Err`, and
    /// `NotRequested` into `Ok(None)`
    pub fn into_result(self) -> ModelResult<Option<T>> {
        match self {
            RelationStatus::NotRequested => Ok(None),
            RelationStatus::Loaded(data) => Ok(Some(data)),
            RelationStatus::Failed(err) => Err(err),
        }
    }
}

/// Raw related rows, columns in the target's declared order
#[derive(Debug, Clone, PartialEq)]
pub enum RelationData {
    Many(Vec<DatabaseRow>),
    One(Option<DatabaseRow>),
}

impl RelationData {
    /// Related rows; zero or one for single-valued relationships
    pub fn rows(&self) -> &[DatabaseRow] {
        match self {
            RelationData::Many(rows) => rows,
            RelationData::One(Some(row)) => std::slice::from_ref(row),
            RelationData::One(None) => &[],
        }
    }

    /// Number of related rows
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

static NOT_REQUESTED: RelationStatus = RelationStatus::NotRequested;

/// A base record plus the status of every relationship requested for it
#[derive(Debug, Clone)]
pub struct Loaded<R> {
    record: R,
    relations: BTreeMap<&'static str, RelationStatus>,
}

impl<R> Loaded<R> {
    /// Wrap a record with no relationships requested
    pub fn new(record: R) -> Self {
        Self {
            record,
            relations: BTreeMap::new(),
        }
    }

    /// Base record
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Drop relationship state and keep the base record
    pub fn into_record(self) -> R {
        self.record
    }

    pub(crate) fn set_relation(&mut self, name: &'static str, status: RelationStatus) {
        self.relations.insert(name, status);
    }

    /// Raw status of a relationship; `NotRequested` if it was never asked for
    pub fn relation(&self, name: &str) -> &RelationStatus {
        self.relations.get(name).unwrap_or(&NOT_REQUESTED)
    }

    /// Names of every relationship that was requested
    pub fn requested(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.relations.keys().copied()
    }

    /// Decode a collection relationship into target records
    pub fn many<T: Entity>(&self, name: &str) -> RelationStatus<Vec<T>> {
        self.decode(name, |data| data.rows().iter().map(T::from_row).collect())
    }

    /// Decode a single-valued relationship into an optional target record
    pub fn one<T: Entity>(&self, name: &str) -> RelationStatus<Option<T>> {
        self.decode(name, |data| data.rows().first().map(T::from_row).transpose())
    }

    fn decode<U>(
        &self,
        name: &str,
        decode: impl FnOnce(&RelationData) -> ModelResult<U>,
    ) -> RelationStatus<U> {
        match self.relation(name) {
            RelationStatus::NotRequested => RelationStatus::NotRequested,
            RelationStatus::Failed(err) => RelationStatus::Failed(err.clone()),
            RelationStatus::Loaded(data) => match decode(data) {
                Ok(value) => RelationStatus::Loaded(value),
                Err(err) => RelationStatus::Failed(err),
            },
        }
    }
}

impl<R> Deref for Loaded<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}
