//! Query Builder - query state and select modes

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use super::types::*;
use crate::backends::DatabaseRow;
use crate::error::ModelResult;
use crate::model::{Entity, Record, Selection};

mod sealed {
    pub trait Sealed {}
}

/// Query selecting every column, decoding into `E`
#[derive(Debug, Clone, Copy)]
pub struct Full;

/// Query selecting a subset of columns, decoding into `E::Partial`
#[derive(Debug, Clone, Copy)]
pub struct Partial;

impl sealed::Sealed for Full {}
impl sealed::Sealed for Partial {}

/// Type-level select mode of a [`Query`]
pub trait SelectMode: sealed::Sealed + Send + Sync + 'static {
    type Output<E: Entity>: Record;

    const PARTIAL: bool;

    fn decode<E: Entity>(
        row: &DatabaseRow,
        selection: &Selection<E::Field>,
    ) -> ModelResult<Self::Output<E>>;
}

impl SelectMode for Full {
    type Output<E: Entity> = E;

    const PARTIAL: bool = false;

    fn decode<E: Entity>(row: &DatabaseRow, _selection: &Selection<E::Field>) -> ModelResult<E> {
        E::from_row(row)
    }
}

impl SelectMode for Partial {
    type Output<E: Entity> = E::Partial;

    const PARTIAL: bool = true;

    fn decode<E: Entity>(
        row: &DatabaseRow,
        selection: &Selection<E::Field>,
    ) -> ModelResult<E::Partial> {
        E::partial_from_row(row, selection)
    }
}

/// Immutable query state for entity `E`.
///
/// Every mutator consumes the state and returns the next one; clone a state to
/// branch from it. The state is compiled with
/// [`to_sql_with_params`](Query::to_sql_with_params) or run with
/// [`fetch`](Query::fetch).
pub struct Query<E: Entity, S: SelectMode = Full> {
    pub(crate) selection: Selection<E::Field>,
    pub(crate) predicates: Vec<Predicate<E::Field>>,
    pub(crate) order_by: Vec<OrderSpec<E::Field>>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) relations: BTreeSet<&'static str>,
    _marker: PhantomData<fn() -> (E, S)>,
}

impl<E: Entity, S: SelectMode> Clone for Query<E, S> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            predicates: self.predicates.clone(),
            order_by: self.order_by.clone(),
            limit_count: self.limit_count,
            relations: self.relations.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: Entity, S: SelectMode> fmt::Debug for Query<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &E::table_name())
            .field("partial", &S::PARTIAL)
            .field("selection", &self.selection)
            .field("predicates", &self.predicates)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit_count)
            .field("relations", &self.relations)
            .finish()
    }
}

impl<E: Entity> Default for Query<E, Full> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Query<E, Full> {
    /// Empty full query: every column, no filter, no order, no limit
    pub fn new() -> Self {
        Self::empty()
    }
}

impl<E: Entity> Query<E, Partial> {
    /// Empty partial query with nothing selected yet
    pub fn partial() -> Self {
        Self::empty()
    }
}

impl<E: Entity, S: SelectMode> Query<E, S> {
    fn empty() -> Self {
        Self {
            selection: Selection::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit_count: None,
            relations: BTreeSet::new(),
            _marker: PhantomData,
        }
    }

    /// Add `field` to the projection, turning the query into a partial one.
    ///
    /// On a full query this starts a fresh selection holding only `field`.
    pub fn select(self, field: E::Field) -> Query<E, Partial> {
        self.select_fields([field])
    }

    /// Add several fields to the projection; see [`select`](Query::select)
    pub fn select_fields(self, fields: impl IntoIterator<Item = E::Field>) -> Query<E, Partial> {
        let mut selection = if S::PARTIAL {
            self.selection
        } else {
            Selection::new()
        };
        for field in fields {
            selection.insert(field);
        }

        Query {
            selection,
            predicates: self.predicates,
            order_by: self.order_by,
            limit_count: self.limit_count,
            relations: self.relations,
            _marker: PhantomData,
        }
    }

    /// Cap the number of rows; the latest call wins
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Fields selected so far; empty on a full query
    pub fn selection(&self) -> &Selection<E::Field> {
        &self.selection
    }

    /// Active predicates in render order
    pub fn predicates(&self) -> &[Predicate<E::Field>] {
        &self.predicates
    }

    /// Active predicate for `field`, if any
    pub fn predicate_for(&self, field: E::Field) -> Option<&Predicate<E::Field>> {
        self.predicates.iter().find(|p| p.field() == field)
    }

    /// ORDER BY entries in render order
    pub fn order_specs(&self) -> &[OrderSpec<E::Field>] {
        &self.order_by
    }

    /// Row cap, if one was set
    pub fn limit_value(&self) -> Option<u64> {
        self.limit_count
    }
}
