//! Batched relationship loading
//!
//! For each requested relationship the loader collects the distinct join keys
//! of all parent records and issues one `... WHERE <match column> IN (...)`
//! query, then hands each parent the rows that match its key. A relationship
//! whose query fails is recorded as failed on every parent; the other
//! relationships and the parents themselves are unaffected.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;

use crate::backends::{DatabaseRow, DatabaseValue, QueryExecutor, RowKey};
use crate::error::{ModelError, ModelResult};
use crate::model::{Record, Selected};
use crate::query::execution::fetch_rows;
use crate::query::sql_builder::SqlBuilder;
use crate::relationships::{
    Loaded, RelationData, RelationStatus, RelationshipDescriptor, RelationshipKind,
};

pub mod config;

pub use config::BatchConfig;

/// Related rows grouped by the parent key they belong to
pub type GroupedRows = HashMap<RowKey, Vec<DatabaseRow>>;

/// Batch loader for relationship loading without N+1 queries
#[derive(Debug, Clone, Default)]
pub struct BatchLoader {
    config: BatchConfig,
}

impl BatchLoader {
    /// Create a new batch loader with default configuration
    pub fn new() -> Self {
        Self::with_config(BatchConfig::default())
    }

    /// Create a new batch loader with custom configuration
    pub fn with_config(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Active loader configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Load `relationships` for every parent and attach the outcome to each.
    ///
    /// Never fails as a whole: a failed relationship becomes
    /// [`RelationStatus::Failed`] on every parent. Results do not depend on
    /// the order in which relationship queries complete.
    pub async fn load<R, X>(
        &self,
        executor: &X,
        parents: Vec<R>,
        relationships: &[&'static RelationshipDescriptor],
    ) -> Vec<Loaded<R>>
    where
        R: Record,
        X: QueryExecutor + ?Sized,
    {
        let mut loaded: Vec<Loaded<R>> = parents.into_iter().map(Loaded::new).collect();
        if loaded.is_empty() || relationships.is_empty() {
            return loaded;
        }

        tracing::debug!(
            "batch loading {} relationship(s) for {} parent(s)",
            relationships.len(),
            loaded.len()
        );

        let keys: Vec<Vec<RowKey>> = relationships
            .iter()
            .map(|rel| distinct_keys(loaded.iter().map(|l| l.record()), rel.parent_key()))
            .collect();

        let loads = relationships
            .iter()
            .zip(&keys)
            .map(|(rel, keys)| self.load_relationship(executor, rel, keys));

        let outcomes = if self.config.parallel_execution {
            join_all(loads).await
        } else {
            let mut outcomes = Vec::with_capacity(relationships.len());
            for load in loads {
                outcomes.push(load.await);
            }
            outcomes
        };

        for (rel, outcome) in relationships.iter().zip(outcomes) {
            match outcome {
                Ok(grouped) => {
                    for parent in loaded.iter_mut() {
                        let status = status_for(parent.record(), rel, &grouped);
                        parent.set_relation(rel.name, status);
                    }
                }
                Err(err) => {
                    tracing::warn!("relationship '{}' failed to load: {}", rel.name, err);
                    for parent in loaded.iter_mut() {
                        parent.set_relation(rel.name, RelationStatus::Failed(err.clone()));
                    }
                }
            }
        }

        loaded
    }

    /// Fetch the rows of one relationship for `keys`, grouped by key.
    ///
    /// Every key appears in the result, with an empty list when nothing
    /// matched. No query is issued for an empty key list.
    pub async fn load_relationship<X>(
        &self,
        executor: &X,
        relationship: &RelationshipDescriptor,
        keys: &[RowKey],
    ) -> ModelResult<GroupedRows>
    where
        X: QueryExecutor + ?Sized,
    {
        let mut grouped = GroupedRows::new();
        let label = format!("{}.{}", relationship.target_table, relationship.name);

        for chunk in keys.chunks(self.config.max_batch_size.max(1)) {
            let (sql, params) = relationship_query(relationship, chunk);
            for mut row in fetch_rows(executor, &label, &sql, &params).await? {
                // The match column is appended after the target columns
                let key = row.pop().and_then(|value| value.as_key());
                if let Some(key) = key {
                    grouped.entry(key).or_default().push(row);
                }
            }
        }

        for key in keys {
            grouped.entry(key.clone()).or_default();
        }
        Ok(grouped)
    }
}

/// Build the batch query of `relationship` for `keys`, ordered by parent key
/// and then by the target's first column
pub fn relationship_query(
    relationship: &RelationshipDescriptor,
    keys: &[RowKey],
) -> (String, Vec<DatabaseValue>) {
    let table = relationship.target_table;
    let match_column = relationship.match_column();
    let columns: Vec<String> = relationship
        .target_columns
        .iter()
        .map(|column| format!("{}.{}", table, column))
        .collect();

    let mut sql = format!("SELECT {}, {} FROM {}", columns.join(", "), match_column, table);
    if let (RelationshipKind::ManyToMany, Some(pivot)) = (relationship.kind, relationship.pivot) {
        sql.push_str(&format!(
            " INNER JOIN {} ON {}.{} = {}.{}",
            pivot.table, pivot.table, pivot.target_key, table, relationship.foreign_key
        ));
    }

    let mut builder = SqlBuilder::new();
    builder.add_in(&match_column, keys.iter().cloned().map(DatabaseValue::from).collect());
    let (where_clause, params) = builder.finalize();
    sql.push_str(&where_clause);

    // Fixed child order per parent; has-one keeps the first row
    sql.push_str(&format!(" ORDER BY {}", match_column));
    if let Some(first) = relationship.target_columns.first() {
        let tiebreak = format!("{}.{}", table, first);
        if tiebreak != match_column {
            sql.push_str(&format!(", {}", tiebreak));
        }
    }

    (sql, params)
}

/// Distinct usable keys of `column`, in first-seen order
fn distinct_keys<'a, R: Record + 'a>(
    records: impl Iterator<Item = &'a R>,
    column: &str,
) -> Vec<RowKey> {
    let mut seen = HashSet::new();
    records
        .filter_map(|record| record.column_value(column).into_value())
        .filter_map(|value| value.as_key())
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

fn status_for<R: Record>(
    parent: &R,
    relationship: &RelationshipDescriptor,
    grouped: &GroupedRows,
) -> RelationStatus {
    let column = relationship.parent_key();
    let rows = match parent.column_value(column) {
        Selected::NotFetched => {
            return RelationStatus::Failed(ModelError::relationship(
                relationship.name,
                format!("key column '{}' was not fetched", column),
            ))
        }
        Selected::Null => Vec::new(),
        Selected::Value(value) => match value.as_key() {
            Some(key) => grouped.get(&key).cloned().unwrap_or_default(),
            None => {
                return RelationStatus::Failed(ModelError::relationship(
                    relationship.name,
                    format!("key column '{}' holds a {} value", column, value.type_name()),
                ))
            }
        },
    };

    let data = if relationship.kind.is_collection() {
        RelationData::Many(rows)
    } else {
        RelationData::One(rows.into_iter().next())
    };
    RelationStatus::Loaded(data)
}
