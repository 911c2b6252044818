//! Query execution against a [`QueryExecutor`]

use std::time::Instant;

use super::builder::{Query, SelectMode};
use crate::backends::{DatabaseRow, DatabaseValue, QueryExecutor};
use crate::error::{ModelError, ModelResult};
use crate::loading::BatchLoader;
use crate::model::Entity;
use crate::relationships::Loaded;

/// Run a compiled statement and return its rows.
///
/// Driver failures are re-labelled with `label` so the caller can tell which
/// operation failed; connection failures pass through unchanged.
pub async fn fetch_rows<X>(
    executor: &X,
    label: &str,
    sql: &str,
    params: &[DatabaseValue],
) -> ModelResult<Vec<DatabaseRow>>
where
    X: QueryExecutor + ?Sized,
{
    tracing::debug!("[{}] {} ({} params)", label, sql, params.len());
    let started = Instant::now();

    let rows = executor
        .fetch_all(sql, params)
        .await
        .map_err(|err| with_label(label, err))?;

    tracing::debug!(
        "[{}] returned {} row(s) in {:?}",
        label,
        rows.len(),
        started.elapsed()
    );
    Ok(rows)
}

fn with_label(label: &str, err: ModelError) -> ModelError {
    match err {
        ModelError::Query { message, .. } => ModelError::query(label, message),
        ModelError::Decode(message) => ModelError::query(label, message),
        other => other,
    }
}

impl<E: Entity, S: SelectMode> Query<E, S> {
    /// Execute the query, decode every row, and load requested relationships
    pub async fn fetch<X>(&self, executor: &X) -> ModelResult<Vec<Loaded<S::Output<E>>>>
    where
        X: QueryExecutor + ?Sized,
    {
        self.fetch_with(executor, &BatchLoader::new()).await
    }

    /// Like [`fetch`](Query::fetch), with a caller-configured loader
    pub async fn fetch_with<X>(
        &self,
        executor: &X,
        loader: &BatchLoader,
    ) -> ModelResult<Vec<Loaded<S::Output<E>>>>
    where
        X: QueryExecutor + ?Sized,
    {
        // Unknown relationship names fail before any SQL is sent
        let relationships = self.requested_relationships()?;

        let (sql, params) = self.to_sql_with_params();
        let label = format!("{}.select", E::table_name());
        let rows = fetch_rows(executor, &label, &sql, &params).await?;

        let records = rows
            .iter()
            .map(|row| S::decode::<E>(row, &self.selection))
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(loader.load(executor, records, &relationships).await)
    }

    /// Execute the query with `LIMIT 1` and return the first result, if any
    pub async fn first<X>(&self, executor: &X) -> ModelResult<Option<Loaded<S::Output<E>>>>
    where
        X: QueryExecutor + ?Sized,
    {
        let results = self.clone().limit(1).fetch(executor).await?;
        Ok(results.into_iter().next())
    }
}
