//! PostgreSQL executor
//!
//! Binds [`DatabaseValue`] parameters positionally through sqlx and converts
//! `PgRow` columns back into positional [`DatabaseRow`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Column, Pool, Postgres, Row, TypeInfo, ValueRef};

use super::core::*;
use crate::error::{ModelError, OrmResult};

/// Settings forwarded to the sqlx pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
        }
    }
}

/// [`QueryExecutor`] backed by a sqlx PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: Arc<Pool<Postgres>>,
}

impl PostgresExecutor {
    /// Wrap an existing pool
    pub fn new(pool: Arc<Pool<Postgres>>) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`
    pub async fn connect(database_url: &str, config: &PoolConfig) -> OrmResult<Self> {
        if !database_url.starts_with("postgresql://") && !database_url.starts_with("postgres://") {
            return Err(ModelError::Connection(
                "Invalid PostgreSQL URL scheme".to_string(),
            ));
        }

        let mut options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds));
        if let Some(idle) = config.idle_timeout_seconds {
            options = options.idle_timeout(Duration::from_secs(idle));
        }

        let pool = options.connect(database_url).await.map_err(|e| {
            ModelError::Connection(format!("Failed to create PostgreSQL pool: {}", e))
        })?;

        tracing::debug!(
            "PostgreSQL pool ready (max_connections={}, min_connections={})",
            config.max_connections,
            config.min_connections
        );
        Ok(Self::new(Arc::new(pool)))
    }

    /// Underlying sqlx pool
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let started = Instant::now();
        let rows = query.fetch_all(&*self.pool).await?;
        tracing::debug!("fetched {} rows in {:?}", rows.len(), started.elapsed());

        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn bind_database_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int32(i) => query.bind(*i),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Uuid(u) => query.bind(*u),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Timestamp(ts) => query.bind(*ts),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Decimal(d) => query.bind(*d),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn convert_row(row: &PgRow) -> OrmResult<DatabaseRow> {
    (0..row.len())
        .map(|index| column_value(row, index))
        .collect::<OrmResult<Vec<_>>>()
        .map(DatabaseRow::new)
}

/// How a PostgreSQL column type is read into a [`DatabaseValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    Numeric,
    Bytea,
    Json,
    /// Text types and anything else sqlx can read as a string
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOL" => ColumnKind::Bool,
        "INT2" => ColumnKind::Int2,
        "INT4" => ColumnKind::Int4,
        "INT8" => ColumnKind::Int8,
        "FLOAT4" => ColumnKind::Float4,
        "FLOAT8" => ColumnKind::Float8,
        "UUID" => ColumnKind::Uuid,
        "TIMESTAMPTZ" => ColumnKind::TimestampTz,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "NUMERIC" => ColumnKind::Numeric,
        "BYTEA" => ColumnKind::Bytea,
        "JSON" | "JSONB" => ColumnKind::Json,
        _ => ColumnKind::Text,
    }
}

fn column_value(row: &PgRow, index: usize) -> OrmResult<DatabaseValue> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let column = &row.columns()[index];
    let decode_err =
        |e: sqlx::Error| ModelError::Decode(format!("column '{}': {}", column.name(), e));

    let value = match column_kind(column.type_info().name()) {
        ColumnKind::Bool => DatabaseValue::Bool(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Int2 => {
            DatabaseValue::Int32(i32::from(row.try_get::<i16, _>(index).map_err(decode_err)?))
        }
        ColumnKind::Int4 => DatabaseValue::Int32(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Int8 => DatabaseValue::Int64(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Float4 => {
            DatabaseValue::Float64(f64::from(row.try_get::<f32, _>(index).map_err(decode_err)?))
        }
        ColumnKind::Float8 => DatabaseValue::Float64(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Uuid => DatabaseValue::Uuid(row.try_get(index).map_err(decode_err)?),
        ColumnKind::TimestampTz => DatabaseValue::DateTime(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Timestamp => DatabaseValue::Timestamp(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Date => DatabaseValue::Date(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Time => DatabaseValue::Time(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Numeric => DatabaseValue::Decimal(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Bytea => DatabaseValue::Bytes(row.try_get(index).map_err(decode_err)?),
        ColumnKind::Json => DatabaseValue::Json(row.try_get::<JsonValue, _>(index).map_err(decode_err)?),
        ColumnKind::Text => DatabaseValue::String(row.try_get(index).map_err(decode_err)?),
    };
    Ok(value)
}
