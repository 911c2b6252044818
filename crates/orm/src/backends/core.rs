//! Core driver boundary
//!
//! The ORM never talks to a database directly. It hands a SQL string and an
//! ordered list of positional parameters to a [`QueryExecutor`] and gets back
//! positional rows. Anything that implements the trait can sit behind it: the
//! sqlx-backed [`PostgresExecutor`](super::PostgresExecutor), or an in-memory
//! fake in tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::error::{ModelError, OrmResult};

/// Executes compiled statements.
///
/// Executors are passed explicitly into every fetch/insert call; the ORM keeps
/// no process-wide connection.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a query and return every row, columns in SELECT order
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>>;

    /// Run a statement and return the affected row count
    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<u64>;
}

/// Database value enumeration for positional parameter binding and row data
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Uuid(uuid::Uuid),
    DateTime(chrono::DateTime<chrono::Utc>),
    /// `timestamp` without time zone
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Decimal(Decimal),
    Bytes(Vec<u8>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Returns true for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Name of the variant, for decode error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int32(_) => "int4",
            DatabaseValue::Int64(_) => "int8",
            DatabaseValue::Float64(_) => "float8",
            DatabaseValue::String(_) => "text",
            DatabaseValue::Uuid(_) => "uuid",
            DatabaseValue::DateTime(_) => "timestamptz",
            DatabaseValue::Timestamp(_) => "timestamp",
            DatabaseValue::Date(_) => "date",
            DatabaseValue::Time(_) => "time",
            DatabaseValue::Decimal(_) => "numeric",
            DatabaseValue::Bytes(_) => "bytea",
            DatabaseValue::Json(_) => "json",
        }
    }

    /// Convert to a JSON value (used to feed validators)
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::from(*i),
            DatabaseValue::Int64(i) => JsonValue::from(*i),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Timestamp(ts) => JsonValue::String(ts.to_string()),
            DatabaseValue::Date(d) => JsonValue::String(d.to_string()),
            DatabaseValue::Time(t) => JsonValue::String(t.to_string()),
            // Numeric rules see decimals as numbers when they fit
            DatabaseValue::Decimal(d) => d
                .to_string()
                .parse::<serde_json::Number>()
                .map(JsonValue::Number)
                .unwrap_or_else(|_| JsonValue::String(d.to_string())),
            DatabaseValue::Bytes(b) => b.iter().map(|byte| JsonValue::from(*byte)).collect(),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

    /// Hashable form of the value for joining child rows back onto parents.
    ///
    /// Integer widths are unified so an `int4` primary key matches an `int8`
    /// foreign key. Returns `None` for NULL and for types that are not usable
    /// as join keys.
    pub fn as_key(&self) -> Option<RowKey> {
        match self {
            DatabaseValue::Int32(i) => Some(RowKey::Int(i64::from(*i))),
            DatabaseValue::Int64(i) => Some(RowKey::Int(*i)),
            DatabaseValue::String(s) => Some(RowKey::Text(s.clone())),
            DatabaseValue::Uuid(u) => Some(RowKey::Uuid(*u)),
            DatabaseValue::Bool(b) => Some(RowKey::Bool(*b)),
            _ => None,
        }
    }
}

/// Join key extracted from a [`DatabaseValue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(uuid::Uuid),
}

impl From<RowKey> for DatabaseValue {
    fn from(key: RowKey) -> Self {
        match key {
            RowKey::Bool(b) => DatabaseValue::Bool(b),
            RowKey::Int(i) => DatabaseValue::Int64(i),
            RowKey::Text(s) => DatabaseValue::String(s),
            RowKey::Uuid(u) => DatabaseValue::Uuid(u),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<NaiveDateTime> for DatabaseValue {
    fn from(value: NaiveDateTime) -> Self {
        DatabaseValue::Timestamp(value)
    }
}

impl From<NaiveDate> for DatabaseValue {
    fn from(value: NaiveDate) -> Self {
        DatabaseValue::Date(value)
    }
}

impl From<NaiveTime> for DatabaseValue {
    fn from(value: NaiveTime) -> Self {
        DatabaseValue::Time(value)
    }
}

impl From<Decimal> for DatabaseValue {
    fn from(value: Decimal) -> Self {
        DatabaseValue::Decimal(value)
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DatabaseValue::Null, Into::into)
    }
}

/// One result row, addressed by column position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatabaseRow {
    values: Vec<DatabaseValue>,
}

impl DatabaseRow {
    /// Row from column values in SELECT order
    pub fn new(values: Vec<DatabaseValue>) -> Self {
        Self { values }
    }

    /// Column at `index`; a decode error if the row is shorter
    pub fn get_by_index(&self, index: usize) -> OrmResult<&DatabaseValue> {
        self.values.get(index).ok_or_else(|| {
            ModelError::Decode(format!(
                "column index {} out of range for row with {} columns",
                index,
                self.values.len()
            ))
        })
    }

    /// Number of columns in the row
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// All column values in SELECT order
    pub fn values(&self) -> &[DatabaseValue] {
        &self.values
    }

    /// Remove and return the last column
    pub fn pop(&mut self) -> Option<DatabaseValue> {
        self.values.pop()
    }
}

impl From<Vec<DatabaseValue>> for DatabaseRow {
    fn from(values: Vec<DatabaseValue>) -> Self {
        Self::new(values)
    }
}

/// Typed extraction of a non-NULL column value
pub trait FromDatabaseValue: Sized {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self>;
}

fn mismatch<T>(expected: &str, value: &DatabaseValue) -> OrmResult<T> {
    Err(ModelError::Decode(format!(
        "expected {}, found {}",
        expected,
        value.type_name()
    )))
}

impl FromDatabaseValue for bool {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Bool(b) => Ok(*b),
            other => mismatch("bool", other),
        }
    }
}

impl FromDatabaseValue for i32 {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Int32(i) => Ok(*i),
            DatabaseValue::Int64(i) => i32::try_from(*i)
                .map_err(|_| ModelError::Decode(format!("int8 value {} does not fit in int4", i))),
            other => mismatch("int4", other),
        }
    }
}

impl FromDatabaseValue for i64 {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Int32(i) => Ok(i64::from(*i)),
            DatabaseValue::Int64(i) => Ok(*i),
            other => mismatch("int8", other),
        }
    }
}

impl FromDatabaseValue for f64 {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Float64(f) => Ok(*f),
            DatabaseValue::Int32(i) => Ok(f64::from(*i)),
            other => mismatch("float8", other),
        }
    }
}

impl FromDatabaseValue for String {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::String(s) => Ok(s.clone()),
            other => mismatch("text", other),
        }
    }
}

impl FromDatabaseValue for uuid::Uuid {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Uuid(u) => Ok(*u),
            DatabaseValue::String(s) => uuid::Uuid::parse_str(s)
                .map_err(|e| ModelError::Decode(format!("invalid uuid '{}': {}", s, e))),
            other => mismatch("uuid", other),
        }
    }
}

impl FromDatabaseValue for chrono::DateTime<chrono::Utc> {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::DateTime(dt) => Ok(*dt),
            other => mismatch("timestamptz", other),
        }
    }
}

impl FromDatabaseValue for NaiveDateTime {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Timestamp(ts) => Ok(*ts),
            DatabaseValue::DateTime(dt) => Ok(dt.naive_utc()),
            other => mismatch("timestamp", other),
        }
    }
}

impl FromDatabaseValue for NaiveDate {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Date(d) => Ok(*d),
            other => mismatch("date", other),
        }
    }
}

impl FromDatabaseValue for NaiveTime {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Time(t) => Ok(*t),
            other => mismatch("time", other),
        }
    }
}

impl FromDatabaseValue for Decimal {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Decimal(d) => Ok(*d),
            DatabaseValue::Int32(i) => Ok(Decimal::from(*i)),
            DatabaseValue::Int64(i) => Ok(Decimal::from(*i)),
            other => mismatch("numeric", other),
        }
    }
}

impl FromDatabaseValue for Vec<u8> {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Bytes(b) => Ok(b.clone()),
            other => mismatch("bytea", other),
        }
    }
}

impl FromDatabaseValue for JsonValue {
    fn from_database_value(value: &DatabaseValue) -> OrmResult<Self> {
        match value {
            DatabaseValue::Json(j) => Ok(j.clone()),
            other => Ok(other.to_json()),
        }
    }
}
