//! INSERT path with accumulated validation
//!
//! [`InsertBuilder`] collects column values for one new row. Before any SQL
//! is sent, every attached rule is run and every missing required field is
//! reported; all failures come back together as one
//! [`ValidationErrors`](strata_validation::ValidationErrors) batch.
//!
//! Generated per-entity builders track required fields at the type level
//! with the [`Unset`] / [`Set`] markers and only expose `execute` once every
//! marker is `Set`, so a missing required field is a compile error there.
//! [`InsertBuilder`] itself stays dynamic and reports missing fields at
//! validation time.

use std::fmt;
use std::marker::PhantomData;

use strata_validation::{ValidationError, ValidationErrors, ValidationRule};

use super::execution::fetch_rows;
use crate::backends::{DatabaseValue, QueryExecutor};
use crate::error::{ModelError, ModelResult};
use crate::model::{Entity, Field};

/// Required field not provided yet
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

/// Required field provided
#[derive(Debug, Clone, Copy, Default)]
pub struct Set;

/// Builder for a single-row INSERT into `E`'s table
pub struct InsertBuilder<E: Entity> {
    values: Vec<(E::Field, DatabaseValue)>,
    rules: Vec<(E::Field, Box<dyn ValidationRule>)>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for InsertBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> fmt::Debug for InsertBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<(E::Field, &'static str)> = self
            .rules
            .iter()
            .map(|(field, rule)| (*field, rule.rule_name()))
            .collect();
        f.debug_struct("InsertBuilder")
            .field("table", &E::table_name())
            .field("values", &self.values)
            .field("rules", &rules)
            .finish()
    }
}

impl<E: Entity> InsertBuilder<E> {
    /// Empty insert with no values and no rules
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            rules: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Set a column value; setting the same field again replaces the value
    pub fn set(mut self, field: E::Field, value: impl Into<DatabaseValue>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
        self
    }

    /// Set a column value and attach a rule that checks it before execution
    pub fn set_validated<R>(self, field: E::Field, value: impl Into<DatabaseValue>, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.set(field, value).rule(field, rule)
    }

    /// Attach a rule to a field; a field may carry several rules
    pub fn rule<R>(mut self, field: E::Field, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.rules.push((field, Box::new(rule)));
        self
    }

    /// Value currently set for `field`
    pub fn value(&self, field: E::Field) -> Option<&DatabaseValue> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    /// Returns true if `field` has a value, NULL included
    pub fn is_set(&self, field: E::Field) -> bool {
        self.value(field).is_some()
    }

    /// Run every rule and the required-field check, collecting all failures
    pub async fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in E::required_fields() {
            // An explicit NULL does not satisfy a required field
            let present = self.value(*field).is_some_and(|value| !value.is_null());
            if !present {
                let column = field.column();
                errors.add(ValidationError::with_code(
                    column,
                    format!("{} is required", column),
                    "required",
                ));
            }
        }

        for (field, rule) in &self.rules {
            let value = self
                .value(*field)
                .map(DatabaseValue::to_json)
                .unwrap_or(serde_json::Value::Null);
            if let Err(failures) = rule.validate(&value, field.column()).await {
                errors.merge(failures);
            }
        }

        errors.into_result()
    }

    /// Compile to `INSERT INTO t (cols) VALUES (...) RETURNING <all columns>`.
    ///
    /// Columns follow the entity's declared order; NULL values are written
    /// inline instead of being bound.
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        let mut values: Vec<&(E::Field, DatabaseValue)> = self.values.iter().collect();
        values.sort_by_key(|(field, _)| field.position());

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut params = Vec::new();
        for (field, value) in values {
            columns.push(field.column());
            if value.is_null() {
                placeholders.push("NULL".to_string());
            } else {
                params.push(value.clone());
                placeholders.push(format!("${}", params.len()));
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            E::table_name(),
            columns.join(", "),
            placeholders.join(", "),
            E::columns().join(", ")
        );
        (sql, params)
    }

    /// Validate, then insert the row and decode the stored record
    pub async fn execute<X>(self, executor: &X) -> ModelResult<E>
    where
        X: QueryExecutor + ?Sized,
    {
        self.validate().await?;

        let (sql, params) = self.to_sql_with_params();
        let label = format!("{}.insert", E::table_name());
        let rows = fetch_rows(executor, &label, &sql, &params).await?;

        match rows.first() {
            Some(row) => E::from_row(row),
            None => Err(ModelError::query(label, "INSERT returned no row")),
        }
    }
}
