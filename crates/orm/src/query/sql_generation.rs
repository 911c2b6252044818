//! Query Builder SQL generation
//!
//! Clause order is fixed: SELECT, FROM, WHERE, ORDER BY, LIMIT. Compiling the
//! same state twice yields byte-identical SQL and the same parameter list.

use super::builder::{Query, SelectMode};
use super::sql_builder::SqlBuilder;
use super::types::*;
use crate::backends::DatabaseValue;
use crate::model::{Entity, Field};

impl<E: Entity, S: SelectMode> Query<E, S> {
    /// Generate SQL with `$n` placeholders and the values to bind, in order
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = format!("SELECT {} FROM {}", self.select_list(), E::table_name());

        let (where_clause, params) = self.where_clause().finalize();
        sql.push_str(&where_clause);

        self.build_order_limit_clause(&mut sql);

        (sql, params)
    }

    /// SQL text only
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    /// One expression per declared field. Partial queries put `NULL` in the
    /// slot of every unselected field so the row shape never changes.
    fn select_list(&self) -> String {
        E::Field::all()
            .iter()
            .map(|field| {
                if !S::PARTIAL || self.selection.contains(*field) {
                    field.column()
                } else {
                    "NULL"
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn where_clause(&self) -> SqlBuilder {
        let mut builder = SqlBuilder::new();
        for predicate in &self.predicates {
            match predicate {
                Predicate::Equal(field, value) => {
                    let condition = format!("{} = {}", field.column(), builder.placeholder());
                    builder.add_condition(condition, value.clone());
                }
                Predicate::IsNull(field) => {
                    builder.add_condition_no_param(format!("{} IS NULL", field.column()));
                }
            }
        }
        builder
    }

    fn build_order_limit_clause(&self, sql: &mut String) {
        if !self.order_by.is_empty() {
            let specs: Vec<String> = self
                .order_by
                .iter()
                .map(|spec| format!("{} {}", spec.field.column(), spec.direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&specs.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
    }
}
