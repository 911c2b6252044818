//! WHERE clause accumulator
//!
//! Conditions and their bound values are appended together so the rendered
//! text and the parameter list can never drift apart. Callers read
//! [`SqlBuilder::next_param_index`] *before* adding a parameterized condition
//! and embed that index in the condition text.

use crate::backends::DatabaseValue;

#[derive(Debug, Clone, PartialEq)]
pub struct SqlBuilder {
    conditions: Vec<String>,
    params: Vec<DatabaseValue>,
    next_index: usize,
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlBuilder {
    /// Empty builder; the first placeholder is `$1`
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            next_index: 1,
        }
    }

    /// Index the next bound value will take
    pub fn next_param_index(&self) -> usize {
        self.next_index
    }

    /// Placeholder text for the next bound value, e.g. `$3`
    pub fn placeholder(&self) -> String {
        format!("${}", self.next_index)
    }

    /// Append a condition that already embeds the current placeholder
    pub fn add_condition(&mut self, condition: impl Into<String>, value: DatabaseValue) {
        self.conditions.push(condition.into());
        self.params.push(value);
        self.next_index += 1;
    }

    /// Append a condition that binds nothing, such as `bio IS NULL`
    pub fn add_condition_no_param(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Append `<column> IN ($i, $i+1, ...)` binding every value.
    ///
    /// An empty list matches nothing and renders `FALSE`.
    pub fn add_in(&mut self, column: &str, values: Vec<DatabaseValue>) {
        if values.is_empty() {
            self.add_condition_no_param("FALSE");
            return;
        }

        let placeholders: Vec<String> = (0..values.len())
            .map(|offset| format!("${}", self.next_index + offset))
            .collect();
        self.conditions
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self.next_index += values.len();
        self.params.extend(values);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `(" WHERE a AND b", values)`, or `("", [])` when nothing was added
    pub fn finalize(self) -> (String, Vec<DatabaseValue>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }
        (
            format!(" WHERE {}", self.conditions.join(" AND ")),
            self.params,
        )
    }
}
