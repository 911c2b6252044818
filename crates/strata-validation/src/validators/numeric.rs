//! Numeric range checks

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Inclusive numeric range, optionally restricted to integers
#[derive(Debug, Clone, Default)]
pub struct NumericValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer_only: bool,
    pub message: Option<String>,
}

impl NumericValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn fail(&self, field: &str, default: String, code: &str) -> ValidationResult<()> {
        let message = self.message.clone().unwrap_or(default);
        Err(ValidationError::with_code(field, message, code).into())
    }
}

#[async_trait]
impl ValidationRule for NumericValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        let number = match value {
            Value::Null => return Ok(()),
            Value::Number(number) => number.as_f64(),
            _ => None,
        };
        let Some(number) = number else {
            return self.fail(field, format!("{} must be a number", field), "invalid_type");
        };

        if self.integer_only && number.fract() != 0.0 {
            return self.fail(field, format!("{} must be an integer", field), "integer");
        }
        if let Some(min) = self.min.filter(|min| number < *min) {
            return self.fail(field, format!("{} must be at least {}", field, min), "min_value");
        }
        if let Some(max) = self.max.filter(|max| number > *max) {
            return self.fail(field, format!("{} must be at most {}", field, max), "max_value");
        }
        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "numeric"
    }
}
