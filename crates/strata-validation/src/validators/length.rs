//! Text length bounds

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Bounds on the character count of a text value (inclusive on both ends)
#[derive(Debug, Clone, Default)]
pub struct LengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub message: Option<String>,
}

impl LengthValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn range(self, min: usize, max: usize) -> Self {
        self.min(min).max(max)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn describe(&self, field: &str) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => {
                format!("{} must be exactly {} characters long", field, min)
            }
            (Some(min), Some(max)) => {
                format!("{} must be between {} and {} characters long", field, min, max)
            }
            (Some(min), None) => format!("{} must be at least {} characters long", field, min),
            (None, Some(max)) => format!("{} must be at most {} characters long", field, max),
            (None, None) => format!("{} has an invalid length", field),
        }
    }
}

#[async_trait]
impl ValidationRule for LengthValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        // NULL is the concern of RequiredValidator
        let text = match value {
            Value::Null => return Ok(()),
            Value::String(text) => text,
            _ => {
                return Err(ValidationError::with_code(
                    field,
                    format!("{} must be text", field),
                    "invalid_type",
                )
                .into())
            }
        };

        let length = text.chars().count();
        if self.min.is_some_and(|min| length < min) {
            return Err(ValidationError::with_code(field, self.describe(field), "length_min").into());
        }
        if self.max.is_some_and(|max| length > max) {
            return Err(ValidationError::with_code(field, self.describe(field), "length_max").into());
        }
        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "length"
    }
}
