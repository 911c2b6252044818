//! Presence check

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Rejects NULL and blank text
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator {
    pub message: Option<String>,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[async_trait]
impl ValidationRule for RequiredValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        let missing = match value {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        };
        if !missing {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("{} is required", field));
        Err(ValidationError::with_code(field, message, "required").into())
    }

    fn rule_name(&self) -> &'static str {
        "required"
    }
}
