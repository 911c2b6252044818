//! Regular-expression checks

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Requires the whole text value to match a pattern
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
    pub message: Option<String>,
}

impl PatternValidator {
    /// Compiles `pattern` anchored at both ends
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            message: None,
        })
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }
}

#[async_trait]
impl ValidationRule for PatternValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        let matched = match value {
            Value::Null => return Ok(()),
            Value::String(text) => self.pattern.is_match(text),
            _ => false,
        };
        if matched {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("{} has an invalid format", field));
        Err(ValidationError::with_code(field, message, "pattern").into())
    }

    fn rule_name(&self) -> &'static str {
        "pattern"
    }
}
