//! Validation rule trait

use crate::error::ValidationResult;
use async_trait::async_trait;
use serde_json::Value;

/// A check applied to one field value before it is written.
///
/// Rules are pure: they look only at the value and never touch the database.
#[async_trait]
pub trait ValidationRule: Send + Sync {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()>;

    fn rule_name(&self) -> &'static str;
}
