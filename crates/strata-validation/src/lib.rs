//! # strata-validation
//!
//! Per-field value validators used on the strata insert path. Each rule looks
//! at a single JSON value and reports every violation it finds; callers
//! collect the results of many fields into one [`ValidationErrors`] batch.

pub mod error;
pub mod traits;
pub mod validators;

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use traits::ValidationRule;

pub use validators::{
    length::LengthValidator, numeric::NumericValidator, pattern::PatternValidator,
    required::RequiredValidator,
};
