//! Built-in validators

pub mod length;
pub mod numeric;
pub mod pattern;
pub mod required;
