//! Database driver boundary

pub mod core;
pub mod postgres;

pub use self::core::*;
pub use postgres::{PoolConfig, PostgresExecutor};
