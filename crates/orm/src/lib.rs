//! # strata-orm: schema-driven typed queries
//!
//! Queries are built against entities whose fields form a closed enumeration,
//! so a misspelled column or a comparison against the wrong field type fails
//! to compile. A query is immutable state: every builder call returns a new
//! state, and compiling a state always yields the same SQL and parameters.
//!
//! ```ignore
//! let users = Query::<User>::new()
//!     .where_eq(UserField::Username, "ada")
//!     .order_by_desc(UserField::Id)
//!     .limit(10)
//!     .with("posts")
//!     .fetch(&executor)
//!     .await?;
//!
//! for user in &users {
//!     match user.many::<Post>("posts") {
//!         RelationStatus::Loaded(posts) => println!("{}: {}", user.username, posts.len()),
//!         RelationStatus::Failed(err) => eprintln!("posts unavailable: {}", err),
//!         RelationStatus::NotRequested => {}
//!     }
//! }
//! ```
//!
//! Requested relationships are loaded with one batched query per
//! relationship after the base query. A failed relationship is reported on
//! each parent and never discards the base records.

pub mod backends;
pub mod error;
pub mod loading;
pub mod model;
pub mod query;
pub mod relationships;

pub use backends::{
    DatabaseRow, DatabaseValue, FromDatabaseValue, PoolConfig, PostgresExecutor, QueryExecutor,
    RowKey,
};
pub use error::{ModelError, ModelResult, OrmError, OrmResult};
pub use loading::{BatchConfig, BatchLoader};
pub use model::{Entity, Field, Record, Selected, Selection};
pub use query::{
    Full, InsertBuilder, OrderDirection, OrderSpec, Partial, Predicate, Query, RowDecoder,
    SelectMode, Set, Unset,
};
pub use relationships::{
    Loaded, RelationData, RelationStatus, RelationshipDescriptor, RelationshipKind, PivotTable,
};

pub use strata_validation as validation;
