//! # docsql
//!
//! A lightweight JSON document store layer over PostgreSQL and SQLite.
//!
//! ## Features
//!
//! - **One core, two engines**: a single set of deterministic query
//!   builders parameterized by [`Dialect`]; each backend is a thin
//!   [`DocumentClient`] adapter
//! - **Values are always parameters**: documents, patches, keys, and
//!   comparison values travel through placeholders, never through string
//!   interpolation; field paths are validated identifiers
//! - **Typed pipeline**: `Row → T` via `serde`, shared by document
//!   operations and arbitrary caller-supplied SQL
//! - **Explicit configuration**: the key-field name lives on the store
//!   value, not in process-global state
//! - **Fail-fast and transparent**: one statement per call, no retries,
//!   backend errors propagate verbatim
//!
//! ## Document operations
//!
//! ```ignore
//! use docsql::{DocumentStore, Field, SqliteClient};
//!
//! let store = DocumentStore::new(SqliteClient::open_in_memory()?);
//! store.ensure_table("people").await?;
//!
//! // INSERT / upsert
//! store.insert("people", &person).await?;
//! store.save("people", &person).await?;
//!
//! // Lookups
//! let one: Option<Person> = store.find_by_id("people", "one").await?;
//! let adults: Vec<Person> = store
//!     .find_by_field("people", &Field::gte("Age", 18)?)
//!     .await?;
//!
//! // Partial updates
//! store
//!     .patch_by_id("people", "one", &serde_json::json!({"NumValue": 44}))
//!     .await?;
//! store.remove_fields_by_id("people", "one", &["Tag"]).await?;
//! ```
//!
//! ## Raw SQL through the same pipeline
//!
//! ```ignore
//! use docsql::{SqlParam, query};
//!
//! let names: Vec<Person> = query("SELECT data FROM people WHERE data->>'Name' = $1")
//!     .bind(SqlParam::Text("Alice".into()))
//!     .fetch_all_as(&client)
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod dialect;
pub mod error;
pub mod field;
pub mod param;
pub mod query;
pub mod store;

pub use builder::DocumentIndexKind;
pub use client::{DocumentClient, FromSqlValue, SqlRow, SqlValue};
pub use dialect::{Arity, Dialect, Op};
pub use error::{DocError, DocResult};
pub use field::Field;
pub use param::SqlParam;
pub use query::{Query, query};
pub use store::{DocumentStore, StoreConfig};

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteClient;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolClient, create_pool, create_pool_with_config, create_pool_with_tls};
