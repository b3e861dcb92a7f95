//! Persistence core for a compliance-document management product.
//!
//! The crate exposes typed stores over a relational database: compliance
//! documents with an append-only version ledger, user uploads organized into
//! folders, regulatory deadlines, an audit trail, notifications, and content
//! templates. Callers (a request-handling layer, out of scope here) invoke
//! one store operation per request; every multi-step mutation runs inside a
//! single transaction and fails with a typed [`error::StoreError`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;
pub mod types;

pub use config::CoreConfig;
pub use db::{init_pool, init_pool_with_size, run_migrations, DbPool};
pub use error::{StoreError, StoreResult};
pub use store::CoreStores;
pub use types::{Id, TagList};
