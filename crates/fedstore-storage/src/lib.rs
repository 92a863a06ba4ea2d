//! Persistence for a federated object graph.
//!
//! Items (actors, activities, objects) and collections are kept in four
//! buckets under one root bucket of an ordered key-value tree. Every item is
//! keyed by its identifier, so loads are prefix scans over identifier bytes.
//! Collections store only the identifiers of their members and are
//! materialized against the member bucket on load.
//!
//! # Architecture
//!
//! - **Engine**: [`bucket`] emulates nested, ordered buckets with cursors
//!   and snapshot/write transactions on top of SQLite; [`schema`] migrates
//!   the engine tables and provisions the bucket layout.
//! - **Contracts**: [`traits`] defines [`Store`] and [`CollectionStore`]
//!   (what a protocol server programs against) and the per-kind
//!   [`ItemLoader`] / [`ItemSaver`] primitives.
//! - **Backends**: [`KvStore`] persists to a database file;
//!   [`InMemoryStore`] keeps the same layout in memory.
//!
//! # Modules
//!
//! - [`error`]: StorageError and its coarse ErrorKind
//! - [`types`]: BucketKind and Filter
//! - [`config`]: Config with optional log and error hooks
//! - [`idgen`]: identifier assignment for new items
//! - [`kv`]: KvStore
//! - [`memory`]: InMemoryStore

pub mod bucket;
pub mod config;
pub mod error;
pub mod idgen;
pub mod kv;
pub mod memory;
mod routing;
pub mod schema;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use config::{Config, LogFn};
pub use error::{ErrorKind, ResultExt, StorageError};
pub use kv::KvStore;
pub use memory::InMemoryStore;
pub use schema::bootstrap;
pub use traits::{CollectionStore, ItemLoader, ItemSaver, Store};
pub use types::{BucketKind, Filter};
