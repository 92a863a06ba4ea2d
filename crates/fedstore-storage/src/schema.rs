//! Engine schema migrations and bucket provisioning.
//!
//! Uses `rusqlite_migration` to manage the `buckets`/`entries` tables via
//! SQLite's `user_version` pragma. Migrations are embedded at compile time
//! via `include_str!`.
//!
//! Migrations only create the engine tables. The bucket layout itself (the
//! root bucket and its four children) is provisioned explicitly through
//! [`bootstrap`]; opening a store never creates buckets.

use std::path::Path;

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::bucket::Tx;
use crate::error::StorageError;
use crate::types::BucketKind;

/// All schema migrations, applied in order via `user_version` tracking.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(include_str!("migrations/001_buckets.sql"))])
}

/// Opens (or creates) the database file at `path`, takes the exclusive file
/// lock, and applies pending migrations.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let mut conn = Connection::open(path)?;
    // Must precede the switch to WAL so no shared-memory index is created
    // and the lock is held for the lifetime of the connection.
    conn.pragma_update(None, "locking_mode", "EXCLUSIVE")?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

/// Opens an in-memory database with all migrations applied.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let mut conn = Connection::open_in_memory()?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

/// Configures pragmas and applies pending migrations.
fn configure_and_migrate(conn: &mut Connection) -> Result<(), StorageError> {
    // WAL: readers see a snapshot while the single writer commits.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // NORMAL synchronous is safe with WAL mode.
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    migrations()
        .to_latest(conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;

    Ok(())
}

/// Provisions `root` and its four child buckets in the database at `path`.
///
/// Idempotent: existing buckets and their contents are left untouched.
pub fn bootstrap(path: &Path, root: &str) -> Result<(), StorageError> {
    let mut conn = open_database(path)?;
    bootstrap_connection(&mut conn, root)
}

/// Provisions `root` and its four child buckets on an open connection.
pub fn bootstrap_connection(conn: &mut Connection, root: &str) -> Result<(), StorageError> {
    let tx = Tx::write(conn)?;
    {
        let root = tx.create_bucket_if_not_exists(root.as_bytes())?;
        for kind in BucketKind::ALL {
            root.create_bucket_if_not_exists(kind.as_bytes())?;
        }
    }
    tx.commit()?;
    tracing::debug!(root, "provisioned bucket schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_valid() {
        assert!(migrations().validate().is_ok());
    }

    #[test]
    fn bootstrap_creates_all_buckets_once() {
        let mut conn = open_in_memory().unwrap();
        bootstrap_connection(&mut conn, "fedstore").unwrap();
        bootstrap_connection(&mut conn, "fedstore").unwrap();

        let tx = Tx::read(&conn).unwrap();
        let root = tx.bucket(b"fedstore").unwrap().unwrap();
        for kind in BucketKind::ALL {
            assert!(root.bucket(kind.as_bytes()).unwrap().is_some(), "missing {}", kind);
        }
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM buckets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn bootstrap_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        bootstrap(&path, "root").unwrap();
        assert!(path.exists());
    }
}
