//! Ordered, nested key/value buckets on top of SQLite.
//!
//! A [`Tx`] wraps one SQLite transaction. Read transactions are DEFERRED and
//! see a consistent snapshot; write transactions are IMMEDIATE, so at most
//! one writer holds the database at a time. Dropping a `Tx` without calling
//! [`Tx::commit`] rolls it back.
//!
//! Buckets are rows in `buckets` (nested through `parent_id`, top level is
//! parent `0`); their entries live in the `entries` table, whose primary key
//! `(bucket_id, key)` keeps keys in byte-lexicographic order. A [`Cursor`]
//! walks that order one entry at a time.

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::StorageError;

/// A key/value pair read from a bucket.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Parent id used for top-level buckets.
const TOP_LEVEL: i64 = 0;

/// A read or write transaction over the bucket tree.
pub struct Tx<'conn> {
    inner: Transaction<'conn>,
    writable: bool,
}

impl<'conn> Tx<'conn> {
    /// Begins a read-only transaction.
    pub fn read(conn: &'conn Connection) -> Result<Self, StorageError> {
        let inner = conn.unchecked_transaction()?;
        Ok(Tx {
            inner,
            writable: false,
        })
    }

    /// Begins the (single) write transaction, blocking out other writers.
    pub fn write(conn: &'conn mut Connection) -> Result<Self, StorageError> {
        let inner = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Tx {
            inner,
            writable: true,
        })
    }

    /// Returns the top-level bucket `name`, if it exists.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'_>>, StorageError> {
        find_bucket(&self.inner, TOP_LEVEL, None, name, self.writable)
    }

    /// Returns the top-level bucket `name`, creating it if needed.
    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<Bucket<'_>, StorageError> {
        create_bucket(&self.inner, TOP_LEVEL, None, name, self.writable)
    }

    pub fn commit(self) -> Result<(), StorageError> {
        self.inner.commit()?;
        Ok(())
    }
}

/// Runs `f` inside a read transaction.
pub fn view<T>(
    conn: &Connection,
    f: impl FnOnce(&Tx<'_>) -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let tx = Tx::read(conn)?;
    f(&tx)
}

/// Runs `f` inside the write transaction, committing only if it succeeds.
pub fn update<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Tx<'_>) -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let tx = Tx::write(conn)?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

/// A named namespace inside a transaction.
pub struct Bucket<'tx> {
    conn: &'tx Connection,
    id: i64,
    path: String,
    writable: bool,
}

impl<'tx> Bucket<'tx> {
    /// Dotted path from the top level, e.g. `root.actors`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the enclosing transaction may modify this bucket.
    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Returns the child bucket `name`, if it exists.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'tx>>, StorageError> {
        find_bucket(self.conn, self.id, Some(&self.path), name, self.writable)
    }

    /// Returns the child bucket `name`, creating it if needed.
    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<Bucket<'tx>, StorageError> {
        create_bucket(self.conn, self.id, Some(&self.path), name, self.writable)
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let value: Option<Vec<u8>> = self
            .conn
            .prepare_cached("SELECT value FROM entries WHERE bucket_id = ?1 AND key = ?2")?
            .query_row(params![self.id, key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.check_writable()?;
        if key.is_empty() {
            return Err(StorageError::Invalid(format!(
                "empty key in bucket {}",
                self.path
            )));
        }
        self.conn
            .prepare_cached(
                "INSERT INTO entries (bucket_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (bucket_id, key) DO UPDATE SET value = excluded.value",
            )?
            .execute(params![self.id, key, value])?;
        Ok(())
    }

    /// A cursor over this bucket's entries in key order.
    pub fn cursor(&self) -> Cursor<'tx> {
        Cursor {
            conn: self.conn,
            bucket_id: self.id,
            position: None,
        }
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if !self.writable {
            return Err(StorageError::NotWritable(format!("bucket {}", self.path)));
        }
        Ok(())
    }
}

/// Forward cursor over a bucket's entries.
///
/// Every step re-queries the index from the last returned key, so a cursor
/// holds no statement open between calls.
pub struct Cursor<'tx> {
    conn: &'tx Connection,
    bucket_id: i64,
    position: Option<Vec<u8>>,
}

impl<'tx> Cursor<'tx> {
    /// Moves to the first entry whose key is `>= key`.
    pub fn seek(&mut self, key: &[u8]) -> Result<Option<Entry>, StorageError> {
        let entry = self
            .conn
            .prepare_cached(
                "SELECT key, value FROM entries WHERE bucket_id = ?1 AND key >= ?2
                 ORDER BY key LIMIT 1",
            )?
            .query_row(params![self.bucket_id, key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        Ok(self.land(entry))
    }

    /// Moves to the entry after the current one.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, StorageError> {
        let Some(current) = self.position.take() else {
            return Ok(None);
        };
        let entry = self
            .conn
            .prepare_cached(
                "SELECT key, value FROM entries WHERE bucket_id = ?1 AND key > ?2
                 ORDER BY key LIMIT 1",
            )?
            .query_row(params![self.bucket_id, current], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;
        Ok(self.land(entry))
    }

    /// Lazily yields every entry whose key starts with `prefix`, in key order.
    pub fn prefixed(self, prefix: &[u8]) -> Prefixed<'tx> {
        Prefixed {
            cursor: self,
            prefix: prefix.to_vec(),
            started: false,
            done: false,
        }
    }

    fn land(&mut self, entry: Option<Entry>) -> Option<Entry> {
        self.position = entry.as_ref().map(|(k, _)| k.clone());
        entry
    }
}

/// Iterator returned by [`Cursor::prefixed`].
pub struct Prefixed<'tx> {
    cursor: Cursor<'tx>,
    prefix: Vec<u8>,
    started: bool,
    done: bool,
}

impl Prefixed<'_> {
    /// Rewinds to the first match so the scan can be replayed.
    pub fn restart(&mut self) {
        self.started = false;
        self.done = false;
    }
}

impl Iterator for Prefixed<'_> {
    type Item = Result<Entry, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = if self.started {
            self.cursor.next_entry()
        } else {
            self.started = true;
            self.cursor.seek(&self.prefix)
        };
        match step {
            Ok(Some((key, value))) if key.starts_with(&self.prefix) => Some(Ok((key, value))),
            Ok(_) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn bucket_path(parent: Option<&str>, name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    match parent {
        Some(parent) => format!("{}.{}", parent, name),
        None => name.into_owned(),
    }
}

fn find_bucket<'a>(
    conn: &'a Connection,
    parent_id: i64,
    parent_path: Option<&str>,
    name: &[u8],
    writable: bool,
) -> Result<Option<Bucket<'a>>, StorageError> {
    if name.is_empty() {
        return Err(StorageError::Invalid("empty bucket name".into()));
    }
    let id: Option<i64> = conn
        .prepare_cached("SELECT id FROM buckets WHERE parent_id = ?1 AND name = ?2")?
        .query_row(params![parent_id, name], |row| row.get(0))
        .optional()?;
    Ok(id.map(|id| Bucket {
        conn,
        id,
        path: bucket_path(parent_path, name),
        writable,
    }))
}

fn create_bucket<'a>(
    conn: &'a Connection,
    parent_id: i64,
    parent_path: Option<&str>,
    name: &[u8],
    writable: bool,
) -> Result<Bucket<'a>, StorageError> {
    if let Some(existing) = find_bucket(conn, parent_id, parent_path, name, writable)? {
        return Ok(existing);
    }
    if !writable {
        return Err(StorageError::NotWritable(format!(
            "cannot create bucket {} in a read transaction",
            bucket_path(parent_path, name)
        )));
    }
    conn.prepare_cached("INSERT INTO buckets (parent_id, name) VALUES (?1, ?2)")?
        .execute(params![parent_id, name])?;
    Ok(Bucket {
        conn,
        id: conn.last_insert_rowid(),
        path: bucket_path(parent_path, name),
        writable,
    })
}
