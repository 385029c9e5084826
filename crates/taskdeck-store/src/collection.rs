//! Per-operation access to one record collection.
//!
//! A [`CollectionHandle`] owns a pooled connection with an open transaction.
//! Read-only handles start a deferred transaction; read-write handles start an
//! immediate one, so concurrent writers queue on SQLite's write lock (bounded
//! by the busy timeout) instead of interleaving. Nothing is visible to other
//! connections until [`CollectionHandle::commit`]; a handle dropped without
//! committing rolls everything back.

use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskdeck_core::error::{CollectionName, InvalidArgument, TodoError, TodoResult};
use tracing::{debug, warn};

use crate::pool::PooledConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    fn begin_statement(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "BEGIN DEFERRED",
            AccessMode::ReadWrite => "BEGIN IMMEDIATE",
        }
    }
}

/// Transaction-scoped view of one collection.
pub struct CollectionHandle {
    conn: PooledConnection,
    name: CollectionName,
    mode: AccessMode,
    finished: bool,
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("finished", &self.finished)
            .finish()
    }
}

impl CollectionHandle {
    pub(crate) fn begin(
        conn: PooledConnection,
        name: CollectionName,
        mode: AccessMode,
    ) -> TodoResult<Self> {
        conn.execute_batch(mode.begin_statement())
            .map_err(|e| TodoError::storage(format!("begin {}", name), e))?;

        Ok(Self {
            conn,
            name,
            mode,
            finished: false,
        })
    }

    pub fn name(&self) -> CollectionName {
        self.name
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Every record in the collection, ordered by key.
    pub fn get_all<T: DeserializeOwned>(&self) -> TodoResult<Vec<T>> {
        let sql = format!("SELECT value FROM {} ORDER BY key", self.name.as_str());
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| self.fail("get_all", e))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| self.fail("get_all", e))?;

        let mut records = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| self.fail("get_all", e))?;
            records.push(serde_json::from_str(&raw)?);
        }
        Ok(records)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> TodoResult<Option<T>> {
        let sql = format!("SELECT value FROM {} WHERE key = ?1", self.name.as_str());
        let raw: Option<String> = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get(0)).optional())
            .map_err(|e| self.fail("get", e))?;

        raw.map(|value| serde_json::from_str(&value).map_err(TodoError::from))
            .transpose()
    }

    pub fn contains(&self, key: &str) -> TodoResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE key = ?1", self.name.as_str());
        let found: Option<i64> = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get(0)).optional())
            .map_err(|e| self.fail("contains", e))?;
        Ok(found.is_some())
    }

    pub fn count(&self) -> TodoResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.name.as_str());
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| self.fail("count", e))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Add a record under a key that must not exist yet.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> TodoResult<()> {
        self.ensure_writable()?;
        let json = serde_json::to_string(value)?;
        let sql = format!(
            "INSERT INTO {} (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
            self.name.as_str()
        );

        let changed = self
            .conn
            .execute(&sql, params![key, json])
            .map_err(|e| self.fail("insert", e))?;
        if changed == 0 {
            return Err(InvalidArgument::DuplicateId {
                id: key.to_string(),
            }
            .into());
        }

        debug!(collection = %self.name, key, "Inserted record");
        Ok(())
    }

    /// Insert or overwrite.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> TodoResult<()> {
        self.ensure_writable()?;
        let json = serde_json::to_string(value)?;
        let sql = format!(
            "INSERT INTO {} (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%s', 'now')",
            self.name.as_str()
        );

        self.conn
            .execute(&sql, params![key, json])
            .map_err(|e| self.fail("put", e))?;

        debug!(collection = %self.name, key, "Stored record");
        Ok(())
    }

    /// Overwrite a record that must already exist.
    pub fn replace<T: Serialize>(&self, key: &str, value: &T) -> TodoResult<()> {
        self.ensure_writable()?;
        let json = serde_json::to_string(value)?;
        let sql = format!(
            "UPDATE {} SET value = ?2, updated_at = strftime('%s', 'now') WHERE key = ?1",
            self.name.as_str()
        );

        let changed = self
            .conn
            .execute(&sql, params![key, json])
            .map_err(|e| self.fail("replace", e))?;
        if changed == 0 {
            return Err(TodoError::not_found(self.name, key));
        }

        debug!(collection = %self.name, key, "Replaced record");
        Ok(())
    }

    /// Remove a record. Returns whether one existed.
    pub fn delete(&self, key: &str) -> TodoResult<bool> {
        self.ensure_writable()?;
        let sql = format!("DELETE FROM {} WHERE key = ?1", self.name.as_str());

        let changed = self
            .conn
            .execute(&sql, params![key])
            .map_err(|e| self.fail("delete", e))?;

        debug!(collection = %self.name, key, removed = changed > 0, "Deleted record");
        Ok(changed > 0)
    }

    /// Make every change made through this handle durable.
    pub fn commit(mut self) -> TodoResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| self.fail("commit", e))?;
        self.finished = true;
        Ok(())
    }

    /// Discard every change made through this handle.
    pub fn rollback(mut self) -> TodoResult<()> {
        self.finished = true;
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => Ok(()),
            Err(e) => {
                self.conn.discard();
                Err(self.fail("rollback", e))
            }
        }
    }

    fn ensure_writable(&self) -> TodoResult<()> {
        match self.mode {
            AccessMode::ReadWrite => Ok(()),
            AccessMode::ReadOnly => Err(InvalidArgument::ReadOnlyHandle.into()),
        }
    }

    fn fail(&self, operation: &str, error: rusqlite::Error) -> TodoError {
        TodoError::storage(format!("{} {}", operation, self.name), error)
    }
}

impl Drop for CollectionHandle {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!(collection = %self.name, "Rolled back uncommitted handle"),
            Err(e) => {
                warn!(collection = %self.name, error = %e, "Rollback failed; discarding connection");
                self.conn.discard();
            }
        }
    }
}
