//! Connection pool for SQLite with thread-safe resource management

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use taskdeck_core::error::{TodoError, TodoResult};

use crate::config::StoreConfig;

/// File extensions accepted for the database file.
const ALLOWED_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

/// Connection pool for SQLite with a fixed capacity.
///
/// Connections are opened lazily up to `pool_size`. When every connection is
/// checked out, [`SqlitePool::acquire`] waits for one to be returned, for at
/// most the configured busy timeout.
pub struct SqlitePool {
    shared: Arc<Shared>,
    path: PathBuf,
    pool_size: usize,
    config: ConnectionConfig,
}

struct Shared {
    slots: Mutex<Slots>,
    returned: Condvar,
}

struct Slots {
    idle: Vec<Connection>,
    checked_out: usize,
}

impl Shared {
    // Slots only hold a counter and idle connections, so a panic while the
    // lock was held cannot leave them inconsistent.
    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configuration for SQLite connections
#[derive(Debug, Clone)]
pub(crate) struct ConnectionConfig {
    pub(crate) wal_mode: bool,
    pub(crate) cache_size_kb: u32,
    pub(crate) busy_timeout_ms: u32,
}

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub idle: usize,
    pub checked_out: usize,
    pub capacity: usize,
}

impl SqlitePool {
    /// Check that `path` can hold a database: a file name with a known
    /// extension inside an existing directory.
    pub(crate) fn validate_database_path(path: &Path) -> TodoResult<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| TodoError::unavailable("database path has no file name"))?;

        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
        if !extension_ok {
            return Err(TodoError::unavailable(format!(
                "invalid database path '{}': only .db, .sqlite and .sqlite3 files allowed",
                path.display()
            )));
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let parent = parent.canonicalize().map_err(|e| {
            TodoError::unavailable(format!(
                "database directory '{}' is not usable: {}",
                parent.display(),
                e
            ))
        })?;
        if !parent.is_dir() {
            return Err(TodoError::unavailable(format!(
                "'{}' is not a directory",
                parent.display()
            )));
        }

        Ok(parent.join(file_name))
    }

    /// Create a pool for the database described by `config`.
    ///
    /// One connection is opened immediately so that an unusable database is
    /// reported here rather than on first use.
    pub fn new(config: &StoreConfig) -> TodoResult<Self> {
        let path = Self::validate_database_path(&config.path)?;
        let conn_config = ConnectionConfig {
            wal_mode: config.wal_mode,
            cache_size_kb: config.cache_size_kb,
            busy_timeout_ms: config.busy_timeout_ms,
        };

        let first = Self::create_connection(&path, &conn_config)?;
        let mut idle = Vec::with_capacity(config.pool_size);
        idle.push(first);

        Ok(Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(Slots {
                    idle,
                    checked_out: 0,
                }),
                returned: Condvar::new(),
            }),
            path,
            pool_size: config.pool_size.max(1),
            config: conn_config,
        })
    }

    /// Resolved path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a new SQLite connection with WAL mode and optimizations
    fn create_connection(path: &Path, config: &ConnectionConfig) -> TodoResult<Connection> {
        let conn = Connection::open(path).map_err(|e| {
            TodoError::unavailable(format!("cannot open '{}': {}", path.display(), e))
        })?;

        let cache_pragma = format!("PRAGMA cache_size = -{};", config.cache_size_kb);
        let timeout_pragma = format!("PRAGMA busy_timeout = {};", config.busy_timeout_ms);

        let mut pragmas = Vec::new();
        if config.wal_mode {
            pragmas.push("PRAGMA journal_mode = WAL;");
        }
        pragmas.push("PRAGMA synchronous = NORMAL;");
        pragmas.push(&cache_pragma);
        pragmas.push(&timeout_pragma);
        pragmas.push("PRAGMA foreign_keys = ON;");

        conn.execute_batch(&pragmas.join("\n"))
            .map_err(|e| TodoError::unavailable(format!("failed to configure SQLite: {}", e)))?;

        Ok(conn)
    }

    /// Get a connection from the pool, waiting for one to be returned when
    /// the pool is at capacity.
    pub fn acquire(&self) -> TodoResult<PooledConnection> {
        let wait = Duration::from_millis(u64::from(self.config.busy_timeout_ms));
        let deadline = Instant::now() + wait;

        let mut slots = self.shared.lock_slots();
        loop {
            if let Some(conn) = slots.idle.pop() {
                slots.checked_out += 1;
                return Ok(PooledConnection::new(conn, Arc::clone(&self.shared)));
            }

            if slots.checked_out < self.pool_size {
                // Reserve the slot before releasing the lock to open the file.
                slots.checked_out += 1;
                drop(slots);

                return match Self::create_connection(&self.path, &self.config) {
                    Ok(conn) => Ok(PooledConnection::new(conn, Arc::clone(&self.shared))),
                    Err(e) => {
                        let mut slots = self.shared.lock_slots();
                        slots.checked_out -= 1;
                        self.shared.returned.notify_one();
                        Err(e)
                    }
                };
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(TodoError::storage(
                    "acquire_connection",
                    format!(
                        "connection pool exhausted ({} of {} in use)",
                        slots.checked_out, self.pool_size
                    ),
                ));
            }

            let (guard, _) = self
                .shared
                .returned
                .wait_timeout(slots, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            slots = guard;
        }
    }

    /// Current pool usage.
    pub fn status(&self) -> TodoResult<PoolStatus> {
        let slots = self.shared.lock_slots();
        Ok(PoolStatus {
            idle: slots.idle.len(),
            checked_out: slots.checked_out,
            capacity: self.pool_size,
        })
    }
}

/// RAII wrapper for pooled connections that returns the connection to the
/// pool on drop
pub struct PooledConnection {
    connection: Option<Connection>,
    shared: Arc<Shared>,
    discard: bool,
}

impl PooledConnection {
    fn new(connection: Connection, shared: Arc<Shared>) -> Self {
        Self {
            connection: Some(connection),
            shared,
            discard: false,
        }
    }

    /// Close the connection on drop instead of returning it to the pool.
    pub(crate) fn discard(&mut self) {
        self.discard = true;
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("BUG: PooledConnection has None connection (this should never happen)")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("BUG: PooledConnection has None connection (this should never happen)")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.connection.take() else {
            return;
        };

        let mut slots = self.shared.lock_slots();
        slots.checked_out = slots.checked_out.saturating_sub(1);
        if self.discard {
            tracing::warn!("Discarding pooled connection left in an unknown state");
            drop(conn);
        } else {
            slots.idle.push(conn);
        }
        self.shared.returned.notify_one();
    }
}
