//! Store lifecycle: open, close and hand out collection handles.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use taskdeck_core::error::{CollectionName, TodoError, TodoResult};
use tracing::{debug, info};

use crate::collection::{AccessMode, CollectionHandle};
use crate::config::StoreConfig;
use crate::migration::MigrationEngine;
use crate::pool::{PoolStatus, SqlitePool};

struct OpenStore {
    pool: SqlitePool,
    schema_version: u32,
}

/// Handle to the embedded database.
///
/// Created unopened; the application root calls [`StoreClient::open`] and
/// passes clones to the repositories. Clones share the same open state, so
/// closing one closes all of them.
#[derive(Clone)]
pub struct StoreClient {
    config: Arc<StoreConfig>,
    state: Arc<RwLock<Option<Arc<OpenStore>>>>,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("path", &self.config.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open the database and create its collections.
    ///
    /// Calling this on an open client does nothing. On failure the client
    /// stays closed and the call can be repeated.
    pub fn open(&self) -> TodoResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| TodoError::unavailable(format!("store state poisoned: {}", e)))?;
        if state.is_some() {
            debug!(path = %self.config.path.display(), "Store already open");
            return Ok(());
        }

        self.config
            .validate()
            .map_err(|e| TodoError::unavailable(e.to_string()))?;

        let pool = SqlitePool::new(&self.config)?;
        let schema_version = {
            let conn = pool.acquire()?;
            MigrationEngine::new().migrate(&conn)?
        };

        info!(
            path = %pool.path().display(),
            schema_version,
            pool_size = self.config.pool_size,
            "Opened task store"
        );

        *state = Some(Arc::new(OpenStore {
            pool,
            schema_version,
        }));
        Ok(())
    }

    /// Release the pool. Handles already given out stay usable until dropped.
    pub fn close(&self) {
        match self.state.write() {
            Ok(mut state) => {
                if state.take().is_some() {
                    info!(path = %self.config.path.display(), "Closed task store");
                }
            }
            Err(e) => tracing::error!(error = %e, "Store state poisoned on close"),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.read().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Start a transaction on `name` for one logical operation.
    pub fn collection(&self, name: CollectionName, mode: AccessMode) -> TodoResult<CollectionHandle> {
        let store = self.open_store()?;
        let conn = store.pool.acquire()?;
        CollectionHandle::begin(conn, name, mode)
    }

    /// Run `op` against `name` on the blocking thread pool, committing when
    /// it succeeds and rolling back when it fails.
    pub async fn run<F, R>(&self, name: CollectionName, mode: AccessMode, op: F) -> TodoResult<R>
    where
        F: FnOnce(&CollectionHandle) -> TodoResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || {
            let handle = client.collection(name, mode)?;
            let result = op(&handle)?;
            handle.commit()?;
            Ok(result)
        })
        .await
        .map_err(|e| TodoError::storage(format!("{} task", name), e))?
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> TodoResult<u32> {
        Ok(self.open_store()?.schema_version)
    }

    /// Resolved database path when open, configured path otherwise.
    pub fn path(&self) -> PathBuf {
        match self.open_store() {
            Ok(store) => store.pool.path().to_path_buf(),
            Err(_) => self.config.path.clone(),
        }
    }

    pub fn pool_status(&self) -> TodoResult<PoolStatus> {
        self.open_store()?.pool.status()
    }

    fn open_store(&self) -> TodoResult<Arc<OpenStore>> {
        let state = self
            .state
            .read()
            .map_err(|e| TodoError::unavailable(format!("store state poisoned: {}", e)))?;
        state
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| TodoError::unavailable("store is not open"))
    }
}

/// Convenience for tests and tools: build and open in one step.
pub fn open_at(path: impl AsRef<Path>) -> TodoResult<StoreClient> {
    let client = StoreClient::new(StoreConfig::new(path.as_ref()));
    client.open()?;
    Ok(client)
}
