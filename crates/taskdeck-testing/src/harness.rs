//! # Temporary Store
//!
//! An opened on-disk store inside a scratch directory that is removed when the
//! harness is dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskdeck_core::error::{TodoError, TodoResult};
use taskdeck_store::{SqliteCategoryRepository, SqliteTaskRepository, StoreClient, StoreConfig};
use tempfile::TempDir;

/// File name of the database inside the scratch directory.
pub const TEMP_DB_FILE: &str = "taskdeck-test.db";

pub struct TempStore {
    dir: TempDir,
    client: StoreClient,
}

impl TempStore {
    /// Create a scratch directory and open a store in it.
    pub fn open() -> TodoResult<Self> {
        Self::open_with(|config| config)
    }

    /// Like [`TempStore::open`], with a chance to adjust the configuration.
    pub fn open_with(configure: impl FnOnce(StoreConfig) -> StoreConfig) -> TodoResult<Self> {
        let dir = TempDir::new()
            .map_err(|e| TodoError::unavailable(format!("scratch directory: {}", e)))?;
        let config = configure(StoreConfig::new(dir.path().join(TEMP_DB_FILE)));
        let client = StoreClient::new(config);
        client.open()?;
        Ok(Self { dir, client })
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.client.path()
    }

    pub fn tasks(&self) -> Arc<SqliteTaskRepository> {
        Arc::new(SqliteTaskRepository::new(self.client.clone()))
    }

    pub fn categories(&self) -> Arc<SqliteCategoryRepository> {
        Arc::new(SqliteCategoryRepository::new(self.client.clone()))
    }

    /// Close the store and open a fresh client on the same file.
    pub fn reopen(&mut self) -> TodoResult<()> {
        self.client.close();
        let client = StoreClient::new(self.client.config().clone());
        client.open()?;
        self.client = client;
        Ok(())
    }
}
