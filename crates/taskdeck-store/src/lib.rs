//! # Taskdeck Store
//!
//! Embedded persistence for tasks and categories.
//!
//! - **[StoreClient]**: owns the SQLite connection pool (WAL mode, busy
//!   timeout) and creates the `tasks` and `categories` collections on open.
//! - **[CollectionHandle]**: one transaction over one collection.
//! - **Repositories**: async CRUD with the validation rules of each record
//!   type, in SQLite and in-memory flavours.
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskdeck_store::{SqliteTaskRepository, StoreClient, StoreConfig, TaskRepository};
//!
//! # async fn demo() -> taskdeck_core::TodoResult<()> {
//! let client = StoreClient::new(StoreConfig::new("taskdeck.db"));
//! client.open()?;
//!
//! let tasks = SqliteTaskRepository::new(client.clone());
//! println!("{} tasks stored", tasks.count().await?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collection;
pub mod config;
pub mod migration;
pub mod pool;
pub mod repository;

pub use client::{StoreClient, open_at};
pub use collection::{AccessMode, CollectionHandle};
pub use config::{ConfigError, StoreConfig};
pub use migration::{Migration, MigrationEngine};
pub use pool::{PoolStatus, PooledConnection, SqlitePool};
pub use repository::{
    CategoryRepository, InMemoryCategoryRepository, InMemoryTaskRepository,
    SqliteCategoryRepository, SqliteTaskRepository, TaskRepository,
};
