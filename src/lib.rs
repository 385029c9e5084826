//! # Taskdeck
//!
//! A local-first task list: tasks and categories persisted in an embedded
//! SQLite store, a pure filter/sort engine, and an application layer that
//! validates input, confirms destructive actions and reports failures.
//!
//! ## Crates
//!
//! - **`taskdeck-core`**: [Task], [Category], identifiers, validation, the query engine
//!   ([TaskQuery], [query::apply]), date formatting and the [Confirmer] /
//!   [Notifier] traits
//! - **`taskdeck-store`**: [StoreClient] lifecycle, transactional collection handles and
//!   the task/category repositories
//! - **`taskdeck-app`**: [TodoList] and [CategoryManager] views over the repositories,
//!   bundled by [TaskdeckApp]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskdeck::{AssumeYes, NewTask, StoreConfig, TaskdeckApp, TracingNotifier};
//!
//! # async fn demo() -> taskdeck::TodoResult<()> {
//! let app = TaskdeckApp::open(
//!     StoreConfig::new("taskdeck.db"),
//!     Arc::new(AssumeYes),
//!     Arc::new(TracingNotifier),
//! )
//! .await?;
//!
//! let list = app.todo_list();
//! list.add_task(NewTask::new("Buy milk", "Errands")).await?;
//! list.set_search("milk").await;
//!
//! for task in list.visible_tasks().await {
//!     println!("{} {}", task.task_id, task.text);
//! }
//!
//! app.shutdown();
//! # Ok(())
//! # }
//! ```

pub use taskdeck_core::{datefmt, query};

pub use taskdeck_app::{CategoryManager, DialogConfirmer, TaskdeckApp, TodoList, TracingNotifier};
pub use taskdeck_core::{
    AssumeNo, AssumeYes, Category, CategoryDraft, CategoryFilter, CategoryId, ConfirmOptions,
    Confirmer, NewTask, NotificationKind, Notifier, SortDirection, SortField, SortSpec, Task,
    TaskId, TaskQuery, TaskView, TodoError, TodoResult,
};
pub use taskdeck_store::{
    CategoryRepository, InMemoryCategoryRepository, InMemoryTaskRepository,
    SqliteCategoryRepository, SqliteTaskRepository, StoreClient, StoreConfig, TaskRepository,
};
