//! Application root: owns the store client and wires the views to it.

use std::sync::Arc;

use taskdeck_core::collaborators::{Confirmer, Notifier};
use taskdeck_core::error::{TodoError, TodoResult};
use taskdeck_store::{SqliteCategoryRepository, SqliteTaskRepository, StoreClient, StoreConfig};
use tracing::info;

use crate::categories::CategoryManager;
use crate::todo_list::TodoList;

pub struct TaskdeckApp {
    client: StoreClient,
    tasks: Arc<SqliteTaskRepository>,
    todo_list: TodoList,
    category_manager: CategoryManager,
}

impl TaskdeckApp {
    /// Open the store described by `config` and build both views on it.
    pub async fn open(
        config: StoreConfig,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> TodoResult<Self> {
        let client = StoreClient::new(config);
        let opener = client.clone();
        tokio::task::spawn_blocking(move || opener.open())
            .await
            .map_err(|e| TodoError::unavailable(format!("open task failed: {}", e)))??;

        let tasks = Arc::new(SqliteTaskRepository::new(client.clone()));
        let categories = Arc::new(SqliteCategoryRepository::new(client.clone()));

        let todo_list = TodoList::new(
            tasks.clone(),
            categories.clone(),
            Arc::clone(&confirmer),
            Arc::clone(&notifier),
        );
        let category_manager = CategoryManager::new(categories, confirmer, notifier);

        Ok(Self {
            client,
            tasks,
            todo_list,
            category_manager,
        })
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    /// Direct repository access for lookups that should not touch view state.
    pub fn tasks(&self) -> &Arc<SqliteTaskRepository> {
        &self.tasks
    }

    pub fn todo_list(&self) -> &TodoList {
        &self.todo_list
    }

    pub fn category_manager(&self) -> &CategoryManager {
        &self.category_manager
    }

    /// Close both views, then the store.
    pub fn shutdown(&self) {
        self.todo_list.close();
        self.category_manager.close();
        self.client.close();
        info!("Taskdeck shut down");
    }
}
