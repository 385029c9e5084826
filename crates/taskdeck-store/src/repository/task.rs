use async_trait::async_trait;
use taskdeck_core::error::{CollectionName, TodoError, TodoResult};
use taskdeck_core::identifiers::TaskId;
use taskdeck_core::query::{self, TaskQuery};
use taskdeck_core::task::Task;
use taskdeck_core::validation::TextRules;
use tracing::debug;

use super::{TaskRepository, merge_task_update};
use crate::client::StoreClient;
use crate::collection::AccessMode;

const TASKS: CollectionName = CollectionName::Tasks;

/// Tasks stored in the `tasks` collection, keyed by `task_id`.
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    client: StoreClient,
}

impl SqliteTaskRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn list(&self, filter: Option<&TaskQuery>) -> TodoResult<Vec<Task>> {
        let tasks: Vec<Task> = self
            .client
            .run(TASKS, AccessMode::ReadOnly, |h| h.get_all::<Task>())
            .await?;

        debug!(count = tasks.len(), filtered = filter.is_some(), "Loaded tasks");
        Ok(match filter {
            Some(q) => query::filter_and_sort(&tasks, q),
            None => tasks,
        })
    }

    async fn get_by_id(&self, task_id: &TaskId) -> TodoResult<Task> {
        let key = task_id.clone();
        self.client
            .run(TASKS, AccessMode::ReadOnly, move |h| {
                h.get::<Task>(key.as_str())?
                    .ok_or_else(|| TodoError::not_found(TASKS, key.as_str()))
            })
            .await
    }

    async fn insert(&self, task: &Task) -> TodoResult<()> {
        TextRules::require_text(&task.text)?;

        let record = task.clone();
        self.client
            .run(TASKS, AccessMode::ReadWrite, move |h| {
                h.insert(record.task_id.as_str(), &record)
            })
            .await?;

        debug!(task_id = %task.task_id, category = %task.category, "Inserted task");
        Ok(())
    }

    async fn update(&self, task: &Task) -> TodoResult<Task> {
        TextRules::require_text(&task.text)?;

        let incoming = task.clone();
        let stored = self
            .client
            .run(TASKS, AccessMode::ReadWrite, move |h| {
                let key = incoming.task_id.as_str();
                let current: Task = h
                    .get(key)?
                    .ok_or_else(|| TodoError::not_found(TASKS, key))?;

                let merged = merge_task_update(&current, &incoming);
                h.replace(key, &merged)?;
                Ok(merged)
            })
            .await?;

        debug!(task_id = %stored.task_id, completed = stored.completed, "Updated task");
        Ok(stored)
    }

    async fn delete(&self, task_id: &TaskId) -> TodoResult<()> {
        let key = task_id.clone();
        let removed = self
            .client
            .run(TASKS, AccessMode::ReadWrite, move |h| h.delete(key.as_str()))
            .await?;

        debug!(task_id = %task_id, removed, "Deleted task");
        Ok(())
    }

    async fn count(&self) -> TodoResult<usize> {
        self.client
            .run(TASKS, AccessMode::ReadOnly, |h| h.count())
            .await
    }
}
