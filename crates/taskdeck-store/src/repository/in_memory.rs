use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use taskdeck_core::category::Category;
use taskdeck_core::error::{CollectionName, InvalidArgument, TodoError, TodoResult};
use taskdeck_core::identifiers::{CategoryId, TaskId};
use taskdeck_core::query::{self, TaskQuery};
use taskdeck_core::task::Task;
use taskdeck_core::validation::TextRules;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CategoryRepository, TaskRepository, ensure_unique_name, merge_task_update};

/// Tasks held in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<BTreeMap<TaskId, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Start from an existing set of tasks, skipping the validation `insert`
    /// applies.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: RwLock::new(
                tasks
                    .into_iter()
                    .map(|t| (t.task_id.clone(), t))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self, filter: Option<&TaskQuery>) -> TodoResult<Vec<Task>> {
        let tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        Ok(match filter {
            Some(q) => query::filter_and_sort(&tasks, q),
            None => tasks,
        })
    }

    async fn get_by_id(&self, task_id: &TaskId) -> TodoResult<Task> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| TodoError::not_found(CollectionName::Tasks, task_id.as_str()))
    }

    async fn insert(&self, task: &Task) -> TodoResult<()> {
        TextRules::require_text(&task.text)?;

        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.task_id) {
            return Err(InvalidArgument::DuplicateId {
                id: task.task_id.to_string(),
            }
            .into());
        }

        debug!(task_id = %task.task_id, "Saving task to memory");
        tasks.insert(task.task_id.clone(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TodoResult<Task> {
        TextRules::require_text(&task.text)?;

        let mut tasks = self.tasks.write().await;
        let current = tasks
            .get_mut(&task.task_id)
            .ok_or_else(|| TodoError::not_found(CollectionName::Tasks, task.task_id.as_str()))?;

        *current = merge_task_update(current, task);
        Ok(current.clone())
    }

    async fn delete(&self, task_id: &TaskId) -> TodoResult<()> {
        let removed = self.tasks.write().await.remove(task_id).is_some();
        debug!(task_id = %task_id, removed, "Deleted task from memory");
        Ok(())
    }

    async fn count(&self) -> TodoResult<usize> {
        Ok(self.tasks.read().await.len())
    }
}

/// Categories held in memory, with the same name rules as the SQLite
/// repository.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<BTreeMap<CategoryId, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> TodoResult<Vec<Category>> {
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, category_id: &CategoryId) -> TodoResult<Category> {
        self.categories
            .read()
            .await
            .get(category_id)
            .cloned()
            .ok_or_else(|| TodoError::not_found(CollectionName::Categories, category_id.as_str()))
    }

    async fn insert(&self, category: &Category) -> TodoResult<Category> {
        let name = TextRules::category_name(&category.category_name)?;

        let mut categories = self.categories.write().await;
        ensure_unique_name(categories.values(), &name, None)?;
        if categories.contains_key(&category.category_id) {
            return Err(InvalidArgument::DuplicateId {
                id: category.category_id.to_string(),
            }
            .into());
        }

        let record = Category::new(category.category_id.clone(), name);
        categories.insert(record.category_id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, category: &Category) -> TodoResult<Category> {
        let name = TextRules::category_name(&category.category_name)?;

        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.category_id) {
            return Err(TodoError::not_found(
                CollectionName::Categories,
                category.category_id.as_str(),
            ));
        }
        ensure_unique_name(categories.values(), &name, Some(&category.category_id))?;

        let record = Category::new(category.category_id.clone(), name);
        categories.insert(record.category_id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, category_id: &CategoryId) -> TodoResult<()> {
        self.categories.write().await.remove(category_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, text: &str) -> Task {
        Task::new(TaskId::parse(id).unwrap(), text, "General", Utc::now())
    }

    #[tokio::test]
    async fn test_task_crud() {
        let repo = InMemoryTaskRepository::new();
        let t = task("t1", "Buy milk");

        repo.insert(&t).await.unwrap();
        assert_eq!(repo.get_by_id(&t.task_id).await.unwrap(), t);
        assert_eq!(repo.count().await.unwrap(), 1);

        let mut edited = t.clone();
        edited.text = "Buy oat milk".to_string();
        let stored = repo.update(&edited).await.unwrap();
        assert_eq!(stored.text, "Buy oat milk");

        repo.delete(&t.task_id).await.unwrap();
        repo.delete(&t.task_id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_task_rules() {
        let repo = InMemoryTaskRepository::new();
        let blank = task("t1", "   ");
        assert_eq!(
            repo.insert(&blank).await,
            Err(TodoError::InvalidArgument(InvalidArgument::EmptyText))
        );

        let t = task("t2", "Walk");
        repo.insert(&t).await.unwrap();
        assert!(matches!(
            repo.insert(&t).await,
            Err(TodoError::InvalidArgument(InvalidArgument::DuplicateId { .. }))
        ));

        let ghost = task("t3", "Ghost");
        assert!(matches!(
            repo.update(&ghost).await,
            Err(TodoError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_category_names() {
        let repo = InMemoryCategoryRepository::new();
        let work = Category::new(CategoryId::parse("c1").unwrap(), " Work ");

        let stored = repo.insert(&work).await.unwrap();
        assert_eq!(stored.category_name, "Work");

        let clash = Category::new(CategoryId::parse("c2").unwrap(), "work");
        assert!(matches!(
            repo.insert(&clash).await,
            Err(TodoError::InvalidArgument(InvalidArgument::DuplicateName { .. }))
        ));

        let recased = Category::new(CategoryId::parse("c1").unwrap(), "WORK");
        assert_eq!(repo.update(&recased).await.unwrap().category_name, "WORK");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
