//! Async CRUD over the task and category collections.
//!
//! Each trait has a SQLite implementation backed by [`StoreClient`] and an
//! in-memory one with the same rules, used by tests and tools that do not
//! need durability.
//!
//! [`StoreClient`]: crate::client::StoreClient

use async_trait::async_trait;
use chrono::Utc;
use taskdeck_core::category::Category;
use taskdeck_core::error::{InvalidArgument, TodoResult};
use taskdeck_core::identifiers::{CategoryId, TaskId};
use taskdeck_core::query::TaskQuery;
use taskdeck_core::task::Task;

mod category;
mod in_memory;
mod task;

pub use category::SqliteCategoryRepository;
pub use in_memory::{InMemoryCategoryRepository, InMemoryTaskRepository};
pub use task::SqliteTaskRepository;

/// Persistence for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Every task. With a query, the search and category filters and the sort
    /// order are applied; completed tasks are not split out.
    async fn list(&self, filter: Option<&TaskQuery>) -> TodoResult<Vec<Task>>;

    /// Fails with `NotFound` when no task has this id.
    async fn get_by_id(&self, task_id: &TaskId) -> TodoResult<Task>;

    /// Store a new task. Fails with `EmptyText` for blank text and
    /// `DuplicateId` when the id is taken.
    async fn insert(&self, task: &Task) -> TodoResult<()>;

    /// Replace an existing task and return what was stored.
    ///
    /// The stored `createdAt` always wins over the one passed in.
    async fn update(&self, task: &Task) -> TodoResult<Task>;

    /// Remove a task. Missing ids are ignored.
    async fn delete(&self, task_id: &TaskId) -> TodoResult<()>;

    async fn count(&self) -> TodoResult<usize>;
}

/// Persistence for categories.
///
/// Names are trimmed before storage and must be unique ignoring case.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> TodoResult<Vec<Category>>;

    async fn get_by_id(&self, category_id: &CategoryId) -> TodoResult<Category>;

    /// Store a new category and return it with its trimmed name.
    async fn insert(&self, category: &Category) -> TodoResult<Category>;

    /// Rename an existing category. Tasks keep the name they had.
    async fn update(&self, category: &Category) -> TodoResult<Category>;

    /// Remove a category. Tasks referring to it are left alone.
    async fn delete(&self, category_id: &CategoryId) -> TodoResult<()>;
}

/// Apply the immutable-field rules of an update to `incoming`.
pub(crate) fn merge_task_update(stored: &Task, incoming: &Task) -> Task {
    let mut merged = incoming.clone();
    merged.created_at = stored.created_at;
    merged.completed_at = match (merged.completed, merged.completed_at) {
        (true, Some(at)) => Some(at.max(merged.created_at)),
        (true, None) => Some(
            stored
                .completed_at
                .unwrap_or_else(Utc::now)
                .max(merged.created_at),
        ),
        (false, _) => None,
    };
    merged
}

/// Check a category name against the others, ignoring the record being renamed.
pub(crate) fn ensure_unique_name<'a>(
    existing: impl IntoIterator<Item = &'a Category>,
    name: &str,
    skip: Option<&CategoryId>,
) -> TodoResult<()> {
    let clash = existing
        .into_iter()
        .filter(|c| Some(&c.category_id) != skip)
        .any(|c| c.name_matches(name));

    if clash {
        return Err(InvalidArgument::DuplicateName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn stored() -> Task {
        Task::new(
            TaskId::parse("t1").unwrap(),
            "Old",
            "Home",
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_merge_keeps_created_at() {
        let stored = stored();
        let mut incoming = stored.clone();
        incoming.text = "New".to_string();
        incoming.created_at = stored.created_at + Duration::days(3);

        let merged = merge_task_update(&stored, &incoming);
        assert_eq!(merged.text, "New");
        assert_eq!(merged.created_at, stored.created_at);
    }

    #[test]
    fn test_merge_completion_stamps() {
        let stored = stored();

        let mut done = stored.clone();
        done.completed = true;
        done.completed_at = Some(stored.created_at - Duration::hours(1));
        let merged = merge_task_update(&stored, &done);
        assert_eq!(merged.completed_at, Some(stored.created_at));

        let mut reopened = merged.clone();
        reopened.completed = false;
        assert_eq!(merge_task_update(&merged, &reopened).completed_at, None);
    }

    #[test]
    fn test_unique_name_skips_self() {
        let work = Category::new(CategoryId::parse("c1").unwrap(), "Work");
        let home = Category::new(CategoryId::parse("c2").unwrap(), "Home");
        let all = [work.clone(), home];

        assert!(ensure_unique_name(&all, "WORK", None).is_err());
        assert!(ensure_unique_name(&all, "work", Some(&work.category_id)).is_ok());
        assert!(ensure_unique_name(&all, "home", Some(&work.category_id)).is_err());
        assert!(ensure_unique_name(&all, "Errands", None).is_ok());
    }
}
