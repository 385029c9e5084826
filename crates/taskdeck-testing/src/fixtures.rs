//! # Fixtures
//!
//! Builders for records with predictable identifiers and timestamps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use taskdeck_core::category::Category;
use taskdeck_core::identifiers::{CategoryId, TaskId, generate_id};
use taskdeck_core::task::{DEFAULT_CATEGORY, Task};

/// A UTC instant on 1 March 2025 at `hour:minute:second`.
pub fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, second)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture time {hour}:{minute}:{second}"))
}

/// A task identifier dated 1 March 2025 with a numbered suffix.
pub fn task_id(n: u32) -> TaskId {
    TaskId::parse(format!("01032025-t{:04}", n)).expect("fixture task id is valid")
}

/// A category identifier dated 1 March 2025 with a numbered suffix.
pub fn category_id(n: u32) -> CategoryId {
    CategoryId::parse(format!("01032025-c{:04}", n)).expect("fixture category id is valid")
}

/// An identifier source that hands out `ids` in order, then falls back to
/// freshly generated identifiers.
pub fn scripted_ids<I, S>(ids: I) -> impl Fn() -> String + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let queue: Arc<Mutex<VecDeque<String>>> =
        Arc::new(Mutex::new(ids.into_iter().map(Into::into).collect()));
    move || {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(generate_id)
    }
}

/// Builds a [`Task`] with sensible defaults.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// Incomplete task `n` in the default category, created at 09:00.
    pub fn new(n: u32, text: impl Into<String>) -> Self {
        Self {
            task: Task::new(task_id(n), text, DEFAULT_CATEGORY, at(9, 0, 0)),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.task.category = category.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.task.created_at = created_at;
        self
    }

    /// Mark the task completed at `completed_at`.
    pub fn completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.task.set_completed(true, completed_at);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builds a [`Category`].
#[derive(Debug, Clone)]
pub struct CategoryBuilder {
    category: Category,
}

impl CategoryBuilder {
    pub fn new(n: u32, name: impl Into<String>) -> Self {
        Self {
            category: Category::new(category_id(n), name),
        }
    }

    pub fn build(self) -> Category {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder_defaults() {
        let task = TaskBuilder::new(1, "Buy milk").build();
        assert_eq!(task.task_id.as_str(), "01032025-t0001");
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(!task.completed);
        assert_eq!(task.created_at, at(9, 0, 0));
    }

    #[test]
    fn test_completed_builder_stamps_time() {
        let task = TaskBuilder::new(2, "Done")
            .created_at(at(8, 0, 0))
            .completed_at(at(10, 0, 0))
            .build();
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at(10, 0, 0)));
    }

    #[test]
    fn test_scripted_ids_fall_back() {
        let ids = scripted_ids(["01032025-aaaaa", "01032025-aaaaa"]);
        assert_eq!(ids(), "01032025-aaaaa");
        assert_eq!(ids(), "01032025-aaaaa");
        assert!(TaskId::parse(ids()).is_ok());
    }
}
