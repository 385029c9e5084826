//! Task domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::identifiers::TaskId;

/// Category given to tasks created without an explicit one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Label shown for tasks whose category is blank.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A unit of work on the list.
///
/// `category` is matched against [`Category::category_name`] by convention
/// only. Deleting or renaming a category never touches the tasks that carry
/// its old name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub completed: bool,

    /// Set once at insertion; the repositories refuse to change it.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(
        rename = "completedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an incomplete task.
    pub fn new(
        task_id: TaskId,
        text: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            text: text.into(),
            category: category.into(),
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Change the completion flag.
    ///
    /// Completing stamps `completed_at` with `now`, clamped so it never
    /// precedes `created_at`. Reopening clears it. Setting the flag to the
    /// value it already has changes nothing.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if self.completed == completed {
            return;
        }

        self.completed = completed;
        self.completed_at = if completed {
            Some(now.max(self.created_at))
        } else {
            None
        };
    }

    /// Whether the task's category matches none of `categories`.
    pub fn is_orphaned(&self, categories: &[Category]) -> bool {
        !categories
            .iter()
            .any(|c| c.category_name == self.category)
    }

    /// Category text for display.
    pub fn category_label(&self) -> &str {
        if self.category.trim().is_empty() {
            UNCATEGORIZED_LABEL
        } else {
            &self.category
        }
    }
}

/// Task draft entered by the user, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub text: String,
    pub category: String,
}

impl NewTask {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Draft in the default category.
    pub fn uncategorized(text: impl Into<String>) -> Self {
        Self::new(text, DEFAULT_CATEGORY)
    }
}

impl Default for NewTask {
    fn default() -> Self {
        Self::uncategorized("")
    }
}
