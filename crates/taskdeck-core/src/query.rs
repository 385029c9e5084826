//! Filter, sort and partition of the task list.
//!
//! Everything here is pure: the same tasks and the same [`TaskQuery`] always
//! produce the same [`TaskView`]. Storage order never leaks into the result.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use taskdeck_core::identifiers::TaskId;
//! use taskdeck_core::query::{self, CategoryFilter, SortDirection, TaskQuery};
//! use taskdeck_core::task::Task;
//!
//! let t = |id: &str, text: &str, secs: i64| {
//!     Task::new(
//!         TaskId::parse(id).unwrap(),
//!         text,
//!         "Errands",
//!         Utc.timestamp_opt(secs, 0).unwrap(),
//!     )
//! };
//! let tasks = vec![t("b", "Buy bread", 20), t("a", "Buy milk", 10), t("c", "Call mom", 5)];
//!
//! let query = TaskQuery::new()
//!     .with_search("buy")
//!     .with_category(CategoryFilter::named("Errands"))
//!     .with_direction(SortDirection::Asc);
//! let view = query::apply(&tasks, &query);
//!
//! let texts: Vec<_> = view.incomplete.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Buy milk", "Buy bread"]);
//! assert!(view.completed.is_empty());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::Task;

/// Filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "All";

/// Field the list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::CreatedAt => f.write_str("createdAt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// Error returned when a sort direction string is neither `ASC` nor `DESC`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort direction '{0}' (expected ASC or DESC)")]
pub struct ParseSortDirectionError(String);

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(ParseSortDirectionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Flip the direction when `field` is already the sort field, otherwise
    /// switch to `field` ascending.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        // Identifier breaks ties so equal timestamps still order deterministically.
        self.direction
            .apply(primary.then_with(|| a.task_id.cmp(&b.task_id)))
    }
}

/// Category restriction applied to the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive match on the task's category.
    Named(String),
}

impl CategoryFilter {
    /// Build a filter from user input. Only the literal `"All"` means no
    /// restriction; an empty name selects uncategorised tasks.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(name)
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => task.category == *name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Named(name) => name,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        Self::named(value)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search, category filter and sort order for the task list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQuery {
    /// Case-insensitive substring matched against task text. Blank means no
    /// text filter.
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortSpec,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.sort.direction = direction;
        self
    }

    /// Reset search, filter and sort to their defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any control differs from its default.
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// Check if a task passes the search and category filters.
    pub fn matches(&self, task: &Task) -> bool {
        // Blankness gates the filter; the match itself uses the query as typed.
        if !self.search.trim().is_empty()
            && !task.text.to_lowercase().contains(&self.search.to_lowercase())
        {
            return false;
        }

        self.category.matches(task)
    }
}

/// Filtered tasks split by completion, each half in sort order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskView {
    pub incomplete: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskView {
    /// Tasks to display: incomplete first, then completed unless collapsed.
    pub fn visible(&self, show_completed: bool) -> Vec<&Task> {
        let completed: &[Task] = if show_completed { &self.completed } else { &[] };
        self.incomplete.iter().chain(completed).collect()
    }

    pub fn len(&self) -> usize {
        self.incomplete.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incomplete.is_empty() && self.completed.is_empty()
    }
}

/// Apply the search and category filters, then sort.
pub fn filter_and_sort(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| query.matches(task))
        .cloned()
        .collect();
    selected.sort_by(|a, b| query.sort.compare(a, b));
    selected
}

/// Filter, sort and partition `tasks` by completion.
pub fn apply(tasks: &[Task], query: &TaskQuery) -> TaskView {
    let (completed, incomplete) = filter_and_sort(tasks, query)
        .into_iter()
        .partition(|task| task.completed);

    TaskView {
        incomplete,
        completed,
    }
}
