//! The task list view: fetches, mutations and query controls.
//!
//! Every mutation goes to the repository first and then re-fetches the full
//! collection; the filtered view is always recomputed from that fetched list.
//! Query controls only re-run the query engine over the cached list.

use std::sync::Arc;

use chrono::Utc;
use taskdeck_core::category::Category;
use taskdeck_core::collaborators::{ConfirmOptions, Confirmer, NotificationKind, Notifier};
use taskdeck_core::error::{InvalidArgument, TodoError, TodoResult};
use taskdeck_core::identifiers::TaskId;
use taskdeck_core::query::{
    self, ALL_CATEGORIES, CategoryFilter, SortField, SortSpec, TaskQuery, TaskView,
};
use taskdeck_core::task::{DEFAULT_CATEGORY, NewTask, Task};
use taskdeck_core::validation::TextRules;
use taskdeck_store::{CategoryRepository, TaskRepository};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::feedback::report;
use crate::liveness::Liveness;
use crate::{IdGenerator, MAX_ID_ATTEMPTS, default_id_generator};

/// How many categories the quick filter bar offers besides "All".
pub const QUICK_FILTER_LIMIT: usize = 6;

#[derive(Debug, Clone)]
struct ListState {
    tasks: Vec<Task>,
    category_names: Vec<String>,
    query: TaskQuery,
    show_completed: bool,
    view: TaskView,
    loaded: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            category_names: Vec::new(),
            query: TaskQuery::default(),
            show_completed: true,
            view: TaskView::default(),
            loaded: false,
        }
    }
}

impl ListState {
    fn recompute(&mut self) {
        self.view = query::apply(&self.tasks, &self.query);
    }
}

pub struct TodoList {
    tasks: Arc<dyn TaskRepository>,
    categories: Arc<dyn CategoryRepository>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    ids: IdGenerator,
    state: RwLock<ListState>,
    liveness: Liveness,
}

impl TodoList {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        categories: Arc<dyn CategoryRepository>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tasks,
            categories,
            confirmer,
            notifier,
            ids: default_id_generator(),
            state: RwLock::new(ListState::default()),
            liveness: Liveness::new(),
        }
    }

    /// Replace the identifier source used for new tasks.
    pub fn with_id_generator(mut self, ids: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Start with the completed section collapsed or expanded.
    pub fn with_show_completed(mut self, show_completed: bool) -> Self {
        self.state.get_mut().show_completed = show_completed;
        self
    }

    /// Re-fetch tasks and categories and rebuild the view.
    ///
    /// Returns `false` when the result was discarded because the list was
    /// closed or a newer refresh started while this one was in flight.
    pub async fn refresh(&self) -> TodoResult<bool> {
        let ticket = self.liveness.begin();

        let fetched = tokio::try_join!(self.tasks.list(None), self.categories.list());
        let (tasks, categories) = match fetched {
            Ok(found) => found,
            Err(e) if !self.liveness.is_alive() => return Err(e),
            Err(e) => return Err(report(&*self.notifier, "Failed to load tasks", None, e)),
        };

        let mut state = self.state.write().await;
        if !self.liveness.accepts(ticket) {
            debug!(count = tasks.len(), "Discarding stale task list");
            return Ok(false);
        }

        state.tasks = tasks;
        state.category_names = unique_names(&categories);
        state.loaded = true;
        state.recompute();
        debug!(
            total = state.tasks.len(),
            incomplete = state.view.incomplete.len(),
            completed = state.view.completed.len(),
            "Task list refreshed"
        );
        Ok(true)
    }

    /// Create a task from a draft.
    ///
    /// Text is trimmed and must be 1 to 100 characters and differ (ignoring
    /// case) from every existing task. A blank category becomes the default.
    pub async fn add_task(&self, draft: NewTask) -> TodoResult<Task> {
        let text = TextRules::task_text(&draft.text)
            .map_err(|e| report(&*self.notifier, text_problem(&e), None, e.into()))?;

        let existing = self
            .tasks
            .list(None)
            .await
            .map_err(|e| report(&*self.notifier, "Failed to add task", None, e))?;
        let folded = TextRules::fold(&text);
        if existing.iter().any(|t| TextRules::fold(&t.text) == folded) {
            let err = InvalidArgument::DuplicateText { text }.into();
            return Err(report(&*self.notifier, "This task already exists!", None, err));
        }

        let category = match draft.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            name => name.to_string(),
        };

        let task = self
            .insert_with_fresh_id(&text, &category)
            .await
            .map_err(|e| report(&*self.notifier, "Failed to add task", None, e))?;

        info!(task_id = %task.task_id, category = %task.category, "Task added");
        self.refresh_after_mutation().await;
        self.notifier.success("Task added successfully!");
        Ok(task)
    }

    async fn insert_with_fresh_id(&self, text: &str, category: &str) -> TodoResult<Task> {
        let created_at = Utc::now();
        let mut attempt = 1;
        loop {
            let raw = (self.ids)();
            let task_id = TaskId::parse(&raw).map_err(|e| InvalidArgument::InvalidId {
                id: raw.clone(),
                reason: e.to_string(),
            })?;

            let task = Task::new(task_id, text, category, created_at);
            match self.tasks.insert(&task).await {
                Ok(()) => return Ok(task),
                Err(TodoError::InvalidArgument(InvalidArgument::DuplicateId { id }))
                    if attempt < MAX_ID_ATTEMPTS =>
                {
                    warn!(task_id = %id, attempt, "Generated id already in use; regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Save edits to an existing task.
    pub async fn edit_task(&self, task: &Task) -> TodoResult<Task> {
        let text = TextRules::task_text(&task.text).map_err(|e| {
            let message = match e {
                InvalidArgument::EmptyText => "Please provide a task name",
                _ => text_problem(&e),
            };
            report(&*self.notifier, message, None, e.into())
        })?;

        let mut record = task.clone();
        record.text = text;
        if record.category.trim().is_empty() {
            record.category = DEFAULT_CATEGORY.to_string();
        }

        let stored = self.tasks.update(&record).await.map_err(|e| {
            report(
                &*self.notifier,
                "Failed to update task",
                Some("Please try again in a moment."),
                e,
            )
        })?;

        self.refresh_after_mutation().await;
        self.notifier.success("Task updated successfully!");
        Ok(stored)
    }

    /// Mark a task done or not done.
    pub async fn set_completion(&self, task_id: &TaskId, completed: bool) -> TodoResult<Task> {
        let fail = |e| report(&*self.notifier, "Failed to update task", None, e);

        let mut task = self.tasks.get_by_id(task_id).await.map_err(fail)?;
        task.set_completed(completed, Utc::now());
        let stored = self.tasks.update(&task).await.map_err(fail)?;

        debug!(task_id = %task_id, completed, "Completion changed");
        self.refresh_after_mutation().await;
        self.notifier.success("Task updated successfully!");
        Ok(stored)
    }

    /// Delete a task after the user confirms. Returns whether it was deleted.
    pub async fn delete_task(&self, task_id: &TaskId) -> TodoResult<bool> {
        let options = ConfirmOptions::new("Are you sure?")
            .with_description("You won't be able to revert this!")
            .with_labels("Yes, delete it!", "No, cancel!")
            .destructive();

        if !self.confirmer.confirm(options).await {
            self.notifier.notify(
                NotificationKind::Info,
                "Cancelled",
                Some("Your task is safe!"),
            );
            return Ok(false);
        }

        self.tasks
            .delete(task_id)
            .await
            .map_err(|e| report(&*self.notifier, "Failed to delete task", None, e))?;

        info!(task_id = %task_id, "Task deleted");
        self.refresh_after_mutation().await;
        self.notifier.success("Task deleted successfully!");
        Ok(true)
    }

    async fn refresh_after_mutation(&self) {
        // The mutation already succeeded; a failed refresh has been reported.
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Refresh after mutation failed");
        }
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.update_query(|q| q.search = search).await;
    }

    pub async fn set_category_filter(&self, filter: impl Into<CategoryFilter>) {
        let filter = filter.into();
        self.update_query(|q| q.category = filter).await;
    }

    pub async fn toggle_sort(&self, field: SortField) {
        self.update_query(|q| q.sort = q.sort.toggle(field)).await;
    }

    pub async fn set_sort(&self, sort: SortSpec) {
        self.update_query(|q| q.sort = sort).await;
    }

    /// Reset search, category filter and sort order.
    pub async fn clear_filters(&self) {
        self.update_query(TaskQuery::clear).await;
    }

    pub async fn set_show_completed(&self, show_completed: bool) {
        self.state.write().await.show_completed = show_completed;
    }

    async fn update_query(&self, change: impl FnOnce(&mut TaskQuery)) {
        let mut state = self.state.write().await;
        change(&mut state.query);
        state.recompute();
    }

    pub async fn view(&self) -> TaskView {
        self.state.read().await.view.clone()
    }

    /// Tasks as displayed: incomplete first, then completed unless collapsed.
    pub async fn visible_tasks(&self) -> Vec<Task> {
        let state = self.state.read().await;
        state
            .view
            .visible(state.show_completed)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn query(&self) -> TaskQuery {
        self.state.read().await.query.clone()
    }

    pub async fn show_completed(&self) -> bool {
        self.state.read().await.show_completed
    }

    /// Every task from the last refresh, unfiltered.
    pub async fn all_tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    /// Category names a task can be assigned to.
    pub async fn category_options(&self) -> Vec<String> {
        self.state.read().await.category_names.clone()
    }

    /// "All" followed by the first few categories.
    pub async fn quick_filters(&self) -> Vec<String> {
        let state = self.state.read().await;
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(state.category_names.iter().take(QUICK_FILTER_LIMIT).cloned())
            .collect()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Stop accepting fetch results. Mutations still reach the repository.
    pub fn close(&self) {
        self.liveness.kill();
        debug!("Task list closed");
    }

    pub fn is_open(&self) -> bool {
        self.liveness.is_alive()
    }
}

fn text_problem(err: &InvalidArgument) -> &'static str {
    match err {
        InvalidArgument::EmptyText => "Task description cannot be empty.",
        InvalidArgument::TextTooLong { .. } => "Task description is too long.",
        _ => "Invalid task",
    }
}

fn unique_names(categories: &[Category]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        if !names.contains(&category.category_name) {
            names.push(category.category_name.clone());
        }
    }
    names
}
