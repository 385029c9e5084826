//! # Recording Collaborators and Controlled Repositories
//!
//! Stand-ins for the collaborators the application layer calls, plus
//! repository wrappers that let a test decide when a `list` call finishes or
//! whether any call fails.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskdeck_core::category::Category;
use taskdeck_core::collaborators::{ConfirmOptions, Confirmer, NotificationKind, Notifier};
use taskdeck_core::error::{TodoError, TodoResult};
use taskdeck_core::identifiers::{CategoryId, TaskId};
use taskdeck_core::query::TaskQuery;
use taskdeck_core::task::Task;
use taskdeck_store::{CategoryRepository, TaskRepository};
use tokio::sync::Notify;

/// One notification as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub description: Option<String>,
}

/// A notifier that keeps every notification it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    history: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.history.lock().unwrap().clone()
    }

    /// Messages of every notification so far
    pub fn messages(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.history.lock().unwrap().last().cloned()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }

    /// Check if a notification of `kind` with `message` was shown
    pub fn was_notified(&self, kind: NotificationKind, message: &str) -> bool {
        self.history
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.kind == kind && n.message == message)
    }

    pub fn reset(&self) {
        self.history.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, description: Option<&str>) {
        self.history.lock().unwrap().push(Notification {
            kind,
            message: message.to_string(),
            description: description.map(str::to_string),
        });
    }
}

/// A confirmer that answers from a queue and records each request.
///
/// Once the queue is empty every request gets the default answer, which is
/// `false` unless changed with [`ScriptedConfirmer::with_default`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirmer {
    answers: Arc<Mutex<VecDeque<bool>>>,
    default_answer: bool,
    requests: Arc<Mutex<Vec<ConfirmOptions>>>,
}

impl ScriptedConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one answer
    pub fn with_answer(self, answer: bool) -> Self {
        self.answers.lock().unwrap().push_back(answer);
        self
    }

    /// Answer given once the queue is exhausted
    pub fn with_default(mut self, answer: bool) -> Self {
        self.default_answer = answer;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every confirmation request so far, oldest first
    pub fn requests(&self) -> Vec<ConfirmOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, options: ConfirmOptions) -> bool {
        self.requests.lock().unwrap().push(options);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_answer)
    }
}

/// Holds `list` calls open and injects failures.
#[derive(Debug, Default)]
struct Controls {
    hold_next: AtomicBool,
    held: Notify,
    release: Notify,
    failure: Mutex<Option<TodoError>>,
    calls: Mutex<Vec<&'static str>>,
}

impl Controls {
    fn record(&self, operation: &'static str) -> TodoResult<()> {
        self.calls.lock().unwrap().push(operation);
        match self.failure.lock().unwrap().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn gate(&self) {
        if self.hold_next.swap(false, Ordering::AcqRel) {
            self.held.notify_one();
            self.release.notified().await;
        }
    }
}

macro_rules! controlled_repository_api {
    ($name:ident) => {
        impl $name {
            /// Make the next `list` call wait until [`Self::release_list`].
            pub fn hold_next_list(&self) {
                self.controls.hold_next.store(true, Ordering::Release);
            }

            /// Wait until a held `list` call is parked at the gate.
            pub async fn wait_until_held(&self) {
                self.controls.held.notified().await;
            }

            /// Let the held `list` call continue.
            pub fn release_list(&self) {
                self.controls.release.notify_one();
            }

            /// Fail every subsequent call with `err`.
            pub fn fail_with(&self, err: TodoError) {
                *self.controls.failure.lock().unwrap() = Some(err);
            }

            pub fn clear_failure(&self) {
                *self.controls.failure.lock().unwrap() = None;
            }

            pub fn call_count(&self) -> usize {
                self.controls.calls.lock().unwrap().len()
            }

            /// Operation names in call order
            pub fn call_history(&self) -> Vec<&'static str> {
                self.controls.calls.lock().unwrap().clone()
            }

            /// Check if an operation was called at least once
            pub fn was_called(&self, operation: &str) -> bool {
                self.controls
                    .calls
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|name| *name == operation)
            }
        }
    };
}

/// Wraps a [`TaskRepository`] with hold and failure controls.
pub struct ControlledTaskRepository {
    inner: Arc<dyn TaskRepository>,
    controls: Controls,
}

impl ControlledTaskRepository {
    pub fn new(inner: Arc<dyn TaskRepository>) -> Self {
        Self {
            inner,
            controls: Controls::default(),
        }
    }
}

controlled_repository_api!(ControlledTaskRepository);

#[async_trait]
impl TaskRepository for ControlledTaskRepository {
    async fn list(&self, filter: Option<&TaskQuery>) -> TodoResult<Vec<Task>> {
        self.controls.record("list")?;
        let tasks = self.inner.list(filter).await;
        self.controls.gate().await;
        tasks
    }

    async fn get_by_id(&self, task_id: &TaskId) -> TodoResult<Task> {
        self.controls.record("get_by_id")?;
        self.inner.get_by_id(task_id).await
    }

    async fn insert(&self, task: &Task) -> TodoResult<()> {
        self.controls.record("insert")?;
        self.inner.insert(task).await
    }

    async fn update(&self, task: &Task) -> TodoResult<Task> {
        self.controls.record("update")?;
        self.inner.update(task).await
    }

    async fn delete(&self, task_id: &TaskId) -> TodoResult<()> {
        self.controls.record("delete")?;
        self.inner.delete(task_id).await
    }

    async fn count(&self) -> TodoResult<usize> {
        self.controls.record("count")?;
        self.inner.count().await
    }
}

/// Wraps a [`CategoryRepository`] with hold and failure controls.
pub struct ControlledCategoryRepository {
    inner: Arc<dyn CategoryRepository>,
    controls: Controls,
}

impl ControlledCategoryRepository {
    pub fn new(inner: Arc<dyn CategoryRepository>) -> Self {
        Self {
            inner,
            controls: Controls::default(),
        }
    }
}

controlled_repository_api!(ControlledCategoryRepository);

#[async_trait]
impl CategoryRepository for ControlledCategoryRepository {
    async fn list(&self) -> TodoResult<Vec<Category>> {
        self.controls.record("list")?;
        let categories = self.inner.list().await;
        self.controls.gate().await;
        categories
    }

    async fn get_by_id(&self, category_id: &CategoryId) -> TodoResult<Category> {
        self.controls.record("get_by_id")?;
        self.inner.get_by_id(category_id).await
    }

    async fn insert(&self, category: &Category) -> TodoResult<Category> {
        self.controls.record("insert")?;
        self.inner.insert(category).await
    }

    async fn update(&self, category: &Category) -> TodoResult<Category> {
        self.controls.record("update")?;
        self.inner.update(category).await
    }

    async fn delete(&self, category_id: &CategoryId) -> TodoResult<()> {
        self.controls.record("delete")?;
        self.inner.delete(category_id).await
    }
}
