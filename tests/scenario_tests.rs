//! # End-to-End Scenarios
//!
//! Complete user flows through [`TaskdeckApp`] on an on-disk store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rstest::rstest;
use taskdeck::{
    AssumeYes, CategoryDraft, InMemoryTaskRepository, NewTask, NotificationKind, SortDirection,
    SortField, SortSpec, StoreConfig, Task, TaskQuery, TaskRepository, TaskdeckApp, TodoError,
};
use taskdeck_testing::{RecordingNotifier, TaskBuilder, at};
use tempfile::TempDir;

async fn open_app(dir: &TempDir, notifier: &RecordingNotifier) -> TaskdeckApp {
    TaskdeckApp::open(
        StoreConfig::new(dir.path().join("scenario.db")),
        Arc::new(AssumeYes),
        Arc::new(notifier.clone()),
    )
    .await
    .expect("app opens")
}

fn texts(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.text.as_str()).collect()
}

#[tokio::test]
async fn test_errands_search_scenario() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let app = open_app(&dir, &notifier).await;
    let list = app.todo_list();

    list.add_task(NewTask::new("Buy milk", "Errands")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    list.add_task(NewTask::new("Buy bread", "Errands")).await.unwrap();
    list.add_task(NewTask::new("Buy shoes", "Shopping")).await.unwrap();
    list.add_task(NewTask::new("Walk dog", "Errands")).await.unwrap();

    list.set_search("buy").await;
    list.set_category_filter("Errands").await;
    list.set_sort(SortSpec::new(SortField::CreatedAt, SortDirection::Asc))
        .await;

    assert_eq!(texts(&list.visible_tasks().await), ["Buy milk", "Buy bread"]);
    assert_eq!(notifier.count_of(NotificationKind::Success), 4);
    app.shutdown();
}

#[tokio::test]
async fn test_complete_then_reopen_keeps_created_at() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let app = open_app(&dir, &notifier).await;
    let list = app.todo_list();

    let task = list
        .add_task(NewTask::uncategorized("Water plants"))
        .await
        .unwrap();

    let done = list.set_completion(&task.task_id, true).await.unwrap();
    assert!(done.completed);
    assert!(done.completed_at.unwrap() >= done.created_at);
    assert_eq!(done.created_at, task.created_at);

    let reopened = list.set_completion(&task.task_id, false).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(reopened.created_at, task.created_at);
    app.shutdown();
}

#[tokio::test]
async fn test_deleting_category_orphans_task() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let app = open_app(&dir, &notifier).await;
    let manager = app.category_manager();
    manager.open().await.unwrap();

    let errands = manager.save(CategoryDraft::create("Errands")).await.unwrap();
    let task = app
        .todo_list()
        .add_task(NewTask::new("Post letter", "Errands"))
        .await
        .unwrap();

    assert!(manager.delete(&errands.category_id).await.unwrap());

    app.todo_list().refresh().await.unwrap();
    let stored = app.todo_list().all_tasks().await;
    assert_eq!(stored, vec![task.clone()]);
    assert!(stored[0].is_orphaned(&manager.categories().await));
    app.shutdown();
}

#[tokio::test]
async fn test_tasks_survive_restart() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();

    let first = open_app(&dir, &notifier).await;
    let task = first
        .todo_list()
        .add_task(NewTask::new("Renew passport", "Admin"))
        .await
        .unwrap();
    first.shutdown();

    let second = open_app(&dir, &notifier).await;
    second.todo_list().refresh().await.unwrap();
    assert_eq!(second.todo_list().all_tasks().await, vec![task]);
    second.shutdown();
}

#[tokio::test]
async fn test_category_names_are_unique_ignoring_case() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let app = open_app(&dir, &notifier).await;
    let manager = app.category_manager();

    manager.save(CategoryDraft::create("Work")).await.unwrap();
    let err = manager.save(CategoryDraft::create("work")).await.unwrap_err();

    assert!(matches!(err, TodoError::InvalidArgument(_)));
    assert!(notifier.was_notified(NotificationKind::Error, "Category already exists"));
    app.shutdown();
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
#[case::tabs("\t\n")]
#[tokio::test]
async fn test_blank_task_text_leaves_collection_unchanged(#[case] text: &str) {
    let repo = InMemoryTaskRepository::with_tasks([TaskBuilder::new(1, "Existing").build()]);
    let mut blank = TaskBuilder::new(2, "placeholder").build();
    blank.text = text.to_string();

    assert!(repo.insert(&blank).await.is_err());
    assert_eq!(repo.count().await.unwrap(), 1);

    let query = TaskQuery::new();
    assert_eq!(texts(&repo.list(Some(&query)).await.unwrap()), ["Existing"]);
}

#[tokio::test]
async fn test_delete_of_unknown_id_is_quiet() {
    let repo = InMemoryTaskRepository::with_tasks([TaskBuilder::new(1, "Existing").build()]);
    let ghost = TaskBuilder::new(2, "Ghost").build();

    repo.delete(&ghost.task_id).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[test]
fn test_completed_at_never_precedes_created_at() {
    let mut task = TaskBuilder::new(1, "Clock skew")
        .created_at(at(12, 0, 0))
        .build();
    task.set_completed(true, at(12, 0, 0) - Duration::hours(1));
    assert_eq!(task.completed_at, Some(task.created_at));

    task.set_completed(false, Utc::now());
    assert_eq!(task.completed_at, None);
}
