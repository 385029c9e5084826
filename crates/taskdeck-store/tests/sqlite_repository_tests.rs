//! Repository behaviour against a real on-disk database.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rstest::rstest;
use taskdeck_core::{
    Category, CategoryId, InvalidArgument, Task, TaskId, TaskQuery, TodoError,
    query::SortDirection,
};
use taskdeck_store::{
    CategoryRepository, SqliteCategoryRepository, SqliteTaskRepository, StoreClient, StoreConfig,
    TaskRepository, open_at,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    client: StoreClient,
    tasks: SqliteTaskRepository,
    categories: SqliteCategoryRepository,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = open_at(dir.path().join("taskdeck.db")).expect("store opens");
    Fixture {
        tasks: SqliteTaskRepository::new(client.clone()),
        categories: SqliteCategoryRepository::new(client.clone()),
        client,
        _dir: dir,
    }
}

fn task(id: &str, text: &str, category: &str, minute: u32) -> Task {
    Task::new(
        TaskId::parse(id).expect("valid id"),
        text,
        category,
        Utc.with_ymd_and_hms(2025, 5, 1, 9, minute, 0).unwrap(),
    )
}

fn category(id: &str, name: &str) -> Category {
    Category::new(CategoryId::parse(id).expect("valid id"), name)
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
#[case::whitespace("\t\n")]
#[tokio::test]
async fn test_blank_text_is_rejected_and_nothing_written(#[case] text: &str) {
    let f = fixture();
    f.tasks.insert(&task("t1", "Keep me", "General", 0)).await.unwrap();

    let err = f.tasks.insert(&task("t2", text, "General", 1)).await;
    assert_eq!(
        err,
        Err(TodoError::InvalidArgument(InvalidArgument::EmptyText))
    );
    assert_eq!(f.tasks.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_fetched_task_equals_inserted() {
    let f = fixture();
    let mut t = task("01052025-abcde", "Water plants", "Home", 5);
    t.set_completed(true, t.created_at + Duration::minutes(30));

    f.tasks.insert(&t).await.unwrap();
    assert_eq!(f.tasks.get_by_id(&t.task_id).await.unwrap(), t);
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let f = fixture();
    let t = task("t1", "First", "General", 0);
    f.tasks.insert(&t).await.unwrap();

    let clash = task("t1", "Second", "General", 1);
    assert!(matches!(
        f.tasks.insert(&clash).await,
        Err(TodoError::InvalidArgument(InvalidArgument::DuplicateId { .. }))
    ));
    assert_eq!(f.tasks.get_by_id(&t.task_id).await.unwrap().text, "First");
}

#[tokio::test]
async fn test_delete_missing_is_noop() {
    let f = fixture();
    f.tasks.insert(&task("t1", "Stay", "General", 0)).await.unwrap();

    f.tasks
        .delete(&TaskId::parse("nope").unwrap())
        .await
        .expect("deleting a missing id succeeds");
    f.categories
        .delete(&CategoryId::parse("nope").unwrap())
        .await
        .expect("deleting a missing id succeeds");

    assert_eq!(f.tasks.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let f = fixture();
    let err = f.tasks.get_by_id(&TaskId::parse("ghost").unwrap()).await;
    assert!(matches!(err, Err(TodoError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_is_strict_and_keeps_created_at() {
    let f = fixture();
    let ghost = task("ghost", "Nobody", "General", 0);
    assert!(matches!(
        f.tasks.update(&ghost).await,
        Err(TodoError::NotFound { .. })
    ));
    assert_eq!(f.tasks.count().await.unwrap(), 0);

    let original = task("t1", "Draft", "Work", 0);
    f.tasks.insert(&original).await.unwrap();

    let mut edited = original.clone();
    edited.text = "Final".to_string();
    edited.created_at = original.created_at + Duration::days(10);
    let stored = f.tasks.update(&edited).await.unwrap();

    assert_eq!(stored.text, "Final");
    assert_eq!(stored.created_at, original.created_at);
    assert_eq!(f.tasks.get_by_id(&original.task_id).await.unwrap(), stored);

    let mut blank = stored.clone();
    blank.text = " ".to_string();
    assert!(matches!(
        f.tasks.update(&blank).await,
        Err(TodoError::InvalidArgument(InvalidArgument::EmptyText))
    ));
}

#[tokio::test]
async fn test_complete_and_reopen_round_trip() {
    let f = fixture();
    let a = task("a", "Buy milk", "Errands", 0);
    f.tasks.insert(&a).await.unwrap();

    let mut done = f.tasks.get_by_id(&a.task_id).await.unwrap();
    done.set_completed(true, Utc::now());
    let done = f.tasks.update(&done).await.unwrap();
    assert!(done.completed);
    assert!(done.completed_at.unwrap() >= done.created_at);

    let mut reopened = done.clone();
    reopened.set_completed(false, Utc::now());
    let reopened = f.tasks.update(&reopened).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(reopened.created_at, a.created_at);
}

#[tokio::test]
async fn test_list_with_query() {
    let f = fixture();
    f.tasks.insert(&task("b", "Buy bread", "Errands", 20)).await.unwrap();
    f.tasks.insert(&task("a", "Buy milk", "Errands", 10)).await.unwrap();
    f.tasks.insert(&task("c", "Buy tickets", "Leisure", 5)).await.unwrap();

    let query = TaskQuery::new()
        .with_search("buy")
        .with_category("Errands")
        .with_direction(SortDirection::Asc);
    let texts: Vec<_> = f
        .tasks
        .list(Some(&query))
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, ["Buy milk", "Buy bread"]);

    assert_eq!(f.tasks.list(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_category_name_collision_ignores_case() {
    let f = fixture();
    f.categories.insert(&category("c1", "Work")).await.unwrap();

    let err = f.categories.insert(&category("c2", "work")).await;
    assert!(matches!(
        err,
        Err(TodoError::InvalidArgument(InvalidArgument::DuplicateName { .. }))
    ));
    let err = f.categories.insert(&category("c3", "  WORK  ")).await;
    assert!(err.is_err());

    assert_eq!(f.categories.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_rename_rules() {
    let f = fixture();
    f.categories.insert(&category("c1", "Work")).await.unwrap();
    f.categories.insert(&category("c2", "Home")).await.unwrap();

    let err = f.categories.update(&category("c2", "WORK")).await;
    assert!(matches!(
        err,
        Err(TodoError::InvalidArgument(InvalidArgument::DuplicateName { .. }))
    ));

    let recased = f.categories.update(&category("c1", "WORK")).await.unwrap();
    assert_eq!(recased.category_name, "WORK");

    let err = f.categories.update(&category("c9", "Garden")).await;
    assert!(matches!(err, Err(TodoError::NotFound { .. })));

    let err = f.categories.insert(&category("c4", "   ")).await;
    assert_eq!(err, Err(TodoError::InvalidArgument(InvalidArgument::EmptyName)));
}

#[tokio::test]
async fn test_deleting_category_leaves_tasks_orphaned() {
    let f = fixture();
    let errands = category("c1", "Errands");
    f.categories.insert(&errands).await.unwrap();
    let t = task("t1", "Post letter", "Errands", 0);
    f.tasks.insert(&t).await.unwrap();

    f.categories.delete(&errands.category_id).await.unwrap();

    let stored = f.tasks.get_by_id(&t.task_id).await.unwrap();
    assert_eq!(stored, t);
    let remaining = f.categories.list().await.unwrap();
    assert!(stored.is_orphaned(&remaining));
}

#[tokio::test]
async fn test_renaming_category_does_not_touch_tasks() {
    let f = fixture();
    f.categories.insert(&category("c1", "Errands")).await.unwrap();
    let t = task("t1", "Post letter", "Errands", 0);
    f.tasks.insert(&t).await.unwrap();

    f.categories.update(&category("c1", "Chores")).await.unwrap();
    assert_eq!(f.tasks.get_by_id(&t.task_id).await.unwrap().category, "Errands");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_name_inserts_admit_one() {
    let f = fixture();
    let repo = Arc::new(f.categories.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let name = if i % 2 == 0 { "Work" } else { "WORK" };
                repo.insert(&category(&format!("c{i}"), name)).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(f.categories.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_closed_store_reports_unavailable() {
    let f = fixture();
    f.client.close();

    let err = f.tasks.list(None).await;
    assert!(matches!(err, Err(TodoError::StorageUnavailable { .. })));

    f.client.open().unwrap();
    assert!(f.tasks.list(None).await.is_ok());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db");
    let t = task("t1", "Persist me", "General", 0);

    {
        let client = StoreClient::new(StoreConfig::new(&path));
        client.open().unwrap();
        SqliteTaskRepository::new(client.clone())
            .insert(&t)
            .await
            .unwrap();
        client.close();
    }

    let client = open_at(&path).unwrap();
    let repo = SqliteTaskRepository::new(client);
    assert_eq!(repo.get_by_id(&t.task_id).await.unwrap(), t);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn text_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ,.!?]{0,40}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Whatever is accepted comes back unchanged; blank text never lands.
        #[test]
        fn prop_insert_then_fetch(text in text_strategy(), minute in 0u32..60, done in any::<bool>()) {
            tokio_test::block_on(async {
                let f = fixture();
                let mut t = task("p1", &text, "General", minute);
                if done {
                    t.set_completed(true, t.created_at + Duration::seconds(1));
                }

                let result = f.tasks.insert(&t).await;
                if text.trim().is_empty() {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(f.tasks.count().await.unwrap(), 0);
                } else {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(f.tasks.get_by_id(&t.task_id).await.unwrap(), t);
                }
                Ok(())
            })?;
        }
    }
}
