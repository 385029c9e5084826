//! Subcommand handlers.

use taskdeck_app::TaskdeckApp;
use taskdeck_core::category::{Category, CategoryDraft};
use taskdeck_core::datefmt::format_local;
use taskdeck_core::identifiers::{CategoryId, TaskId};
use taskdeck_core::query::{CategoryFilter, SortDirection, SortField, SortSpec};
use taskdeck_core::task::{DEFAULT_CATEGORY, NewTask, Task};
use taskdeck_store::TaskRepository;
use tracing::debug;

use crate::error::CliError;
use crate::settings::UiConfig;
use crate::{CategoryCommands, Commands};

pub async fn execute(app: &TaskdeckApp, command: Commands, ui: &UiConfig) -> Result<(), CliError> {
    debug!(?command, "Executing command");
    match command {
        Commands::Add { text, category } => {
            let draft = NewTask::new(text, category.unwrap_or_default());
            let task = app.todo_list().add_task(draft).await?;
            println!("{}", task.task_id);
        }
        Commands::List {
            search,
            category,
            sort,
            hide_completed,
        } => {
            list_tasks(
                app,
                ListOptions {
                    search: search.unwrap_or_default(),
                    category: category.map_or(CategoryFilter::All, CategoryFilter::named),
                    direction: sort,
                    show_completed: ui.show_completed && !hide_completed,
                },
                &ui.date_format,
            )
            .await?;
        }
        Commands::Show { id } => {
            let task = find_task(app, &parse_task_id(&id)?).await?;
            let categories = load_categories(app).await?;
            print_details(&task, &categories, &ui.date_format);
        }
        Commands::Edit { id, text, category } => {
            if text.is_none() && category.is_none() {
                return Err(CliError::NothingToEdit);
            }
            let mut task = find_task(app, &parse_task_id(&id)?).await?;
            if let Some(text) = text {
                task.text = text;
            }
            if let Some(category) = category {
                task.category = category;
            }
            app.todo_list().edit_task(&task).await?;
        }
        Commands::Done { id } => {
            app.todo_list()
                .set_completion(&parse_task_id(&id)?, true)
                .await?;
        }
        Commands::Reopen { id } => {
            app.todo_list()
                .set_completion(&parse_task_id(&id)?, false)
                .await?;
        }
        Commands::Delete { id } => {
            app.todo_list().delete_task(&parse_task_id(&id)?).await?;
        }
        Commands::Category { command } => run_category(app, command).await?,
        Commands::Info => print_info(app).await?,
    }
    Ok(())
}

async fn run_category(app: &TaskdeckApp, command: CategoryCommands) -> Result<(), CliError> {
    let manager = app.category_manager();
    manager.open().await?;

    match command {
        CategoryCommands::List => {
            let categories = manager.categories().await;
            if categories.is_empty() {
                println!("No categories yet. Ideas: {}", manager.suggestions().join(", "));
            }
            for category in categories {
                println!("{}  {}", category.category_id, category.category_name);
            }
        }
        CategoryCommands::Add { name } => {
            let category = manager.save(CategoryDraft::create(name)).await?;
            println!("{}", category.category_id);
        }
        CategoryCommands::Rename { id, name } => {
            manager
                .save(CategoryDraft::rename(parse_category_id(&id)?, name))
                .await?;
        }
        CategoryCommands::Delete { id } => {
            manager.delete(&parse_category_id(&id)?).await?;
        }
    }
    Ok(())
}

struct ListOptions {
    search: String,
    category: CategoryFilter,
    direction: SortDirection,
    show_completed: bool,
}

async fn list_tasks(
    app: &TaskdeckApp,
    options: ListOptions,
    date_format: &str,
) -> Result<(), CliError> {
    let list = app.todo_list();
    list.refresh().await?;
    list.set_search(options.search).await;
    list.set_category_filter(options.category).await;
    list.set_sort(SortSpec::new(SortField::CreatedAt, options.direction))
        .await;
    list.set_show_completed(options.show_completed).await;

    let view = list.view().await;
    if view.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    for task in &view.incomplete {
        println!("{}", summary_line(task, date_format));
    }

    if !view.completed.is_empty() {
        if options.show_completed {
            println!("\nCompleted ({})", view.completed.len());
            for task in &view.completed {
                println!("{}", summary_line(task, date_format));
            }
        } else {
            println!("\n{} completed task(s) hidden", view.completed.len());
        }
    }
    Ok(())
}

fn summary_line(task: &Task, date_format: &str) -> String {
    format!(
        "[{}] {}  {}  ({})  {}",
        if task.completed { "x" } else { " " },
        task.task_id,
        task.text,
        task.category_label(),
        format_local(&task.created_at, date_format)
    )
}

fn print_details(task: &Task, categories: &[Category], date_format: &str) {
    println!("Id:        {}", task.task_id);
    println!("Text:      {}", task.text);
    if task.category != DEFAULT_CATEGORY && task.is_orphaned(categories) {
        println!("Category:  {} (deleted)", task.category_label());
    } else {
        println!("Category:  {}", task.category_label());
    }
    println!("Created:   {}", format_local(&task.created_at, date_format));
    match task.completed_at {
        Some(at) if task.completed => println!("Completed: {}", format_local(&at, date_format)),
        _ => println!("Completed: no"),
    }
}

async fn print_info(app: &TaskdeckApp) -> Result<(), CliError> {
    let client = app.client();
    let list = app.todo_list();
    list.refresh().await?;
    let tasks = list.all_tasks().await;
    let completed = tasks.iter().filter(|t| t.completed).count();
    let categories = load_categories(app).await?;

    println!("Database:       {}", client.path().display());
    println!("Schema version: {}", client.schema_version()?);
    println!("Tasks:          {} ({} completed)", tasks.len(), completed);
    println!("Categories:     {}", categories.len());
    Ok(())
}

async fn find_task(app: &TaskdeckApp, task_id: &TaskId) -> Result<Task, CliError> {
    Ok(app.tasks().get_by_id(task_id).await?)
}

async fn load_categories(app: &TaskdeckApp) -> Result<Vec<Category>, CliError> {
    let manager = app.category_manager();
    manager.open().await?;
    Ok(manager.categories().await)
}

fn parse_task_id(id: &str) -> Result<TaskId, CliError> {
    TaskId::parse(id).map_err(|source| CliError::InvalidId {
        id: id.to_string(),
        source,
    })
}

fn parse_category_id(id: &str) -> Result<CategoryId, CliError> {
    CategoryId::parse(id).map_err(|source| CliError::InvalidId {
        id: id.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use taskdeck_app::TracingNotifier;
    use taskdeck_core::collaborators::AssumeYes;
    use taskdeck_core::error::TodoError;
    use taskdeck_store::StoreConfig;

    fn sample() -> Task {
        Task::new(
            TaskId::parse("01032025-ab12c").unwrap(),
            "Buy milk",
            "Errands",
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_summary_line_marks_completion() {
        let mut task = sample();
        let line = summary_line(&task, "yyyy");
        assert!(line.starts_with("[ ] 01032025-ab12c  Buy milk  (Errands)"));

        task.set_completed(true, Utc::now());
        assert!(summary_line(&task, "yyyy").starts_with("[x]"));
    }

    #[test]
    fn test_parse_ids() {
        assert!(parse_task_id("01032025-ab12c").is_ok());
        assert!(matches!(
            parse_category_id("not an id"),
            Err(CliError::InvalidId { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_task_reads_the_store_directly() {
        let dir = tempfile::tempdir().unwrap();
        let app = TaskdeckApp::open(
            StoreConfig::new(dir.path().join("find.db")),
            Arc::new(AssumeYes),
            Arc::new(TracingNotifier),
        )
        .await
        .unwrap();

        let task = sample();
        app.tasks().insert(&task).await.unwrap();

        let found = find_task(&app, &task.task_id).await.unwrap();
        assert_eq!(found, task);
        assert!(app.todo_list().all_tasks().await.is_empty());

        let missing = parse_task_id("01032025-zz99z").unwrap();
        assert!(matches!(
            find_task(&app, &missing).await,
            Err(CliError::Todo(TodoError::NotFound { .. }))
        ));

        app.shutdown();
    }
}
