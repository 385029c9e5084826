//! # Taskdeck Core
//!
//! Domain types and pure logic shared by every Taskdeck crate: tasks and
//! categories, record identifiers, validation rules, the filter/sort engine,
//! date formatting and the collaborator traits the application layer calls.
//!
//! Nothing in this crate touches storage.

pub mod category;
pub mod collaborators;
pub mod datefmt;
pub mod error;
pub mod identifiers;
pub mod query;
pub mod task;
pub mod validation;

pub use category::{Category, CategoryDraft};
pub use collaborators::{
    AssumeNo, AssumeYes, ConfirmOptions, ConfirmVariant, Confirmer, NotificationKind, Notifier,
};
pub use datefmt::{format_date, format_local};
pub use error::{CollectionName, InvalidArgument, TodoError, TodoResult};
pub use identifiers::{CategoryId, TaskId, generate_id, generate_id_at};
pub use query::{CategoryFilter, SortDirection, SortField, SortSpec, TaskQuery, TaskView};
pub use task::{DEFAULT_CATEGORY, NewTask, Task};
pub use validation::{IdentifierRules, TextRules, ValidationError};
