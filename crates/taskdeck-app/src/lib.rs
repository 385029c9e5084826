//! # Taskdeck Application Layer
//!
//! Orchestrates repository calls for the task list and the category manager:
//! validates input, asks for confirmation before deleting, reports failures
//! through a [`Notifier`], re-fetches after every mutation and drops results
//! that arrive after a view closed or was superseded.
//!
//! [`Notifier`]: taskdeck_core::collaborators::Notifier

use std::sync::Arc;

pub mod app;
pub mod categories;
pub mod confirm;
mod feedback;
pub mod liveness;
pub mod notify;
pub mod todo_list;

pub use app::TaskdeckApp;
pub use categories::{CategoryManager, SUGGESTED_CATEGORIES};
pub use confirm::DialogConfirmer;
pub use liveness::{Liveness, Ticket};
pub use notify::TracingNotifier;
pub use todo_list::TodoList;

/// Source of new record identifiers.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Attempts at inserting a new record before an identifier collision is
/// reported to the caller.
pub const MAX_ID_ATTEMPTS: usize = 4;

pub(crate) fn default_id_generator() -> IdGenerator {
    Arc::new(taskdeck_core::identifiers::generate_id)
}
