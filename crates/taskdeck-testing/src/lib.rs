//! # Taskdeck Testing Utilities
//!
//! Helpers shared by the integration tests of every Taskdeck crate.
//!
//! ## Components
//!
//! - **Fixtures**: task and category builders with fixed timestamps, plus
//!   scripted identifier sources
//! - **Recording collaborators**: a [`RecordingNotifier`] and a
//!   [`ScriptedConfirmer`] that remember every call
//! - **Controlled repositories**: wrappers that can hold a `list` call open or
//!   fail on demand, for exercising stale results and error paths
//! - **Temporary store**: [`TempStore`], an opened store in a scratch directory
//!
//! ## Usage
//!
//! ```rust
//! use taskdeck_core::collaborators::{ConfirmOptions, Confirmer, NotificationKind, Notifier};
//! use taskdeck_testing::{RecordingNotifier, ScriptedConfirmer};
//!
//! # tokio_test::block_on(async {
//! let confirmer = ScriptedConfirmer::new().with_answer(true);
//! assert!(confirmer.confirm(ConfirmOptions::new("Delete?")).await);
//! assert!(!confirmer.confirm(ConfirmOptions::new("Delete again?")).await);
//! assert_eq!(confirmer.call_count(), 2);
//!
//! let notifier = RecordingNotifier::new();
//! notifier.success("Task added successfully!");
//! assert!(notifier.was_notified(NotificationKind::Success, "Task added successfully!"));
//! # });
//! ```

/// Record builders and identifier sources
pub mod fixtures;
/// Temporary on-disk store
pub mod harness;
/// Recording collaborators and controllable repositories
pub mod mocks;

pub use fixtures::{CategoryBuilder, TaskBuilder, at, category_id, scripted_ids, task_id};
pub use harness::TempStore;
pub use mocks::{
    ControlledCategoryRepository, ControlledTaskRepository, Notification, RecordingNotifier,
    ScriptedConfirmer,
};
