//! Turning repository failures into user notifications.

use taskdeck_core::collaborators::Notifier;
use taskdeck_core::error::TodoError;
use tracing::warn;

/// Log `err`, tell the user about it, and hand it back for propagation.
///
/// When no description is given, the error's own message is shown.
pub(crate) fn report(
    notifier: &dyn Notifier,
    message: &str,
    description: Option<&str>,
    err: TodoError,
) -> TodoError {
    warn!(code = err.error_code(), error = %err, "{}", message);
    let detail = err.to_string();
    notifier.error(message, Some(description.unwrap_or(&detail)));
    err
}
