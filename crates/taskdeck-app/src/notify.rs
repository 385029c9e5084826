use taskdeck_core::collaborators::{NotificationKind, Notifier};
use tracing::{error, info};

/// Sends notifications to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, description: Option<&str>) {
        let description = description.unwrap_or_default();
        match kind {
            NotificationKind::Error => error!(%kind, description, "{}", message),
            NotificationKind::Success | NotificationKind::Info => {
                info!(%kind, description, "{}", message)
            }
        }
    }
}
