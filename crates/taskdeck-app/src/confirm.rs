//! Confirmation dialog with a single pending request.
//!
//! [`DialogConfirmer::confirm`] parks the request and waits; the UI side
//! observes it through [`DialogConfirmer::pending`] or
//! [`DialogConfirmer::wait_for_request`] and answers with
//! [`DialogConfirmer::resolve`]. Only one dialog can be open: a new request
//! replaces the open one, which resolves to `false`.

use std::sync::Mutex;

use async_trait::async_trait;
use taskdeck_core::collaborators::{ConfirmOptions, Confirmer};
use tokio::sync::{oneshot, watch};
use tracing::debug;

struct PendingDialog {
    options: ConfirmOptions,
    reply: oneshot::Sender<bool>,
}

pub struct DialogConfirmer {
    pending: Mutex<Option<PendingDialog>>,
    requests: watch::Sender<u64>,
}

impl Default for DialogConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DialogConfirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogConfirmer")
            .field("pending", &self.pending())
            .finish()
    }
}

impl DialogConfirmer {
    pub fn new() -> Self {
        let (requests, _) = watch::channel(0);
        Self {
            pending: Mutex::new(None),
            requests,
        }
    }

    /// Options of the open dialog, if any.
    pub fn pending(&self) -> Option<ConfirmOptions> {
        self.lock().as_ref().map(|p| p.options.clone())
    }

    /// Answer the open dialog. Returns `false` when nothing was pending.
    pub fn resolve(&self, confirmed: bool) -> bool {
        match self.lock().take() {
            Some(dialog) => {
                debug!(title = %dialog.options.title, confirmed, "Dialog resolved");
                // The requester may have stopped waiting; that is not an error.
                let _ = dialog.reply.send(confirmed);
                true
            }
            None => false,
        }
    }

    /// Wait until a dialog is open and return its options.
    pub async fn wait_for_request(&self) -> ConfirmOptions {
        let mut changes = self.requests.subscribe();
        loop {
            if let Some(options) = self.pending() {
                return options;
            }
            if changes.changed().await.is_err() {
                // Sender lives as long as `self`; unreachable in practice.
                return ConfirmOptions::default();
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingDialog>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Confirmer for DialogConfirmer {
    async fn confirm(&self, options: ConfirmOptions) -> bool {
        let (reply, answer) = oneshot::channel();
        let title = options.title.clone();

        let superseded = self.lock().replace(PendingDialog { options, reply });
        if let Some(previous) = superseded {
            debug!(title = %previous.options.title, "Dialog superseded; cancelling");
            let _ = previous.reply.send(false);
        }
        self.requests.send_modify(|n| *n += 1);

        debug!(title = %title, "Waiting for confirmation");
        answer.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_confirm_and_cancel() {
        let dialog = Arc::new(DialogConfirmer::new());

        let asker = {
            let dialog = Arc::clone(&dialog);
            tokio::spawn(async move { dialog.confirm(ConfirmOptions::new("Delete?")).await })
        };
        let seen = dialog.wait_for_request().await;
        assert_eq!(seen.title, "Delete?");
        assert!(dialog.resolve(true));
        assert!(asker.await.unwrap());

        let asker = {
            let dialog = Arc::clone(&dialog);
            tokio::spawn(async move { dialog.confirm(ConfirmOptions::default()).await })
        };
        dialog.wait_for_request().await;
        dialog.resolve(false);
        assert!(!asker.await.unwrap());
        assert!(dialog.pending().is_none());
    }

    #[tokio::test]
    async fn test_second_request_supersedes_first() {
        let dialog = Arc::new(DialogConfirmer::new());

        let first = {
            let dialog = Arc::clone(&dialog);
            tokio::spawn(async move { dialog.confirm(ConfirmOptions::new("first")).await })
        };
        dialog.wait_for_request().await;

        let second = {
            let dialog = Arc::clone(&dialog);
            tokio::spawn(async move { dialog.confirm(ConfirmOptions::new("second")).await })
        };

        // The first request is cancelled as soon as the second is parked.
        assert!(!first.await.unwrap());
        assert_eq!(dialog.pending().unwrap().title, "second");

        dialog.resolve(true);
        assert!(second.await.unwrap());
    }

    #[test]
    fn test_resolve_without_pending() {
        let dialog = DialogConfirmer::new();
        assert!(!dialog.resolve(true));
    }
}
