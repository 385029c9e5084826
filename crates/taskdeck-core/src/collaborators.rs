//! Interfaces for the confirmation dialog and user notifications.
//!
//! The application layer only talks to these traits. Implementations live in
//! `taskdeck-app` (dialog and tracing-backed), the CLI (terminal prompt and
//! console output) and `taskdeck-testing` (scripted and recording doubles).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmVariant {
    #[default]
    Default,
    /// The confirmed action cannot be undone.
    Destructive,
}

/// Text and styling of a confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOptions {
    pub title: String,
    pub description: Option<String>,
    pub confirm_text: String,
    pub cancel_text: String,
    pub variant: ConfirmVariant,
}

impl ConfirmOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_text = confirm.into();
        self.cancel_text = cancel.into();
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = ConfirmVariant::Destructive;
        self
    }
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            title: "Are you sure?".to_string(),
            description: None,
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            variant: ConfirmVariant::Default,
        }
    }
}

/// Asks the user to approve an action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolve to `true` when the user confirms, `false` when they cancel.
    async fn confirm(&self, options: ConfirmOptions) -> bool;
}

/// Confirms every request without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm(&self, _options: ConfirmOptions) -> bool {
        true
    }
}

/// Cancels every request without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

#[async_trait]
impl Confirmer for AssumeNo {
    async fn confirm(&self, _options: ConfirmOptions) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
            NotificationKind::Info => f.write_str("info"),
        }
    }
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str, description: Option<&str>);

    fn success(&self, message: &str) {
        self.notify(NotificationKind::Success, message, None);
    }

    fn info(&self, message: &str) {
        self.notify(NotificationKind::Info, message, None);
    }

    fn error(&self, message: &str, description: Option<&str>) {
        self.notify(NotificationKind::Error, message, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ConfirmOptions::new("Delete this category?")
            .with_description("Tasks won't be removed")
            .with_labels("Delete", "Keep it")
            .destructive();

        assert_eq!(options.title, "Delete this category?");
        assert_eq!(options.confirm_text, "Delete");
        assert_eq!(options.cancel_text, "Keep it");
        assert_eq!(options.variant, ConfirmVariant::Destructive);
    }

    #[tokio::test]
    async fn test_fixed_confirmers() {
        assert!(AssumeYes.confirm(ConfirmOptions::default()).await);
        assert!(!AssumeNo.confirm(ConfirmOptions::default()).await);
    }
}
