//! Terminal implementations of the confirmation and notification traits.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use taskdeck_core::collaborators::{ConfirmOptions, Confirmer, NotificationKind, Notifier};

/// Prints notifications; errors go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, description: Option<&str>) {
        let line = match description {
            Some(description) => format!("{} {}", message, description),
            None => message.to_string(),
        };
        match kind {
            NotificationKind::Success => println!("✅ {}", line),
            NotificationKind::Info => println!("ℹ️  {}", line),
            NotificationKind::Error => eprintln!("❌ {}", line),
        }
    }
}

/// Asks on the terminal, or answers yes when started with `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirmer {
    assume_yes: bool,
}

impl PromptConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Confirmer for PromptConfirmer {
    async fn confirm(&self, options: ConfirmOptions) -> bool {
        if self.assume_yes {
            return true;
        }

        tokio::task::spawn_blocking(move || prompt(&options, io::stdin().lock()))
            .await
            .unwrap_or(false)
    }
}

fn prompt(options: &ConfirmOptions, mut input: impl BufRead) -> bool {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", options.title);
    if let Some(description) = &options.description {
        let _ = writeln!(stdout, "{}", description);
    }
    let _ = write!(
        stdout,
        "[y] {} / [N] {}: ",
        options.confirm_text, options.cancel_text
    );
    let _ = stdout.flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y\n", true)]
    #[case(" YES \n", true)]
    #[case("n\n", false)]
    #[case("\n", false)]
    #[case("", false)]
    fn test_prompt_answers(#[case] input: &str, #[case] expected: bool) {
        let options = ConfirmOptions::new("Delete?");
        assert_eq!(prompt(&options, input.as_bytes()), expected);
    }

    #[tokio::test]
    async fn test_assume_yes_skips_prompt() {
        assert!(PromptConfirmer::new(true).confirm(ConfirmOptions::default()).await);
    }
}
