//! User-input collaborators
//!
//! The session core never blocks on a terminal itself. It asks these
//! traits for a yes/no answer (demo opt-in) and for free text (recipient and
//! amount of a Live transfer). The CLI backs both with stdin.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Asked once per connect attempt when no wallet provider is available
pub const DEMO_PROMPT: &str =
    "No wallet provider found! Would you like to enter 'Demo Mode' to explore the dashboard?";

pub const RECIPIENT_PROMPT: &str = "Enter recipient address:";

pub const AMOUNT_PROMPT: &str = "Enter amount in ETH:";

/// Yes/no question to the user
#[async_trait]
pub trait ConfirmationProvider: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Free-text question to the user; `None` means cancelled
#[async_trait]
pub trait TextInputProvider: Send + Sync {
    async fn read_text(&self, message: &str) -> Option<String>;
}

/// Answers every confirmation the same way (`--demo` / `--no-demo`)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmationProvider for AutoConfirm {
    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!(answer = self.0, "Auto-answering: {}", message);
        self.0
    }
}

/// Line-oriented stdin shared by the shell loop and the prompts
pub struct Console {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print `prompt` and read one line; `None` on EOF or read error
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        // A prompt that fails to print still leaves the read usable
        let _ = stdout.write_all(prompt.as_bytes()).await;
        let _ = stdout.flush().await;

        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read from stdin");
                None
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationProvider for Console {
    async fn confirm(&self, message: &str) -> bool {
        let answer = self.read_line(&format!("{} [y/N] ", message)).await;
        matches!(
            answer.map(|a| a.trim().to_lowercase()).as_deref(),
            Some("y") | Some("yes")
        )
    }
}

#[async_trait]
impl TextInputProvider for Console {
    async fn read_text(&self, message: &str) -> Option<String> {
        self.read_line(&format!("{} ", message))
            .await
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}
