use std::io::{BufRead, Write};

use async_trait::async_trait;

use super::super::Confirm;

/// Asks `[y/N]` on the controlling terminal.
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();

        let answer = tokio::task::spawn_blocking(move || {
            print!("{} [y/N] ", message);
            let _ = ::std::io::stdout().flush();

            let mut line = String::new();
            match ::std::io::stdin().lock().read_line(&mut line) {
                Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
                Err(e) => {
                    tracing::warn!("cannot read confirmation: {}", e);
                    false
                },
            }
        })
        .await;

        answer.unwrap_or(false)
    }
}
