use std::sync::Arc;

use gif_portal_client::{
    print_kv,
    wallet::{
        ApprovalPrompt,
        ApprovalRequest,
    },
    LogColor,
};
use tokio::sync::{
    mpsc,
    Mutex,
};

/// Lines read from stdin, shared by the command loop and the wallet's approval prompt.
pub type Lines = Arc<Mutex<mpsc::Receiver<String>>>;

/// Reads stdin on a dedicated thread so the runtime never blocks on the terminal.
pub fn spawn_stdin_reader() -> Lines {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

/// Asks on the terminal, the way a wallet extension pops up its approval window.
pub struct TerminalPrompt {
    lines: Lines,
}

impl TerminalPrompt {
    pub fn new(lines: Lines) -> Self {
        Self { lines }
    }
}

#[async_trait::async_trait]
impl ApprovalPrompt for TerminalPrompt {
    async fn approve(&self, request: &ApprovalRequest<'_>) -> bool {
        match request {
            ApprovalRequest::Connect { origin } => {
                print_kv!("Wallet", format!("connect to {origin}?"), LogColor::Header);
            }
            ApprovalRequest::SignTransaction { message } => {
                print_kv!(
                    "Wallet",
                    format!(
                        "sign a transaction with {} instruction(s)?",
                        message.instructions.len()
                    ),
                    LogColor::Header
                );
            }
        }
        println!("approve? [y/N]");

        let answer = self.lines.lock().await.recv().await;
        matches!(
            answer.as_deref().map(str::trim),
            Some("y" | "Y" | "yes")
        )
    }
}
