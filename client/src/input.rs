//! Terminal input: a background stdin reader and command parsing

use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// A line typed at the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `CONNECT <host>:<port>`
    Connect(String),
    Disconnect,
    Exit,
    /// Anything else; used as an answer while a question is open
    Text(String),
}

impl Command {
    /// Keywords are case-insensitive. Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or("").to_ascii_uppercase();

        match (keyword.as_str(), parts.next(), parts.next()) {
            ("CONNECT", Some(addr), None) => Command::Connect(addr.to_string()),
            ("DISCONNECT", None, _) => Command::Disconnect,
            ("EXIT", None, _) => Command::Exit,
            _ => Command::Text(line.to_string()),
        }
    }
}

/// Spawns a task forwarding stdin lines. The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}
