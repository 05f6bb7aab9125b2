//! # Trivia Client Library
//!
//! Terminal client for the trivia server. It connects over TCP, joins with
//! the configured username and prints every server message as it arrives.
//!
//! ## Answering Modes
//!
//! ### `you`
//! The next line typed within the question's time limit is sent as the
//! answer. Lines typed after the limit are not sent.
//!
//! ### `auto`
//! The answer is computed locally with the shared answer provider and sent
//! as soon as the question arrives.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! JSON client configuration: username and answering mode.
//!
//! ### Input Module (`input`)
//! Background stdin reader and terminal command parsing
//! (`CONNECT <host>:<port>`, `DISCONNECT`, `EXIT`).
//!
//! ### Network Module (`network`)
//! One connection to a server for the length of a game.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::{ClientConfig, ClientMode};
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig {
//!         username: "alice".to_string(),
//!         client_mode: ClientMode::Auto,
//!     };
//!     let mut lines = client::input::spawn_stdin_reader();
//!     let mut client = Client::connect("127.0.0.1:7777", &config).await?;
//!     let outcome = client.play(&mut lines).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod network;
