//! # Trivia Server Library
//!
//! This library provides the authoritative server for a multiplayer trivia
//! game. Players join over TCP, the server runs a fixed sequence of timed
//! question rounds, scores answers and reports a final ranking.
//!
//! ## Core Responsibilities
//!
//! ### Game Orchestration
//! A single orchestrator task drives the game through
//! `WAITING_FOR_PLAYERS -> QUESTION <-> BETWEEN_ROUNDS -> FINISHED`. It alone
//! owns the player roster, the active round and the game state.
//!
//! ### Session Management
//! Handles the lifecycle of joined players:
//! - Username registration with capacity and uniqueness checks
//! - Disconnects (explicit BYE or transport failure) that keep earned points
//! - Release of every connection once the game is over
//!
//! ### Round Synchronization
//! A round ends as soon as every still-connected participant has answered,
//! or when its deadline passes, whichever comes first.
//!
//! ## Architecture Design
//!
//! ### Single Event Queue
//! Every connection task forwards decoded messages into one unbounded
//! channel consumed by the orchestrator. All answer scoring, roster changes
//! and state transitions therefore happen sequentially, and a completion
//! check always observes the ledger update that preceded it.
//!
//! ### TCP With Line Framing
//! Messages are JSON records, one per line, carried over TCP. Ordering per
//! connection is the stream order.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! JSON configuration file: player count, question sequence, timings and
//! every user-facing text template.
//!
//! ### Session Module (`session`)
//! Player roster indexed by username and by connection.
//!
//! ### Round Module (`round`)
//! Question payload, per-round answer ledger, scoring and completion check.
//!
//! ### Scoring Module (`scoring`)
//! Competition ranking, leaderboard text and winner lines.
//!
//! ### Game Module (`game`)
//! The orchestrator state machine.
//!
//! ### Network Module (`network`)
//! Listener, accept loop and per-connection reader/writer tasks.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//! use server::round::GeneratedQuestions;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::load(Path::new("server.json"))?;
//!     let server = Server::bind(config, Box::new(GeneratedQuestions)).await?;
//!
//!     // Accepts players, plays every configured round, broadcasts the
//!     // final standings and returns once the game is finished
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod round;
pub mod scoring;
pub mod session;
