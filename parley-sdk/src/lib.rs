//! Resilient client for a line-oriented, newline-terminated chat protocol
//! spoken over two plain TCP sockets: a broadcast feed (read) and an
//! authenticated submission socket (send).
//!
//! The crate keeps one authenticated session alive across an unreliable
//! network. Silent connection death (no error, just no data) is caught by
//! a liveness watchdog; on any failure the whole session is torn down,
//! reported, and reopened after a pause. Consumers never touch sockets:
//! everything flows through channels (see [`client::ClientChannels`]).
//!
//! ```rust,no_run
//! use parley_sdk::{client, ClientChannels, ConnectConfig};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), parley_sdk::ClientError> {
//! let (messages_tx, _messages_rx) = mpsc::unbounded_channel();
//! let (history_tx, _history_rx) = mpsc::unbounded_channel();
//! let (status_tx, _status_rx) = mpsc::unbounded_channel();
//! let (_outbound_tx, outbound_rx) = mpsc::unbounded_channel();
//!
//! let config = ConnectConfig {
//!     host: "chat.example.net".into(),
//!     token: "personal-hash".into(),
//!     ..ConnectConfig::default()
//! };
//! client::run(config, ClientChannels {
//!     messages: messages_tx,
//!     history: history_tx,
//!     status: status_tx,
//!     outbound: outbound_rx,
//! }).await
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod history;
pub mod message;
pub mod proto;

pub use client::ClientChannels;
pub use config::ConnectConfig;
pub use error::ClientError;
pub use event::{ConnectionPhase, ConnectionRole, Event};
pub use message::ChatMessage;
