//! Events emitted on the status channel for the UI layer to consume.

use chrono::{DateTime, Local};

/// Which of the two sockets an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// The broadcast chat feed.
    Read,
    /// The authenticated submission socket.
    Send,
}

/// Lifecycle phase of one connection within one supervision cycle.
///
/// Per role and cycle the order is always Initiated → Established → Closed,
/// each emitted exactly once (Established is skipped when the open failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Initiated,
    Established,
    Closed,
}

/// Events the client emits to the consumer (TUI, GUI, bot, etc.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A connection changed lifecycle phase.
    Connection {
        role: ConnectionRole,
        phase: ConnectionPhase,
    },

    /// Authentication succeeded; the server resolved our display name.
    /// Emitted once per successful handshake, never replayed.
    NicknameResolved { nickname: String },
}

/// Internal proof-of-activity marker: "this connection proved itself alive
/// just now". Consumed by the watchdog for its presence only.
#[derive(Debug, Clone)]
pub struct LivenessPing {
    pub at: DateTime<Local>,
    pub note: &'static str,
}

impl LivenessPing {
    pub fn now(note: &'static str) -> Self {
        Self {
            at: Local::now(),
            note,
        }
    }
}

impl std::fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionRole::Read => write!(f, "read"),
            ConnectionRole::Send => write!(f, "send"),
        }
    }
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionPhase::Initiated => write!(f, "initiated"),
            ConnectionPhase::Established => write!(f, "established"),
            ConnectionPhase::Closed => write!(f, "closed"),
        }
    }
}
