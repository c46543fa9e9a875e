//! Client error taxonomy.
//!
//! Transient errors are caught at the supervisor boundary and become a
//! teardown-and-retry; only terminal ones cross it (see
//! [`ClientError::is_terminal`]).

use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connect failed: host unreachable or connection refused.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The server dropped the connection in the middle of the handshake.
    #[error("connection dropped during the auth handshake")]
    HandshakeIncomplete,

    /// The server did not recognize the auth token.
    #[error("server did not recognize the token")]
    InvalidToken,

    /// The registration reply carried no account hash.
    #[error("server sent an unusable registration reply")]
    RegistrationRejected,

    /// No liveness ping arrived within the watchdog deadline.
    #[error("no liveness ping within {0:?}")]
    LivenessTimeout(Duration),

    /// The keepalive probe got no reply; the send path is dead.
    #[error("keepalive probe got no reply")]
    ProbeUnanswered,

    /// Mid-session socket I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Terminal errors abort the whole client instead of triggering
    /// another reconnect cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::InvalidToken)
    }
}
