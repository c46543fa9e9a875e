//! Scoped TCP connections.
//!
//! A connection's open/close lifecycle is tied to a single supervision
//! cycle: INITIATED is reported before the connect, ESTABLISHED after,
//! and a drop guard reports CLOSED exactly once on every exit path,
//! even when the socket never finished opening.

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::ClientError;
use crate::event::{ConnectionPhase, ConnectionRole, Event};

/// One open socket: buffered read half, write half, and the CLOSED guard.
#[derive(Debug)]
pub struct Connection {
    pub reader: BufReader<OwnedReadHalf>,
    pub writer: OwnedWriteHalf,
    _guard: StatusGuard,
}

impl Connection {
    /// Open a socket for `role`. Status events (when a sender is given)
    /// follow the per-role sequence: INITIATED before the connect attempt,
    /// ESTABLISHED on success, CLOSED when the returned value is dropped
    /// (or immediately, if the connect itself failed).
    pub async fn open(
        host: &str,
        port: u16,
        role: ConnectionRole,
        status: Option<UnboundedSender<Event>>,
    ) -> Result<Self, ClientError> {
        let addr = format!("{host}:{port}");
        emit(&status, role, ConnectionPhase::Initiated);
        let guard = StatusGuard {
            role,
            status: status.clone(),
        };

        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            // `guard` drops here and reports CLOSED with no ESTABLISHED.
            Err(source) => return Err(ClientError::Connect { addr, source }),
        };
        tracing::debug!(%addr, %role, "connected");
        emit(&status, role, ConnectionPhase::Established);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            _guard: guard,
        })
    }

    /// Mutable access to both halves at once, for tasks that read and
    /// write the same socket concurrently.
    pub fn halves_mut(&mut self) -> (&mut BufReader<OwnedReadHalf>, &mut OwnedWriteHalf) {
        (&mut self.reader, &mut self.writer)
    }
}

#[derive(Debug)]
struct StatusGuard {
    role: ConnectionRole,
    status: Option<UnboundedSender<Event>>,
}

impl Drop for StatusGuard {
    fn drop(&mut self) {
        // The socket halves, dropped alongside, close the fd.
        emit(&self.status, self.role, ConnectionPhase::Closed);
        tracing::debug!(role = %self.role, "connection closed");
    }
}

fn emit(status: &Option<UnboundedSender<Event>>, role: ConnectionRole, phase: ConnectionPhase) {
    if let Some(tx) = status {
        let _ = tx.send(Event::Connection { role, phase });
    }
}
