//! Connection supervision: the reconnect loop and the four concurrent
//! session members (reader, sender, keepalive, watchdog).
//!
//! One cycle = open both sockets → authenticate → run the members as one
//! failure domain via `tokio::select!`. The first member to finish cancels
//! the rest at their next suspension point; the connection guards report
//! CLOSED for both roles; the supervisor pauses and starts over. Only
//! [`ClientError::InvalidToken`] escapes the loop.

use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::auth;
use crate::config::ConnectConfig;
use crate::connection::Connection;
use crate::error::ClientError;
use crate::event::{ConnectionRole, Event, LivenessPing};
use crate::message::ChatMessage;
use crate::proto;

/// Channel surface between the client core and its consumers.
///
/// All channels are unbounded: the core never blocks on a slow consumer,
/// and every accepted inbound line is offered to both `messages` and
/// `history` without ever being dropped.
pub struct ClientChannels {
    /// Display feed: every accepted inbound line.
    pub messages: UnboundedSender<ChatMessage>,
    /// History feed: the same lines, for the persistence collaborator.
    pub history: UnboundedSender<ChatMessage>,
    /// Connection state transitions and nickname resolution.
    pub status: UnboundedSender<Event>,
    /// Text the consumer wants submitted to the chat.
    pub outbound: UnboundedReceiver<String>,
}

/// Run the supervised session until the outbound channel closes (clean
/// shutdown) or the token is rejected (terminal).
///
/// Transient failures (refused connects, mid-session I/O errors, watchdog
/// timeouts, lost keepalive replies) never surface here; each one becomes
/// a CLOSED pair on the status channel, a pause, and a fresh cycle.
pub async fn run(config: ConnectConfig, mut channels: ClientChannels) -> Result<(), ClientError> {
    let mut first_attempt = true;
    loop {
        if !first_attempt {
            tokio::time::sleep(config.retry_pause).await;
        }
        first_attempt = false;

        match run_cycle(&config, &mut channels).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_terminal() => return Err(err),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    pause_secs = config.retry_pause.as_secs_f32(),
                    "session failed, will reconnect"
                );
            }
        }
    }
}

/// One full supervision cycle: CONNECTING → AUTHENTICATING → ACTIVE.
///
/// Both connections are owned by this frame; whichever way it exits, their
/// guards report CLOSED before the supervisor can begin the next cycle, so
/// at most one connection per role ever exists.
async fn run_cycle(config: &ConnectConfig, channels: &mut ClientChannels) -> Result<(), ClientError> {
    let mut read_conn = Connection::open(
        &config.host,
        config.read_port,
        ConnectionRole::Read,
        Some(channels.status.clone()),
    )
    .await?;
    // A failure from here on unwinds past `read_conn`, so a send-side open
    // failure still closes the read socket.
    let mut send_conn = Connection::open(
        &config.host,
        config.send_port,
        ConnectionRole::Send,
        Some(channels.status.clone()),
    )
    .await?;

    // Liveness channel: fed by every member that proves activity, drained
    // by the watchdog. Pings from the handshake are buffered until the
    // watchdog starts.
    let (watchdog_tx, watchdog_rx) = mpsc::unbounded_channel();

    let nickname = auth::authenticate(&mut send_conn, &config.token, &watchdog_tx).await?;
    let _ = channels.status.send(Event::NicknameResolved { nickname });

    // The keepalive pinger reads replies off the send connection's read
    // half while sharing its write half with the sender.
    let (send_reader, send_writer) = send_conn.halves_mut();
    let send_writer = Mutex::new(send_writer);

    tokio::select! {
        res = read_loop(&mut read_conn.reader, &channels.messages, &channels.history, &watchdog_tx) => res,
        res = send_loop(&mut channels.outbound, &send_writer, &watchdog_tx) => res,
        res = keepalive_loop(send_reader, &send_writer, &watchdog_tx, config.keepalive_interval) => res,
        res = watch_for_silence(watchdog_rx, config.liveness_timeout) => res,
    }
}

/// Pull lines off the broadcast feed, stamp them, and offer each one to
/// both the display and history channels.
async fn read_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    messages: &UnboundedSender<ChatMessage>,
    history: &UnboundedSender<ChatMessage>,
    watchdog: &UnboundedSender<LivenessPing>,
) -> Result<(), ClientError> {
    loop {
        let Some(line) = proto::read_line(reader).await? else {
            // Empty read: the read path may be dead, but that verdict
            // belongs to the watchdog. Yield so its timer stays polled.
            tokio::task::yield_now().await;
            continue;
        };
        let message = ChatMessage::now(line);
        let _ = messages.send(message.clone());
        let _ = history.send(message);
        let _ = watchdog.send(LivenessPing::now("new message in chat"));
    }
}

/// Drain the outbound channel onto the send socket.
///
/// The channel closing means every producer hung up: that is the
/// cooperative shutdown signal for the whole client, so this returns `Ok`.
async fn send_loop(
    outbound: &mut UnboundedReceiver<String>,
    writer: &Mutex<&mut OwnedWriteHalf>,
    watchdog: &UnboundedSender<LivenessPing>,
) -> Result<(), ClientError> {
    while let Some(text) = outbound.recv().await {
        let mut writer = writer.lock().await;
        writer.write_all(&proto::encode(&text)).await?;
        writer.flush().await?;
        drop(writer);
        let _ = watchdog.send(LivenessPing::now("message sent"));
    }
    tracing::debug!("outbound channel closed, shutting down");
    Ok(())
}

/// Prove the send path alive: write an empty probe every interval and wait
/// for the server's reply line, feeding the watchdog on both.
async fn keepalive_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &Mutex<&mut OwnedWriteHalf>,
    watchdog: &UnboundedSender<LivenessPing>,
    interval: Duration,
) -> Result<(), ClientError> {
    loop {
        {
            let mut writer = writer.lock().await;
            writer.write_all(&proto::encode("")).await?;
            writer.flush().await?;
        }
        let _ = watchdog.send(LivenessPing::now("ping"));

        let Some(_reply) = proto::read_line(reader).await? else {
            return Err(ClientError::ProbeUnanswered);
        };
        let _ = watchdog.send(LivenessPing::now("pong"));

        tokio::time::sleep(interval).await;
    }
}

/// The sole dead-connection detector: TCP alone never reveals a silently
/// vanished peer, so if nobody proves life within the deadline the whole
/// session is presumed dead.
async fn watch_for_silence(
    mut pings: UnboundedReceiver<LivenessPing>,
    deadline: Duration,
) -> Result<(), ClientError> {
    loop {
        match tokio::time::timeout(deadline, pings.recv()).await {
            Ok(Some(ping)) => {
                tracing::debug!(at = %ping.at, note = ping.note, "connection is alive");
            }
            // Every producer is gone; a sibling is already unwinding.
            Ok(None) => return Ok(()),
            Err(_) => return Err(ClientError::LivenessTimeout(deadline)),
        }
    }
}
