//! Token handshake for the send connection, plus the one-shot account
//! registration flow.

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;

use crate::connection::Connection;
use crate::error::ClientError;
use crate::event::{ConnectionRole, LivenessPing};
use crate::proto;

/// Drive the three-step auth exchange over the send connection and return
/// the nickname the server resolved for the token.
///
/// A `null` or malformed reply is terminal ([`ClientError::InvalidToken`]);
/// a connection dropped mid-exchange is transient
/// ([`ClientError::HandshakeIncomplete`]) and retried by the supervisor.
/// Every step feeds the watchdog. The token itself never reaches the logs.
pub async fn authenticate(
    conn: &mut Connection,
    token: &str,
    watchdog: &UnboundedSender<LivenessPing>,
) -> Result<String, ClientError> {
    let Some(_greeting) = proto::read_line(&mut conn.reader).await? else {
        return Err(ClientError::HandshakeIncomplete);
    };
    feed(watchdog, "prompt before auth");

    conn.writer.write_all(&proto::encode(token)).await?;
    conn.writer.flush().await?;
    feed(watchdog, "auth token sent");

    let Some(reply) = proto::read_line(&mut conn.reader).await? else {
        return Err(ClientError::HandshakeIncomplete);
    };
    feed(watchdog, "auth reply received");

    // `null` means the token was rejected; an unparseable record is treated
    // the same way, since a well-formed server only sends these two shapes.
    let record: Value = serde_json::from_str(&reply).map_err(|_| ClientError::InvalidToken)?;
    let nickname = record
        .get("nickname")
        .and_then(Value::as_str)
        .ok_or(ClientError::InvalidToken)?
        .to_string();
    tracing::info!(%nickname, "authenticated");
    Ok(nickname)
}

/// One-shot account registration: trade a preferred nickname for a fresh
/// personal token (the server's `account_hash`).
///
/// Reuses the low-level connection and codec but runs outside the
/// supervision loop and emits no status events. The empty first reply
/// tells the server to mint a new account instead of looking one up.
pub async fn register(host: &str, port: u16, username: &str) -> Result<String, ClientError> {
    let mut conn = Connection::open(host, port, ConnectionRole::Send, None).await?;

    let Some(_greeting) = proto::read_line(&mut conn.reader).await? else {
        return Err(ClientError::HandshakeIncomplete);
    };
    conn.writer.write_all(&proto::encode("")).await?;
    conn.writer.flush().await?;

    let Some(_nickname_prompt) = proto::read_line(&mut conn.reader).await? else {
        return Err(ClientError::HandshakeIncomplete);
    };
    conn.writer.write_all(&proto::encode(username)).await?;
    conn.writer.flush().await?;

    let Some(reply) = proto::read_line(&mut conn.reader).await? else {
        return Err(ClientError::HandshakeIncomplete);
    };
    let record: Value =
        serde_json::from_str(&reply).map_err(|_| ClientError::RegistrationRejected)?;
    let hash = record
        .get("account_hash")
        .and_then(Value::as_str)
        .ok_or(ClientError::RegistrationRejected)?;
    Ok(hash.to_string())
}

fn feed(watchdog: &UnboundedSender<LivenessPing>, note: &'static str) {
    let _ = watchdog.send(LivenessPing::now(note));
}
