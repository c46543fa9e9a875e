//! Auth handshake and registration flows against scripted mock servers.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use parley_sdk::ClientError;
use parley_sdk::auth;
use parley_sdk::connection::Connection;
use parley_sdk::event::ConnectionRole;

/// Accept exactly one connection and run `script` over it. The handle is
/// awaited at the end of each test so script-side assertions propagate.
async fn one_shot_server<F, Fut>(script: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        script(stream).await;
    });
    (port, handle)
}

#[tokio::test]
async fn handshake_resolves_nickname() {
    let (port, server) = one_shot_server(|stream| async move {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"Hello! Enter your token:\n").await.unwrap();
        // The token arrives as one line plus the blank terminator line.
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("secret-token"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        write.write_all(b"{\"nickname\": \"Bob\"}\n").await.unwrap();
    })
    .await;

    let (watchdog_tx, mut watchdog_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::open("127.0.0.1", port, ConnectionRole::Send, None)
        .await
        .unwrap();
    let nickname = auth::authenticate(&mut conn, "secret-token", &watchdog_tx)
        .await
        .unwrap();

    assert_eq!(nickname, "Bob");
    // Every handshake step proved the connection alive.
    assert!(watchdog_rx.try_recv().is_ok());
    server.await.unwrap();
}

#[tokio::test]
async fn null_reply_is_terminal_invalid_token() {
    let (port, server) = one_shot_server(|stream| async move {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"Hello! Enter your token:\n").await.unwrap();
        lines.next_line().await.unwrap();
        lines.next_line().await.unwrap();
        write.write_all(b"null\n").await.unwrap();
    })
    .await;

    let (watchdog_tx, _watchdog_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::open("127.0.0.1", port, ConnectionRole::Send, None)
        .await
        .unwrap();
    let err = auth::authenticate(&mut conn, "bogus", &watchdog_tx)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidToken));
    assert!(err.is_terminal());
    server.await.unwrap();
}

#[tokio::test]
async fn dropped_connection_mid_handshake_is_transient() {
    // Server hangs up without even a greeting.
    let (port, server) = one_shot_server(|stream| async move {
        drop(stream);
    })
    .await;

    let (watchdog_tx, _watchdog_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::open("127.0.0.1", port, ConnectionRole::Send, None)
        .await
        .unwrap();
    let err = auth::authenticate(&mut conn, "secret-token", &watchdog_tx)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::HandshakeIncomplete));
    assert!(!err.is_terminal());
    server.await.unwrap();
}

#[tokio::test]
async fn registration_returns_account_hash() {
    let (port, server) = one_shot_server(|stream| async move {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write
            .write_all(b"Hello! Enter your token, or leave it empty for a new account:\n")
            .await
            .unwrap();
        // Empty reply requests a fresh account.
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        write.write_all(b"Enter your preferred nickname:\n").await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("Bob"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        write
            .write_all(b"{\"nickname\": \"Bob\", \"account_hash\": \"a1b2c3\"}\n")
            .await
            .unwrap();
    })
    .await;

    let hash = auth::register("127.0.0.1", port, "Bob").await.unwrap();
    assert_eq!(hash, "a1b2c3");
    server.await.unwrap();
}

#[tokio::test]
async fn registration_without_hash_is_rejected() {
    let (port, server) = one_shot_server(|stream| async move {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"Hello!\n").await.unwrap();
        lines.next_line().await.unwrap();
        lines.next_line().await.unwrap();
        write.write_all(b"Enter your preferred nickname:\n").await.unwrap();
        lines.next_line().await.unwrap();
        lines.next_line().await.unwrap();
        write.write_all(b"null\n").await.unwrap();
    })
    .await;

    let err = auth::register("127.0.0.1", port, "Bob").await.unwrap_err();
    assert!(matches!(err, ClientError::RegistrationRejected));
    server.await.unwrap();
}
