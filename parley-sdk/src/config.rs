//! Connection settings for one client run.

use std::time::Duration;

/// Everything the supervisor needs: resolved endpoints, the auth token,
/// and the timing tunables. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Chat server hostname.
    pub host: String,
    /// Port of the broadcast feed.
    pub read_port: u16,
    /// Port of the authenticated submission socket.
    pub send_port: u16,
    /// Personal auth token. Opaque; never logged, never put in events.
    pub token: String,
    /// Longest the session may go without any proof of life before the
    /// watchdog presumes it dead.
    pub liveness_timeout: Duration,
    /// How often the keepalive pinger probes the send path.
    pub keepalive_interval: Duration,
    /// Pause between a failed cycle and the next attempt. The very first
    /// attempt never waits.
    pub retry_pause: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            read_port: 5000,
            send_port: 5050,
            token: String::new(),
            liveness_timeout: Duration::from_secs(1),
            keepalive_interval: Duration::from_millis(500),
            retry_pause: Duration::from_secs(3),
        }
    }
}
