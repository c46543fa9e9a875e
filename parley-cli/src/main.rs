//! Terminal front end for the parley chat client.
//!
//! Thin glue only: resolves configuration, wires up the channels, prints
//! the feed to stdout, forwards stdin lines to the outbound channel, and
//! spawns the history writer. All supervision lives in parley-sdk.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use parley_sdk::{ClientChannels, ClientError, ConnectConfig, Event, auth, client, history};

mod settings;

#[derive(Parser, Debug)]
#[command(name = "parley", about = "Resilient client for line-oriented chat")]
pub struct Cli {
    /// Chat server hostname.
    #[arg(long, env = "PARLEY_HOST")]
    pub host: Option<String>,

    /// Port of the broadcast feed.
    #[arg(long, env = "PARLEY_READ_PORT")]
    pub read_port: Option<u16>,

    /// Port for authenticated message submission.
    #[arg(long, env = "PARLEY_SEND_PORT")]
    pub send_port: Option<u16>,

    /// Personal auth token.
    #[arg(long, env = "PARLEY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Chat history file.
    #[arg(long, env = "PARLEY_HISTORY")]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new account and print its personal token.
    Register {
        /// Preferred nickname.
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("parley_cli=info".parse()?)
        .add_directive("parley_sdk=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let file = settings::FileConfig::load();
    let resolved = settings::Resolved::merge(&cli, &file);

    if let Some(Command::Register { name }) = &cli.command {
        let hash = auth::register(&resolved.host, resolved.send_port, name).await?;
        println!("Your personal token: {hash}");
        println!("Save it as PARLEY_TOKEN or in ~/.config/parley/config.toml");
        return Ok(());
    }

    let Some(token) = resolved.token.clone() else {
        anyhow::bail!("no token configured; pass --token, set PARLEY_TOKEN, or run `parley register`");
    };

    let config = ConnectConfig {
        host: resolved.host.clone(),
        read_port: resolved.read_port,
        send_port: resolved.send_port,
        token,
        ..ConnectConfig::default()
    };
    tracing::info!(host = %config.host, read_port = config.read_port, send_port = config.send_port, "starting");

    let (messages_tx, mut messages_rx) = mpsc::unbounded_channel();
    let (history_tx, history_rx) = mpsc::unbounded_channel();
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    // Persistence collaborator.
    let history_path = resolved.history.clone();
    tokio::spawn(async move {
        if let Err(e) = history::save_messages(&history_path, history_rx).await {
            tracing::warn!(error = %e, path = %history_path.display(), "history writer stopped");
        }
    });

    // Display collaborator: the feed goes to stdout, state changes to the log.
    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = messages_rx.recv() => match msg {
                    Some(m) => println!("{m}"),
                    None => break,
                },
                event = status_rx.recv() => match event {
                    Some(Event::NicknameResolved { nickname }) => {
                        tracing::info!(%nickname, "logged in");
                    }
                    Some(Event::Connection { role, phase }) => {
                        tracing::info!(%role, %phase, "connection state");
                    }
                    None => break,
                },
            }
        }
    });

    // Stdin lines become outbound messages; closing stdin closes the
    // outbound channel, which asks the client for a clean shutdown.
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if outbound_tx.send(line).is_err() {
                break;
            }
        }
    });

    let channels = ClientChannels {
        messages: messages_tx,
        history: history_tx,
        status: status_tx,
        outbound: outbound_rx,
    };

    tokio::select! {
        result = client::run(config, channels) => match result {
            Ok(()) => Ok(()),
            Err(ClientError::InvalidToken) => {
                eprintln!("The server did not recognize your token. Check it, or run `parley register`.");
                std::process::exit(1);
            }
            Err(e) => Err(e.into()),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    }
}
