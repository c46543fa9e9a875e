//! History persistence collaborator: drains the history channel into an
//! append-only text file.
//!
//! The client core only guarantees that every accepted message is offered
//! on the history channel; durability is this writer's problem.

use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::message::ChatMessage;

/// Append every history-channel message to `path`, one display-formatted
/// line each. Returns when the channel closes.
pub async fn save_messages(
    path: impl AsRef<Path>,
    mut history: UnboundedReceiver<ChatMessage>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .await?;
    while let Some(message) = history.recv().await {
        file.write_all(format!("{message}\n").as_bytes()).await?;
        file.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn appends_one_line_per_message() {
        let path = std::env::temp_dir().join(format!(
            "parley-history-test-{}.txt",
            std::process::id()
        ));
        let _ = tokio::fs::remove_file(&path).await;

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ChatMessage::now("first")).unwrap();
        tx.send(ChatMessage::now("second")).unwrap();
        drop(tx);
        save_messages(&path, rx).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("first"));
        assert!(lines[1].starts_with('[') && lines[1].ends_with("second"));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
