//! Settlement sink that queues transfer instructions for an append-only
//! JSON-lines outbox file.
//!
//! The contract side only pushes onto an unbounded channel; a background
//! task owns the file. The external settlement ledger tails the outbox.

use std::path::PathBuf;

use lumeos_fees::{Settlement, SettlementError, TransferInstruction};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct ChannelSettlement {
    tx: mpsc::UnboundedSender<TransferInstruction>,
}

impl Settlement for ChannelSettlement {
    fn submit(&self, instruction: TransferInstruction) -> Result<(), SettlementError> {
        self.tx
            .send(instruction)
            .map_err(|_| SettlementError::Unavailable("outbox writer has stopped".into()))
    }
}

/// Start the writer task. It finishes, returning the number of lines
/// written, once every [`ChannelSettlement`] clone has been dropped.
pub fn spawn_outbox(path: PathBuf) -> (ChannelSettlement, JoinHandle<anyhow::Result<u64>>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<TransferInstruction>();
    let handle = tokio::spawn(async move {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let mut written = 0u64;
        while let Some(instruction) = rx.recv().await {
            let mut line = serde_json::to_string(&instruction)?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
            written += 1;
            tracing::debug!(
                memo = %instruction.memo,
                quantity = %instruction.quantity,
                "transfer instruction queued"
            );
        }
        file.flush().await?;
        if written > 0 {
            tracing::info!(path = %path.display(), written, "outbox flushed");
        }
        Ok::<u64, anyhow::Error>(written)
    });
    (ChannelSettlement { tx }, handle)
}
