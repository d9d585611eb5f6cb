//! Navigation observer over a line stream.
//!
//! Lines are queued on a bounded channel and drained by one recording task,
//! so a slow store applies backpressure to the reader instead of piling up
//! concurrent read-modify-write cycles.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use visitrail_core::visit::RecordOutcome;

use super::App;

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub recorded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn run<R>(app: &App, input: R, out: &mut impl Write) -> Result<WatchSummary>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::channel::<String>(QUEUE_CAPACITY);

    let recorder = app.recorder.clone();
    let worker = tokio::spawn(async move {
        let mut summary = WatchSummary::default();
        while let Some(url) = rx.recv().await {
            match recorder.record_visit(&url).await {
                RecordOutcome::Recorded { .. } => summary.recorded += 1,
                RecordOutcome::Skipped { .. } => summary.skipped += 1,
                RecordOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    });

    let read_result = forward_lines(input, &tx).await;
    drop(tx);

    let summary = worker.await?;
    writeln!(
        out,
        "Recorded {} visits ({} skipped, {} failed)",
        summary.recorded, summary.skipped, summary.failed
    )?;

    read_result?;
    Ok(summary)
}

/// Sends each non-blank line to the recording task. Bytes that are not
/// UTF-8 are replaced, so a bad line is classified and skipped rather than
/// ending the stream.
async fn forward_lines<R>(mut input: R, tx: &mpsc::Sender<String>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = match input.read_until(b'\n', &mut buf).await {
            Ok(read) => read,
            Err(e) => {
                tracing::error!("Failed to read navigation input: {}", e);
                return Err(e.into());
            }
        };
        if read == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if tx.send(url.to_string()).await.is_err() {
            tracing::warn!("Recording task stopped; no longer reading input");
            return Ok(());
        }
    }
}
