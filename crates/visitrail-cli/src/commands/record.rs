use std::io::Write;

use anyhow::Result;
use visitrail_core::visit::RecordOutcome;

use super::App;

pub async fn run(app: &App, urls: &[String], out: &mut impl Write) -> Result<()> {
    let mut failed = 0;

    for url in urls {
        match app.recorder.record_visit(url).await {
            RecordOutcome::Recorded { domain, count } => {
                writeln!(out, "Recorded {} (total: {})", domain, count)?;
            }
            RecordOutcome::Skipped { reason } => {
                writeln!(out, "Skipped {} ({})", url, reason)?;
            }
            RecordOutcome::Failed { message } => {
                failed += 1;
                writeln!(out, "Failed {}: {}", url, message)?;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} visits could not be recorded", failed, urls.len());
    }

    Ok(())
}
