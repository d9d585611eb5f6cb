use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use super::App;

/// Clears the whole history. Without `yes`, asks on `input` first.
///
/// Returns whether the history was cleared.
pub async fn run(
    app: &App,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    if !yes && !confirm(input, out)? {
        writeln!(out, "Aborted")?;
        return Ok(false);
    }

    app.recorder
        .clear_all()
        .await
        .context("Failed to clear history")?;
    writeln!(out, "Visit history cleared")?;
    Ok(true)
}

fn confirm(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "Delete the entire visit history? This cannot be undone. [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
