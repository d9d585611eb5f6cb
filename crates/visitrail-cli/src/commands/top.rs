use std::io::Write;

use anyhow::{Context, Result};
use serde_json::json;
use visitrail_core::visit::DomainRecord;

use super::App;
use super::format::{BAR_WIDTH, bar, truncate};

const LABEL_WIDTH: usize = 25;

pub async fn run(app: &App, limit: Option<usize>, json: bool, out: &mut impl Write) -> Result<()> {
    let snapshot = app.history.snapshot().await.context("Failed to load history")?;
    let sites = snapshot.top_sites(limit.unwrap_or(app.config.top_sites_limit));

    if json {
        let rows: Vec<_> = sites
            .iter()
            .map(|site| json!({ "domain": site.domain, "count": site.count }))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(out, "{}", render(&sites))?;
    }

    Ok(())
}

/// Horizontal bar chart; the leader's bar is full width.
pub fn render(sites: &[&DomainRecord]) -> String {
    if sites.is_empty() {
        return "No visits recorded yet\n".to_string();
    }

    let max = sites.iter().map(|site| site.count).max().unwrap_or(0);
    sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            format!(
                "{:>2}. {:<width$}  {:<bar_width$}  {}\n",
                i + 1,
                truncate(&site.domain, LABEL_WIDTH),
                bar(site.count, max, BAR_WIDTH),
                site.count,
                width = LABEL_WIDTH,
                bar_width = BAR_WIDTH,
            )
        })
        .collect()
}
