use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use visitrail_core::visit::{DomainRecord, HistoryFilter};

use super::App;
use super::format::{display_text, relative_time, truncate};

const URL_WIDTH: usize = 40;

pub async fn run(
    app: &App,
    domain: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let filter = match domain {
        Some(domain) => HistoryFilter::current_domain(domain),
        None => HistoryFilter::All,
    };

    let snapshot = app.history.snapshot().await.context("Failed to load history")?;
    let items = snapshot.history_view(&filter);

    if json {
        let rows: Vec<_> = items
            .iter()
            .map(|record| {
                json!({
                    "domain": record.domain,
                    "count": record.count,
                    "lastVisit": record.effective_last_visit(),
                    "url": record.display_url(),
                })
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(out, "{}", render(&items, Utc::now()))?;
    }

    Ok(())
}

pub fn render(items: &[&DomainRecord], now: DateTime<Utc>) -> String {
    if items.is_empty() {
        return "No visit history yet\n".to_string();
    }

    items
        .iter()
        .map(|record| {
            let when = record
                .effective_last_visit()
                .map(|timestamp| relative_time(timestamp, now))
                .unwrap_or_else(|| "unknown".to_string());
            let visits = if record.count == 1 {
                "1 visit".to_string()
            } else {
                format!("{} visits", record.count)
            };
            format!(
                "{:<width$}  {:>10}  {}\n",
                truncate(&display_text(record), URL_WIDTH),
                visits,
                when,
                width = URL_WIDTH,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use visitrail_core::visit::VisitEntry;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn record(domain: &str, count: u64, url: &str, ago: Duration) -> DomainRecord {
        let mut record = DomainRecord::new(domain);
        record.count = count;
        record.last_visit = Some(now() - ago);
        record.visits.push(VisitEntry::full(now() - ago, url));
        record
    }

    #[test]
    fn test_render_rows() {
        let recent = record("a.com", 3, "https://a.com/page", Duration::minutes(5));
        let older = record("b.com", 1, "https://b.com", Duration::hours(2));

        let text = render(&[&recent, &older], now());
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].starts_with("a.com/page "));
        assert!(lines[0].contains("3 visits"));
        assert!(lines[0].ends_with("5 minutes ago"));
        assert!(lines[1].starts_with("b.com "));
        assert!(lines[1].contains("1 visit "));
        assert!(lines[1].ends_with("2 hours ago"));
    }

    #[test]
    fn test_render_truncates_long_urls() {
        let long = record(
            "example.com",
            1,
            "https://example.com/a/very/long/path/that/keeps/going/on",
            Duration::seconds(5),
        );
        let text = render(&[&long], now());
        assert!(text.starts_with("example.com/a/very/long/path/that/kee..."));
        assert!(text.trim_end().ends_with("just now"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], now()), "No visit history yet\n");
    }
}
