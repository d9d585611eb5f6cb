use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use visitrail_core::VisitrailError;
use visitrail_core::visit::DomainDetail;

use super::App;
use super::format::relative_time;

pub async fn run(app: &App, domain: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let snapshot = app.history.snapshot().await.context("Failed to load history")?;
    let detail = snapshot
        .domain_detail(domain)
        .ok_or_else(|| VisitrailError::not_found("domain", domain))?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&detail)?)?;
    } else {
        write!(out, "{}", render(&detail, Utc::now()))?;
    }

    Ok(())
}

pub fn render(detail: &DomainDetail, now: DateTime<Utc>) -> String {
    let mut text = format!("{}\nTotal visits: {}\n", detail.domain, detail.count);

    text.push_str("\nVisits:\n");
    if detail.visits.is_empty() {
        text.push_str("  (none retained)\n");
    }
    for visit in &detail.visits {
        text.push_str(&format!(
            "  {:<16}  {}\n",
            relative_time(visit.timestamp, now),
            visit.url
        ));
    }

    if !detail.urls.is_empty() {
        text.push_str("\nURLs:\n");
        for url in &detail.urls {
            text.push_str(&format!("  {}\n", url));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{create_test_app, output};
    use chrono::{Duration, TimeZone};
    use visitrail_core::visit::ResolvedVisit;

    #[test]
    fn test_render() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let detail = DomainDetail {
            domain: "example.com".to_string(),
            count: 12,
            visits: vec![
                ResolvedVisit {
                    timestamp: now - Duration::minutes(2),
                    url: "https://example.com/new".to_string(),
                },
                ResolvedVisit {
                    timestamp: now - Duration::days(1),
                    url: "https://example.com/old".to_string(),
                },
            ],
            urls: vec!["https://example.com/old".to_string()],
        };

        let text = render(&detail, now);
        assert_eq!(
            text,
            "example.com\n\
             Total visits: 12\n\
             \n\
             Visits:\n  \
             2 minutes ago     https://example.com/new\n  \
             1 day ago         https://example.com/old\n\
             \n\
             URLs:\n  \
             https://example.com/old\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_domain_is_error() {
        let (app, _temp_dir) = create_test_app();
        let mut buffer = Vec::new();
        let err = run(&app, "missing.com", false, &mut buffer)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.com"));
    }

    #[tokio::test]
    async fn test_run_json() {
        let (app, _temp_dir) = create_test_app();
        app.recorder.record_visit("https://example.com/a").await;

        let mut buffer = Vec::new();
        run(&app, "Example.com", true, &mut buffer).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&output(buffer)).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["visits"][0]["url"], "https://example.com/a");
    }
}
