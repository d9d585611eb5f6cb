use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use visitrail_core::config::TrackerConfig;
use visitrail_core::visit::{
    HistoryFilter, HistoryService, KeyValueStore, RecordOutcome, VisitRecorder,
    VisitStoreRepository,
};
use visitrail_infrastructure::{JsonFileKeyValueStore, KeyValueVisitRepository};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap() + Duration::seconds(seconds)
}

struct Harness {
    _temp_dir: TempDir,
    kv: JsonFileKeyValueStore,
    repository: Arc<KeyValueVisitRepository>,
    recorder: VisitRecorder,
    history: HistoryService,
}

fn create_harness() -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let kv = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));
    let config = TrackerConfig::default();
    let repository = Arc::new(KeyValueVisitRepository::from_config(
        Arc::new(kv.clone()),
        &config,
    ));
    let recorder = VisitRecorder::new(repository.clone(), &config);
    let history = HistoryService::new(repository.clone());

    Harness {
        _temp_dir: temp_dir,
        kv,
        repository,
        recorder,
        history,
    }
}

#[tokio::test]
async fn test_recorded_visits_show_up_in_every_view() {
    let h = create_harness();

    for (i, url) in [
        "https://news.example.com/a",
        "https://docs.rs/serde",
        "https://news.example.com/b",
        "chrome://extensions",
        "https://news.example.com/a",
    ]
    .iter()
    .enumerate()
    {
        h.recorder.record_visit_at(url, at(i as i64)).await;
    }

    let snapshot = h.history.snapshot().await.unwrap();

    let top: Vec<_> = snapshot
        .top_sites(10)
        .iter()
        .map(|r| (r.domain.clone(), r.count))
        .collect();
    assert_eq!(
        top,
        vec![
            ("news.example.com".to_string(), 3),
            ("docs.rs".to_string(), 1)
        ]
    );

    let history: Vec<_> = snapshot
        .history_view(&HistoryFilter::All)
        .iter()
        .map(|r| r.domain.clone())
        .collect();
    assert_eq!(history, vec!["news.example.com", "docs.rs"]);

    let detail = snapshot.domain_detail("news.example.com").unwrap();
    let urls: Vec<_> = detail.visits.iter().map(|v| v.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://news.example.com/a",
            "https://news.example.com/b",
            "https://news.example.com/a"
        ]
    );
    assert_eq!(
        detail.urls,
        vec!["https://news.example.com/a", "https://news.example.com/b"]
    );
}

#[tokio::test]
async fn test_persisted_layout() {
    let h = create_harness();
    h.recorder
        .record_visit_at("https://example.com/page?x=1", at(0))
        .await;

    let raw = h.kv.get("visitHistory").await.unwrap().unwrap();
    assert_eq!(
        raw,
        json!({
            "example.com": {
                "count": 1,
                "lastVisit": "2025-06-01T08:00:00.000Z",
                "visits": [
                    { "timestamp": "2025-06-01T08:00:00.000Z", "url": "https://example.com/page?x=1" }
                ],
                "urls": ["https://example.com/page?x=1"]
            }
        })
    );
}

#[tokio::test]
async fn test_legacy_history_keeps_working() {
    let h = create_harness();
    h.kv
        .set(
            "visitHistory",
            json!({
                "old.example.com": {
                    "count": 40,
                    "lastVisit": "2025-05-01T10:00:00.000Z",
                    "visits": [
                        "2025-05-01T09:00:00.000Z",
                        "2025-05-01T10:00:00.000Z"
                    ],
                    "urls": ["https://old.example.com", "https://old.example.com/post/7"]
                },
                "ancient.example.com": {
                    "count": 2,
                    "lastVisit": "2025-04-01T10:00:00.000Z",
                    "visits": ["2025-04-01T09:00:00.000Z", "2025-04-01T10:00:00.000Z"]
                }
            }),
        )
        .await
        .unwrap();

    let outcome = h
        .recorder
        .record_visit_at("https://old.example.com/post/8", at(0))
        .await;
    assert_eq!(
        outcome,
        RecordOutcome::Recorded {
            domain: "old.example.com".to_string(),
            count: 41
        }
    );

    let snapshot = h.history.snapshot().await.unwrap();
    let detail = snapshot.domain_detail("old.example.com").unwrap();
    let urls: Vec<_> = detail.visits.iter().map(|v| v.url.as_str()).collect();
    // Newest entry has its own URL; legacy ones fall back to the newest
    // non-bare URL known for the domain
    assert_eq!(
        urls,
        vec![
            "https://old.example.com/post/8",
            "https://old.example.com/post/8",
            "https://old.example.com/post/8"
        ]
    );

    let ancient = snapshot.domain_detail("ancient.example.com").unwrap();
    assert!(
        ancient
            .visits
            .iter()
            .all(|v| v.url == "https://ancient.example.com")
    );

    // Legacy entries are written back as bare strings
    let raw = h.kv.get("visitHistory").await.unwrap().unwrap();
    assert_eq!(
        raw["old.example.com"]["visits"][0],
        json!("2025-05-01T09:00:00.000Z")
    );
    assert_eq!(
        raw["ancient.example.com"],
        json!({
            "count": 2,
            "lastVisit": "2025-04-01T10:00:00.000Z",
            "visits": ["2025-04-01T09:00:00.000Z", "2025-04-01T10:00:00.000Z"],
            "urls": []
        })
    );
}

#[tokio::test]
async fn test_unusual_records_survive_other_writes() {
    let h = create_harness();
    h.kv
        .set(
            "visitHistory",
            json!({
                "kept.com": {
                    "count": 7,
                    "lastVisit": "2025-05-01T10:00:00.000Z",
                    "visits": null,
                    "urls": null
                },
                "odd.com": "not a record",
                "miscounted.com": { "count": "many", "visits": [] }
            }),
        )
        .await
        .unwrap();

    let outcome = h
        .recorder
        .record_visit_at("https://other.com/", at(0))
        .await;
    assert_eq!(
        outcome,
        RecordOutcome::Recorded {
            domain: "other.com".to_string(),
            count: 1
        }
    );

    let raw = h.kv.get("visitHistory").await.unwrap().unwrap();
    assert_eq!(raw["kept.com"]["count"], json!(7));
    assert_eq!(
        raw["kept.com"]["lastVisit"],
        json!("2025-05-01T10:00:00.000Z")
    );
    assert_eq!(raw["odd.com"], json!("not a record"));
    assert_eq!(
        raw["miscounted.com"],
        json!({ "count": "many", "visits": [] })
    );
    assert_eq!(raw["other.com"]["count"], json!(1));

    let snapshot = h.history.snapshot().await.unwrap();
    let top: Vec<_> = snapshot
        .top_sites(10)
        .iter()
        .map(|r| (r.domain.clone(), r.count))
        .collect();
    assert_eq!(
        top,
        vec![("kept.com".to_string(), 7), ("other.com".to_string(), 1)]
    );

    // Visiting an unreadable domain starts it over
    h.recorder
        .record_visit_at("https://miscounted.com/", at(1))
        .await;
    let raw = h.kv.get("visitHistory").await.unwrap().unwrap();
    assert_eq!(raw["miscounted.com"]["count"], json!(1));
    assert_eq!(raw["odd.com"], json!("not a record"));
}

#[tokio::test]
async fn test_clear_all_then_reload() {
    let h = create_harness();
    h.recorder.record_visit_at("https://a.com/", at(0)).await;
    h.recorder.record_visit_at("https://b.com/", at(1)).await;

    let before = h.repository.load().await.unwrap();
    let reloaded = h.repository.load().await.unwrap();
    assert_eq!(before, reloaded);

    h.recorder.clear_all().await.unwrap();

    let snapshot = h.history.snapshot().await.unwrap();
    assert!(snapshot.is_empty());
    assert!(snapshot.top_sites(10).is_empty());
    assert_eq!(h.kv.get("visitHistory").await.unwrap(), Some(json!({})));

    h.recorder.record_visit_at("https://a.com/", at(2)).await;
    let snapshot = h.history.snapshot().await.unwrap();
    assert_eq!(snapshot.store().get("a.com").unwrap().count, 1);
}

#[tokio::test]
async fn test_corrupt_document_is_reported_not_recorded() {
    let h = create_harness();
    std::fs::write(h.kv.path(), "{ definitely not json").unwrap();

    let outcome = h.recorder.record_visit("https://example.com/").await;
    assert!(matches!(outcome, RecordOutcome::Failed { .. }));
    assert!(h.history.snapshot().await.is_err());

    // The unreadable document is left untouched
    assert_eq!(
        std::fs::read_to_string(h.kv.path()).unwrap(),
        "{ definitely not json"
    );
}

#[tokio::test]
async fn test_detail_is_capped_at_retained_visits() {
    let h = create_harness();
    for i in 0..120 {
        h.recorder
            .record_visit_at(&format!("https://example.com/{}", i), at(i))
            .await;
    }

    let snapshot = h.history.snapshot().await.unwrap();
    let detail = snapshot.domain_detail("example.com").unwrap();
    assert_eq!(detail.count, 120);
    assert_eq!(detail.visits.len(), 100);
    assert_eq!(detail.urls.len(), 50);
    assert_eq!(detail.visits[0].url, "https://example.com/119");
    assert_eq!(detail.visits[99].url, "https://example.com/20");
}
