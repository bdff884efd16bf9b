// tests/pipeline_e2e.rs
//
// Full-pipeline scenario: 10 fetched records, 4 relevant and recent, 3 new
// (1 already seen), gate passes via cluster corroboration, extraction yields
// two candidates on different confidence scales, acceptance splits them
// held/not-held, delivery is captured, and the seen set grows.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use tradewire::accept::AcceptedIdea;
use tradewire::config::AppConfig;
use tradewire::dedup::SeenIdStore;
use tradewire::extract::{ExtractionClient, ModelCaller, ModelError};
use tradewire::gate::GateReason;
use tradewire::ingest::types::{RawRecord, SourceProvider};
use tradewire::notify::{Notifier, NotifierMux};
use tradewire::pipeline;

const CONFIG: &str = r#"
    [relevance]
    keywords = ["chipmaker", "merger"]
    signal_terms = ["supply shock"]
    min_score = 2

    [extract]
    models = ["mock-model"]
    max_attempts = 2
    backoff_secs = 0

    [accept]
    portfolio_threshold = 70.0
    discovery_threshold = 90.0
"#;

struct FixtureProvider;

#[async_trait]
impl SourceProvider for FixtureProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawRecord>> {
        let now = Utc::now().timestamp();
        let fresh = now - 3_600;
        let stale = now - 48 * 3_600;

        let rec = |id: &str, title: &str, ts: i64| RawRecord {
            id: Some(id.to_string()),
            title: title.to_string(),
            summary: None,
            link: None,
            published_at: Some(ts),
            source: "Wire".to_string(),
        };

        Ok(vec![
            // Three sources report the same story (cluster of 3, score 3 each).
            rec("wire-1", "Chipmaker warns of supply shock in Q3", fresh),
            rec("wire-2", "Chipmaker warns of supply shock in Q3!", fresh),
            rec("wire-3", "Chipmaker warns of supply shock in Q3...", fresh),
            // Relevant but already seen in a prior run.
            rec("wire-seen-1", "Merger talks between chipmaker giants intensify", fresh),
            // Relevant but too old.
            rec("wire-old-1", "Chipmaker flags supply shock for next year", stale),
            rec("wire-old-2", "Merger rumors swirl around chipmaker sector", stale),
            // Noise.
            rec("wire-n1", "Local sports team wins championship game tonight", fresh),
            rec("wire-n2", "New cafe opens downtown to long queues", fresh),
            rec("wire-n3", "Weather stays sunny through the weekend", fresh),
            rec("wire-n4", "Museum extends opening hours for summer", fresh),
        ])
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

/// Returns two candidates: a held-position sell on a 0–1 scale and a new
/// discovery on a broken >100 scale. Wrapped in a code fence on purpose.
struct FixtureCaller;

#[async_trait]
impl ModelCaller for FixtureCaller {
    async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, ModelError> {
        Ok(r#"```json
{"ideas": [
  {"name": "AAPL", "type": "stock", "signal": "SELL",
   "rationale": "supply shock hits suppliers", "confidence": 0.9,
   "affectsHeldPosition": true},
  {"name": "NVDA", "type": "stock", "signal": "BUY",
   "rationale": "competitor gains", "confidence": 120,
   "affectsHeldPosition": false}
]}
```"#
            .to_string())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[derive(Clone, Default)]
struct CaptureNotifier {
    deliveries: Arc<Mutex<Vec<Vec<AcceptedIdea>>>>,
}

#[async_trait]
impl Notifier for CaptureNotifier {
    async fn deliver(&self, ideas: &[AcceptedIdea]) -> Result<()> {
        self.deliveries.lock().unwrap().push(ideas.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

#[tokio::test]
async fn end_to_end_run_accepts_and_commits() {
    let cfg = AppConfig::from_toml_str(CONFIG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = SeenIdStore::new(dir.path().join("seen.json"));

    // One id was processed by an earlier run.
    store
        .commit(&HashSet::new(), ["wire-seen-1".to_string()])
        .unwrap();

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(FixtureProvider)];
    let extractor = ExtractionClient::new(Box::new(FixtureCaller), cfg.extract.clone());
    let capture = CaptureNotifier::default();
    let mut mux = NotifierMux::new();
    mux.push(Box::new(capture.clone()));

    let summary = pipeline::run_once(&cfg, &providers, &extractor, &mux, &store)
        .await
        .unwrap();

    assert_eq!(summary.fetched, 10);
    assert_eq!(summary.recent, 8);
    assert_eq!(summary.relevant, 4);
    assert_eq!(summary.new_items, 3);
    assert_eq!(summary.seen_before, 1);
    assert_eq!(summary.gate, Some(GateReason::Corroboration));
    assert_eq!(summary.candidates, 2);

    // 0.9 → 90 clears the held-position bar of 70; 120 → 1.2 misses the
    // discovery bar of 90. Exactly one accepted idea, in extractor order.
    assert_eq!(summary.accepted, 1);
    let deliveries = capture.deliveries.lock().unwrap().clone();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].len(), 1);
    assert_eq!(deliveries[0][0].name, "AAPL");
    assert_eq!(deliveries[0][0].confidence, 90.0);
    assert!(summary.delivered);

    // All three new ids committed, on top of the preseeded one.
    assert_eq!(summary.committed, 3);
    let seen = store.load();
    assert_eq!(seen.len(), 4);
    for id in ["wire-1", "wire-2", "wire-3", "wire-seen-1"] {
        assert!(seen.contains(id), "missing {id}");
    }
}

#[tokio::test]
async fn second_run_is_quiet_and_never_redelivers() {
    let cfg = AppConfig::from_toml_str(CONFIG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = SeenIdStore::new(dir.path().join("seen.json"));

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(FixtureProvider)];
    let extractor = ExtractionClient::new(Box::new(FixtureCaller), cfg.extract.clone());
    let capture = CaptureNotifier::default();
    let mut mux = NotifierMux::new();
    mux.push(Box::new(capture.clone()));

    let first = pipeline::run_once(&cfg, &providers, &extractor, &mux, &store)
        .await
        .unwrap();
    assert!(first.new_items > 0);
    let seen_after_first = store.load();

    let second = pipeline::run_once(&cfg, &providers, &extractor, &mux, &store)
        .await
        .unwrap();
    assert_eq!(second.new_items, 0);
    assert_eq!(second.gate, None);
    assert_eq!(second.accepted, 0);

    // No double delivery; seen set only ever grows.
    assert_eq!(capture.deliveries.lock().unwrap().len(), 1);
    let seen_after_second = store.load();
    assert!(seen_after_second.is_superset(&seen_after_first));
}
