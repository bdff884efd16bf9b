// src/pipeline.rs
//! The run orchestrator. One strictly linear pass:
//! fetch → merge → normalize → recency → relevance → dedup → gate →
//! extract → normalize confidence → accept → deliver → commit.
//!
//! Ids are committed as seen once they were considered for analysis this run,
//! after delivery has been attempted — regardless of the delivery outcome —
//! so a permanently failing item cannot be reprocessed forever. A crash
//! before commit re-processes on the next run (at-least-once delivery).

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, gauge};

use crate::accept;
use crate::cluster;
use crate::config::AppConfig;
use crate::dedup::{split_new, SeenIdStore};
use crate::extract::ExtractionClient;
use crate::gate::{self, GateReason};
use crate::ingest::{self, types::SourceProvider};
use crate::item::NewsItem;
use crate::notify::NotifierMux;
use crate::relevance;

/// Per-stage counts for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub merged_dupes: usize,
    pub normalized: usize,
    pub recent: usize,
    pub relevant: usize,
    pub new_items: usize,
    pub seen_before: usize,
    pub gate: Option<GateReason>,
    pub candidates: usize,
    pub accepted: usize,
    pub delivered: bool,
    pub committed: usize,
}

pub async fn run_once(
    cfg: &AppConfig,
    providers: &[Box<dyn SourceProvider>],
    extractor: &ExtractionClient,
    notifier: &NotifierMux,
    store: &SeenIdStore,
) -> Result<RunSummary> {
    ingest::ensure_metrics_described();
    let now = Utc::now();
    let mut summary = RunSummary::default();

    // 1) Fetch + within-run merge + normalize.
    let raw = ingest::fetch_all(providers).await;
    summary.fetched = raw.len();
    let (merged, dupes) = ingest::merge_by_id(raw);
    summary.merged_dupes = dupes;

    let items: Vec<NewsItem> = merged
        .into_iter()
        .filter_map(|r| NewsItem::from_raw(r, &cfg.portfolio.tickers))
        .collect();
    summary.normalized = items.len();

    // 2) Recency + relevance.
    let recent: Vec<NewsItem> = items
        .into_iter()
        .filter(|it| relevance::is_recent(it, now, cfg.recency.max_age_hours))
        .collect();
    summary.recent = recent.len();

    let relevant = relevance::filter_relevant(recent, &cfg.relevance, &cfg.portfolio.tickers);
    summary.relevant = relevant.len();
    counter!("pipeline_relevant_total").increment(relevant.len() as u64);

    // 3) Dedup against prior runs.
    let seen = store.load();
    let (new_scored, seen_before) = {
        let (fresh_items, seen_before) =
            split_new(relevant.iter().map(|s| s.item.clone()).collect(), &seen);
        let fresh_ids: std::collections::HashSet<&str> =
            fresh_items.iter().map(|i| i.id.as_str()).collect();
        let fresh: Vec<relevance::ScoredItem> = relevant
            .into_iter()
            .filter(|s| fresh_ids.contains(s.item.id.as_str()))
            .collect();
        (fresh, seen_before)
    };
    summary.new_items = new_scored.len();
    summary.seen_before = seen_before;
    counter!("pipeline_new_total").increment(new_scored.len() as u64);

    if new_scored.is_empty() {
        tracing::info!(seen_before, "nothing new this run");
        gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);
        return Ok(summary);
    }

    // 4) Cluster + gate.
    let clusters = cluster::cluster_items(&new_scored, &cfg.cluster);
    summary.gate = gate::should_analyze(&new_scored, &clusters, &cfg.gate);

    if let Some(reason) = summary.gate {
        tracing::info!(?reason, items = new_scored.len(), "gate passed, extracting ideas");

        // 5) Extract + normalize + accept.
        let output = extractor.extract(&new_scored).await;
        summary.candidates = output.ideas.len();

        let accepted = accept::accept(output.ideas, &cfg.accept);
        summary.accepted = accepted.len();
        counter!("pipeline_accepted_total").increment(accepted.len() as u64);

        // 6) Deliver. Failure is logged and absorbed; the ids still commit.
        if !accepted.is_empty() {
            match notifier.deliver(&accepted).await {
                Ok(()) => summary.delivered = true,
                Err(e) => tracing::warn!(error = ?e, "delivery failed"),
            }
        }
    } else {
        tracing::info!(items = new_scored.len(), "gate closed, no analysis this run");
    }

    // 7) Commit everything considered this run. A write failure is logged but
    // cannot roll back an already-attempted delivery.
    let new_ids: Vec<String> = new_scored.iter().map(|s| s.item.id.clone()).collect();
    summary.committed = new_ids.len();
    if let Err(e) = store.commit(&seen, new_ids) {
        tracing::warn!(error = ?e, "seen-id commit failed");
        summary.committed = 0;
    }

    gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);
    Ok(summary)
}
