// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::{AppConfig, SourceKind};
use crate::ingest::providers::{rss::RssProvider, social::SocialApiProvider};
use crate::ingest::types::{RawRecord, SourceProvider};
use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series carry descriptions when a
/// recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_records_total", "Raw records fetched from providers.");
        describe_counter!(
            "ingest_merged_dupes_total",
            "Records dropped by within-run id merge."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("pipeline_relevant_total", "Items passing recency + relevance.");
        describe_counter!("pipeline_new_total", "Relevant items not seen in prior runs.");
        describe_counter!("pipeline_accepted_total", "Ideas passing the acceptance filter.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Normalize text: decode HTML entities, strip tags, fold smart quotes,
/// collapse whitespace, trim, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}

/// Fetch from all providers sequentially. A failing provider is logged and
/// skipped; the run continues with whatever was obtained.
pub async fn fetch_all(providers: &[Box<dyn SourceProvider>]) -> Vec<RawRecord> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                counter!("ingest_records_total").increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }
    raw
}

/// Within-run merge: when multiple adapters report the same id, the first
/// occurrence wins. Returns (merged, duplicate_count). Ids are compared after
/// normalization fallback, so records without any id are never merged here.
pub fn merge_by_id(
    records: Vec<RawRecord>,
) -> (Vec<RawRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    let mut dupes = 0usize;
    for r in records {
        let key = r
            .id
            .clone()
            .or_else(|| r.link.clone())
            .filter(|k| !k.trim().is_empty());
        if let Some(k) = key {
            if !seen.insert(k) {
                dupes += 1;
                continue;
            }
        }
        out.push(r);
    }
    if dupes > 0 {
        counter!("ingest_merged_dupes_total").increment(dupes as u64);
    }
    (out, dupes)
}

/// Build the provider list from configuration.
pub fn build_providers(cfg: &AppConfig) -> Result<Vec<Box<dyn SourceProvider>>> {
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(cfg.sources.len());
    for s in &cfg.sources {
        match s.kind {
            SourceKind::Rss => {
                out.push(Box::new(RssProvider::from_url(&s.name, &s.url)));
            }
            SourceKind::SocialApi => {
                out.push(Box::new(SocialApiProvider::from_config(s)?));
            }
        }
    }
    Ok(out)
}
