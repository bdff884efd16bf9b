// src/relevance.rs
//! Recency filter and relevance scorer. Scoring is a deterministic, pure
//! function over the item text and the configured term tiers.

use chrono::{DateTime, Duration, Utc};

use crate::config::RelevanceCfg;
use crate::item::NewsItem;

/// A NewsItem with its transient relevance score for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredItem {
    pub item: NewsItem,
    pub score: u32,
}

/// Items older than the window are dropped. Items without a timestamp pass
/// (sources that omit `pubDate` must not blind the pipeline).
pub fn is_recent(item: &NewsItem, now: DateTime<Utc>, max_age_hours: i64) -> bool {
    match item.published_at {
        Some(ts) => now.signed_duration_since(ts) <= Duration::hours(max_age_hours),
        None => true,
    }
}

/// Integer relevance score:
/// keyword hits + weighted signal terms + weighted strong triggers
/// + a bonus for substantive titles − a penalty per press-release marker.
/// Held-portfolio tickers count as keywords. Saturates at zero.
pub fn score(item: &NewsItem, cfg: &RelevanceCfg, portfolio: &[String]) -> u32 {
    let haystack = item.search_text();

    let mut total: u32 = 0;
    for kw in &cfg.keywords {
        if contains_term(&haystack, kw) {
            total += cfg.keyword_weight;
        }
    }
    for ticker in portfolio {
        if contains_term(&haystack, ticker) {
            total += cfg.keyword_weight;
        }
    }
    for term in &cfg.signal_terms {
        if contains_term(&haystack, term) {
            total += cfg.signal_weight;
        }
    }
    for trigger in &cfg.strong_triggers {
        if contains_term(&haystack, trigger) {
            total += cfg.trigger_weight;
        }
    }
    if item.title.chars().count() >= cfg.min_title_len {
        total += cfg.title_bonus;
    }
    for marker in &cfg.press_release_markers {
        if contains_term(&haystack, marker) {
            total = total.saturating_sub(cfg.press_release_penalty);
        }
    }
    total
}

/// Keep items with `score >= min_score`, attaching the score.
pub fn filter_relevant(
    items: Vec<NewsItem>,
    cfg: &RelevanceCfg,
    portfolio: &[String],
) -> Vec<ScoredItem> {
    items
        .into_iter()
        .filter_map(|item| {
            let s = score(&item, cfg, portfolio);
            (s >= cfg.min_score).then_some(ScoredItem { item, score: s })
        })
        .collect()
}

fn contains_term(haystack: &str, term: &str) -> bool {
    let t = term.trim().to_lowercase();
    !t.is_empty() && haystack.contains(&t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawRecord;

    fn cfg() -> RelevanceCfg {
        RelevanceCfg {
            keywords: vec!["fed".into(), "tariff".into()],
            signal_terms: vec!["rate cut".into()],
            strong_triggers: vec!["emergency meeting".into()],
            press_release_markers: vec!["sponsored content".into()],
            keyword_weight: 1,
            signal_weight: 2,
            trigger_weight: 3,
            min_title_len: 40,
            title_bonus: 1,
            press_release_penalty: 2,
            min_score: 2,
        }
    }

    fn item(title: &str, summary: &str) -> NewsItem {
        NewsItem::from_raw(
            RawRecord {
                title: title.to_string(),
                summary: Some(summary.to_string()),
                source: "Test".into(),
                ..RawRecord::default()
            },
            &[],
        )
        .unwrap()
    }

    #[test]
    fn scoring_is_deterministic() {
        let it = item("Fed announces rate cut after emergency meeting", "");
        let c = cfg();
        assert_eq!(score(&it, &c, &[]), score(&it, &c, &[]));
    }

    #[test]
    fn tiers_add_their_weights() {
        let c = cfg();
        // "fed" (1) + "rate cut" (2) + "emergency meeting" (3) + title bonus (1)
        let it = item("Fed announces rate cut after emergency meeting", "");
        assert_eq!(score(&it, &c, &[]), 7);

        let short = item("Fed news", "");
        assert_eq!(score(&short, &c, &[]), 1);
    }

    #[test]
    fn press_release_penalty_saturates_at_zero() {
        let c = cfg();
        let it = item("Sponsored content", "");
        assert_eq!(score(&it, &c, &[]), 0);
    }

    #[test]
    fn portfolio_ticker_counts_as_keyword() {
        let c = cfg();
        let it = item("AAPL hits record high on strong guidance for the year", "");
        assert_eq!(score(&it, &c, &["AAPL".into()]), 2); // ticker + title bonus
    }

    #[test]
    fn recency_window_drops_old_keeps_undated() {
        let now = Utc::now();
        let mut fresh = item("Fed cut", "");
        fresh.published_at = Some(now - Duration::hours(2));
        let mut stale = item("Fed cut", "");
        stale.published_at = Some(now - Duration::hours(48));
        let undated = item("Fed cut", "");

        assert!(is_recent(&fresh, now, 24));
        assert!(!is_recent(&stale, now, 24));
        assert!(is_recent(&undated, now, 24));
    }

    #[test]
    fn filter_keeps_only_min_score_and_up() {
        let c = cfg();
        let kept = filter_relevant(
            vec![item("Fed announces rate cut for markets today", ""), item("Weather tomorrow", "")],
            &c,
            &[],
        );
        assert_eq!(kept.len(), 1);
        assert!(kept[0].score >= c.min_score);
    }
}
