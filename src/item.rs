// src/item.rs
//! Canonical `NewsItem` and the normalizer that builds it from adapter output.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::normalize_text;
use crate::ingest::types::RawRecord;

/// A normalized, timestamped short text record from a content source.
/// Immutable once constructed; only its `id` is ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    /// Empty string when the source has no summary.
    pub summary: String,
    pub link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    /// Held-portfolio tickers mentioned in the text, uppercased.
    pub source_tags: Vec<String>,
}

impl NewsItem {
    /// Normalize a raw record. Returns `None` for records with an empty title
    /// (nothing to score or cluster on).
    pub fn from_raw(raw: RawRecord, portfolio: &[String]) -> Option<Self> {
        let title = normalize_text(&raw.title);
        if title.is_empty() {
            return None;
        }
        let summary = raw
            .summary
            .as_deref()
            .map(normalize_text)
            .unwrap_or_default();

        let id = raw
            .id
            .filter(|s| !s.trim().is_empty())
            .or_else(|| raw.link.clone().filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| content_id(&title, &summary));

        let published_at = raw
            .published_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        let haystack = format!("{} {}", title, summary).to_lowercase();
        let source_tags = portfolio
            .iter()
            .filter(|t| !t.is_empty() && haystack.contains(&t.to_lowercase()))
            .map(|t| t.to_uppercase())
            .collect();

        Some(Self {
            id,
            title,
            summary,
            link: raw.link,
            published_at,
            source: raw.source,
            source_tags,
        })
    }

    /// Title and summary joined, lowercased — the scoring haystack.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.summary).to_lowercase()
    }
}

/// Stable content hash for records without an id or link.
fn content_id(title: &str, summary: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(summary.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            source: "Test".to_string(),
            ..RawRecord::default()
        }
    }

    #[test]
    fn id_prefers_source_id_then_link_then_hash() {
        let mut r = raw("Fed raises rates");
        r.id = Some("abc-1".into());
        r.link = Some("https://example.test/a".into());
        assert_eq!(NewsItem::from_raw(r, &[]).unwrap().id, "abc-1");

        let mut r = raw("Fed raises rates");
        r.link = Some("https://example.test/a".into());
        assert_eq!(
            NewsItem::from_raw(r, &[]).unwrap().id,
            "https://example.test/a"
        );

        let a = NewsItem::from_raw(raw("Fed raises rates"), &[]).unwrap();
        let b = NewsItem::from_raw(raw("Fed raises rates"), &[]).unwrap();
        assert_eq!(a.id, b.id, "content hash must be stable");
        assert_eq!(a.id.len(), 16);
    }

    #[test]
    fn empty_title_is_dropped() {
        assert!(NewsItem::from_raw(raw("   "), &[]).is_none());
    }

    #[test]
    fn portfolio_tickers_become_source_tags() {
        let mut r = raw("Apple beats estimates, AAPL up in premarket");
        r.summary = Some("Strong iPhone quarter.".into());
        let item = NewsItem::from_raw(r, &["aapl".into(), "MSFT".into()]).unwrap();
        assert_eq!(item.source_tags, vec!["AAPL".to_string()]);
    }
}
