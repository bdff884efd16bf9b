// src/cluster.rs
//! Topic clustering within a single run: items sharing a normalized title
//! prefix are treated as one story reported by different sources. Used only
//! as input to the notification gate, never for cross-run deduplication.

use std::collections::HashMap;

use crate::config::ClusterCfg;
use crate::relevance::ScoredItem;

/// Normalized cluster key: lowercase, strip everything but alphanumerics and
/// configured locale letters, collapse whitespace, keep the first K words.
pub fn cluster_key(title: &str, cfg: &ClusterCfg) -> String {
    let lowered = title.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || cfg.locale_letters.contains(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .take(cfg.key_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group items by cluster key; values are indices into `items`.
pub fn cluster_items(items: &[ScoredItem], cfg: &ClusterCfg) -> HashMap<String, Vec<usize>> {
    let mut clusters: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, scored) in items.iter().enumerate() {
        let key = cluster_key(&scored.item.title, cfg);
        if key.is_empty() {
            continue;
        }
        clusters.entry(key).or_default().push(idx);
    }
    clusters
}
