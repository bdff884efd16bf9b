// src/gate.rs
//! The notify/no-notify gate: decides whether this batch of new relevant
//! items justifies the expensive extraction call. Cost-control policy, not a
//! correctness requirement; every threshold comes from configuration.

use std::collections::HashMap;

use crate::config::GateCfg;
use crate::relevance::ScoredItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    /// A single item scored at or above the high-confidence threshold.
    HighScore,
    /// A cluster is large enough and strong enough on average — independent
    /// corroboration by volume.
    Corroboration,
    /// Enough new relevant items overall, even without a standout.
    Breadth,
}

/// Returns the first satisfied rule, or `None` to skip extraction.
/// An empty batch never passes.
pub fn should_analyze(
    items: &[ScoredItem],
    clusters: &HashMap<String, Vec<usize>>,
    cfg: &GateCfg,
) -> Option<GateReason> {
    if items.is_empty() {
        return None;
    }

    if items.iter().any(|s| s.score >= cfg.high_score) {
        return Some(GateReason::HighScore);
    }

    for members in clusters.values() {
        if members.len() >= cfg.cluster_min_size {
            let sum: u32 = members.iter().map(|&i| items[i].score).sum();
            let avg = sum as f32 / members.len() as f32;
            if avg >= cfg.cluster_avg_score {
                return Some(GateReason::Corroboration);
            }
        }
    }

    if items.len() >= cfg.breadth {
        return Some(GateReason::Breadth);
    }

    None
}
