// src/accept.rs
//! Acceptance policy: classify each candidate's signal, then apply the
//! two-tier confidence thresholds — a lower bar for held positions (early
//! warning on what you own), a higher bar for unsolicited new discoveries.

use serde::{Deserialize, Serialize};

use crate::config::AcceptCfg;
use crate::confidence;
use crate::extract::IdeaCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalClass {
    Buy,
    Sell,
    Hold,
}

/// An idea that passed confidence normalization and the acceptance policy,
/// ready for delivery. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedIdea {
    pub name: String,
    pub asset_type: String,
    pub signal: SignalClass,
    pub rationale: String,
    /// Normalized confidence in [0, 100].
    pub confidence: f64,
    pub affects_held_position: bool,
}

/// Free-form signal label → class, via the configured keyword lists
/// (case-insensitive, multi-language). Unknown labels are informational.
pub fn classify(signal: &str, cfg: &AcceptCfg) -> SignalClass {
    let s = signal.to_lowercase();
    if cfg.buy_terms.iter().any(|t| s.contains(&t.to_lowercase())) {
        SignalClass::Buy
    } else if cfg.sell_terms.iter().any(|t| s.contains(&t.to_lowercase())) {
        SignalClass::Sell
    } else {
        SignalClass::Hold
    }
}

/// Normalize confidence and apply the acceptance policy. Order of surviving
/// ideas matches the extractor's output order.
///
/// Accept iff the signal is actionable AND:
///   - held position: confidence ≥ portfolio_threshold (inclusive);
///   - new discovery: buy-like only, confidence ≥ discovery_threshold
///     (a sell on an asset you don't hold is not actionable).
pub fn accept(candidates: Vec<IdeaCandidate>, cfg: &AcceptCfg) -> Vec<AcceptedIdea> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let signal = classify(&c.signal, cfg);
            let conf = confidence::normalize(c.confidence_raw);

            let keep = match (signal, c.affects_held_position) {
                (SignalClass::Hold, _) => false,
                (_, true) => conf >= cfg.portfolio_threshold,
                (SignalClass::Buy, false) => conf >= cfg.discovery_threshold,
                (SignalClass::Sell, false) => false,
            };
            if !keep {
                tracing::debug!(name = %c.name, ?signal, conf, "idea rejected");
                return None;
            }

            Some(AcceptedIdea {
                name: c.name,
                asset_type: c.asset_type,
                signal,
                rationale: c.rationale,
                confidence: conf,
                affects_held_position: c.affects_held_position,
            })
        })
        .collect()
}
