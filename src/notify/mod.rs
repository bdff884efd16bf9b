// src/notify/mod.rs
//! Delivery adapters. The pipeline hands over accepted ideas and moves on;
//! channel failures are logged, never fatal to the run.

pub mod email;
pub mod pushover;

use anyhow::Result;

use crate::accept::{AcceptedIdea, SignalClass};

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, ideas: &[AcceptedIdea]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// One line per idea: `NAME: SIGNAL (NN%) — rationale`.
pub fn render_message(ideas: &[AcceptedIdea]) -> String {
    ideas
        .iter()
        .map(|i| {
            let signal = match i.signal {
                SignalClass::Buy => "BUY",
                SignalClass::Sell => "SELL",
                SignalClass::Hold => "HOLD",
            };
            format!("{}: {} ({:.0}%) — {}", i.name, signal, i.confidence, i.rationale)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fan-out over every configured channel. Reports success when at least one
/// channel delivered; an empty mux counts as attempted (useful in dry runs).
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Build from environment: Pushover when its tokens are set, email when
    /// the SMTP variables are set.
    pub fn from_env() -> Self {
        let mut mux = Self::new();
        if let Some(p) = pushover::PushoverNotifier::from_env() {
            mux.push(Box::new(p));
        }
        if let Some(e) = email::EmailNotifier::from_env() {
            mux.push(Box::new(e));
        }
        mux
    }

    pub fn push(&mut self, n: Box<dyn Notifier>) {
        self.channels.push(n);
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub async fn deliver(&self, ideas: &[AcceptedIdea]) -> Result<()> {
        if self.channels.is_empty() {
            tracing::info!("no delivery channels configured, skipping delivery");
            return Ok(());
        }

        let mut delivered = 0usize;
        for ch in &self.channels {
            match ch.deliver(ideas).await {
                Ok(()) => {
                    tracing::info!(channel = ch.name(), ideas = ideas.len(), "delivered");
                    delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(channel = ch.name(), error = ?e, "delivery failed");
                }
            }
        }

        if delivered == 0 {
            anyhow::bail!("all {} delivery channels failed", self.channels.len());
        }
        Ok(())
    }
}

impl Default for NotifierMux {
    fn default() -> Self {
        Self::new()
    }
}
