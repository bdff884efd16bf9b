// src/notify/pushover.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{render_message, Notifier};
use crate::accept::AcceptedIdea;

const API_URL: &str = "https://api.pushover.net/1/messages.json";

pub struct PushoverNotifier {
    token: String,
    user: String,
    client: Client,
    timeout: Duration,
}

impl PushoverNotifier {
    /// `None` when PUSHOVER_TOKEN / PUSHOVER_USER are not both set.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("PUSHOVER_TOKEN").ok()?;
        let user = std::env::var("PUSHOVER_USER").ok()?;
        Some(Self::new(token, user))
    }

    pub fn new(token: String, user: String) -> Self {
        Self {
            token,
            user,
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for PushoverNotifier {
    async fn deliver(&self, ideas: &[AcceptedIdea]) -> Result<()> {
        let message = render_message(ideas);
        let payload = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("title", "Tradewire alert"),
            ("message", message.as_str()),
        ];

        self.client
            .post(API_URL)
            .timeout(self.timeout)
            .form(&payload)
            .send()
            .await
            .context("pushover post")?
            .error_for_status()
            .context("pushover non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pushover"
    }
}
