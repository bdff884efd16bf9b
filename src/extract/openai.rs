// src/extract/openai.rs
//! Chat-completions caller for OpenAI-compatible endpoints. Requires
//! `OPENAI_API_KEY`; the base URL is overridable for tests and gateways.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ModelCaller, ModelError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiCaller {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCaller {
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        Self::new(api_key)
    }

    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("tradewire/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait::async_trait]
impl ModelCaller for OpenAiCaller {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::Unavailable("missing OPENAI_API_KEY".into()));
        }

        let req = Req {
            model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(ModelError::RateLimited);
        }
        if !status.is_success() {
            return Err(ModelError::Unavailable(format!(
                "{model} returned {status}"
            )));
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ModelError::Malformed("empty completion".into()));
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
