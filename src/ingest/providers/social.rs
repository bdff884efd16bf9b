// src/ingest/providers/social.rs
//! Scraper-API provider for social profile posts. The upstream endpoint
//! returns `{"posts": [{"id", "content", "url", "date"}]}`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SourceCfg;
use crate::ingest::types::{RawRecord, SourceProvider};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: Option<String>,
    content: Option<String>,
    url: Option<String>,
    date: Option<String>,
}

pub struct SocialApiProvider {
    name: String,
    url: String,
    api_key: String,
    limit: usize,
    http: reqwest::Client,
}

impl SocialApiProvider {
    /// Resolves the API key from the env var named in config; a missing key
    /// is a configuration error (fatal before any network call).
    pub fn from_config(cfg: &SourceCfg) -> Result<Self> {
        let Some(env_name) = cfg.api_key_env.as_deref() else {
            bail!("source `{}`: social_api requires api_key_env", cfg.name);
        };
        let api_key = std::env::var(env_name)
            .with_context(|| format!("source `{}`: missing ${env_name}", cfg.name))?;
        let http = reqwest::Client::builder()
            .user_agent("tradewire/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Ok(Self {
            name: cfg.name.clone(),
            url: cfg.url.clone(),
            api_key,
            limit: cfg.limit.unwrap_or(DEFAULT_LIMIT),
            http,
        })
    }
}

#[async_trait]
impl SourceProvider for SocialApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawRecord>> {
        let resp = self
            .http
            .get(&self.url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("limit", &self.limit.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("fetching posts from {}", self.url))?
            .error_for_status()
            .context("scraper api returned non-2xx")?;

        let body: PostsResponse = resp.json().await.context("parsing posts json")?;

        let mut out = Vec::with_capacity(body.posts.len());
        for p in body.posts {
            let Some(content) = p.content.filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            out.push(RawRecord {
                id: p.id,
                title: content,
                summary: None,
                link: p.url,
                published_at: p
                    .date
                    .as_deref()
                    .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
                    .map(|dt| dt.timestamp()),
                source: self.name.clone(),
            });
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
