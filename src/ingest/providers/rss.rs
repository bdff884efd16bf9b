// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::types::{RawRecord, SourceProvider};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
}

/// RSS 2.0 provider. Fetches over HTTP, or parses a fixture string in tests.
pub struct RssProvider {
    name: String,
    url: Option<String>,
    fixture: Option<String>,
    http: reqwest::Client,
}

impl RssProvider {
    pub fn from_url(name: &str, url: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("tradewire/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            url: Some(url.to_string()),
            fixture: None,
            http,
        }
    }

    pub fn from_fixture(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            url: None,
            fixture: Some(content.to_string()),
            http: reqwest::Client::new(),
        }
    }

    async fn feed_xml(&self) -> Result<String> {
        if let Some(fx) = &self.fixture {
            return Ok(fx.clone());
        }
        let Some(url) = self.url.as_deref() else {
            anyhow::bail!("rss provider `{}` has neither url nor fixture", self.name);
        };
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching rss feed {url}"))?
            .error_for_status()
            .with_context(|| format!("rss feed {url} returned non-2xx"))?;
        resp.text().await.context("reading rss body")
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawRecord>> {
        let xml = self.feed_xml().await?;
        let rss: Rss = from_str(&xml).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = it.title.unwrap_or_default();
            if title.trim().is_empty() {
                continue;
            }
            out.push(RawRecord {
                id: it.guid.or_else(|| it.link.clone()),
                title,
                summary: it.description,
                link: it.link,
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822_to_unix),
                source: self.name.clone(),
            });
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Newswire</title>
    <item>
      <title>Fed signals pause on rate hikes</title>
      <link>https://example.test/fed-pause</link>
      <guid>fed-pause-1</guid>
      <pubDate>Thu, 06 Aug 2026 14:00:00 GMT</pubDate>
      <description>Officials see inflation cooling.</description>
    </item>
    <item>
      <title></title>
      <link>https://example.test/empty</link>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn parses_fixture_and_skips_empty_titles() {
        let p = RssProvider::from_fixture("Newswire", FIXTURE);
        let out = p.fetch_latest().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.as_deref(), Some("fed-pause-1"));
        assert_eq!(out[0].source, "Newswire");
        assert!(out[0].published_at.is_some());
    }

    #[test]
    fn rfc2822_parse_is_tolerant() {
        assert!(parse_rfc2822_to_unix("Thu, 06 Aug 2026 14:00:00 GMT").is_some());
        assert!(parse_rfc2822_to_unix("not a date").is_none());
    }
}
