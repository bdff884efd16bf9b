// src/ingest/types.rs
use anyhow::Result;

/// Raw record as produced by a source adapter, before normalization.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    /// Stable identifier from the source (guid, post id). Falls back to the
    /// link or a content hash during normalization.
    pub id: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Unix seconds, UTC. None when the source omits a timestamp.
    pub published_at: Option<i64>,
    pub source: String,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &str;
}
