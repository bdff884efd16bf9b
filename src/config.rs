// src/config.rs
//! Application configuration: one `AppConfig` loaded from TOML at startup and
//! passed by reference into each component. Config errors are fatal — the run
//! must abort before any network call.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/tradewire.toml";
pub const ENV_CONFIG_PATH: &str = "TRADEWIRE_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub relevance: RelevanceCfg,
    #[serde(default)]
    pub recency: RecencyCfg,
    #[serde(default)]
    pub cluster: ClusterCfg,
    #[serde(default)]
    pub gate: GateCfg,
    pub extract: ExtractCfg,
    #[serde(default)]
    pub accept: AcceptCfg,
    #[serde(default)]
    pub state: StateCfg,
    #[serde(default)]
    pub portfolio: PortfolioCfg,
    #[serde(default)]
    pub sources: Vec<SourceCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceCfg {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub signal_terms: Vec<String>,
    #[serde(default)]
    pub strong_triggers: Vec<String>,
    #[serde(default)]
    pub press_release_markers: Vec<String>,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: u32,
    #[serde(default = "default_signal_weight")]
    pub signal_weight: u32,
    #[serde(default = "default_trigger_weight")]
    pub trigger_weight: u32,
    /// Titles at least this long earn `title_bonus` (substantive vs boilerplate).
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,
    #[serde(default = "default_title_bonus")]
    pub title_bonus: u32,
    #[serde(default = "default_press_release_penalty")]
    pub press_release_penalty: u32,
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecencyCfg {
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

impl Default for RecencyCfg {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterCfg {
    /// First K normalized title words form the cluster key.
    #[serde(default = "default_key_words")]
    pub key_words: usize,
    /// Extra letters kept during key normalization (locale-specific).
    #[serde(default = "default_locale_letters")]
    pub locale_letters: String,
}

impl Default for ClusterCfg {
    fn default() -> Self {
        Self {
            key_words: default_key_words(),
            locale_letters: default_locale_letters(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateCfg {
    #[serde(default = "default_high_score")]
    pub high_score: u32,
    #[serde(default = "default_cluster_min_size")]
    pub cluster_min_size: usize,
    #[serde(default = "default_cluster_avg_score")]
    pub cluster_avg_score: f32,
    #[serde(default = "default_breadth")]
    pub breadth: usize,
}

impl Default for GateCfg {
    fn default() -> Self {
        Self {
            high_score: default_high_score(),
            cluster_min_size: default_cluster_min_size(),
            cluster_avg_score: default_cluster_avg_score(),
            breadth: default_breadth(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractCfg {
    /// Model identifiers in priority order, most capable first.
    pub models: Vec<String>,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Attempts per model on rate-limit before falling through.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptCfg {
    #[serde(default = "default_portfolio_threshold")]
    pub portfolio_threshold: f64,
    #[serde(default = "default_discovery_threshold")]
    pub discovery_threshold: f64,
    #[serde(default = "default_buy_terms")]
    pub buy_terms: Vec<String>,
    #[serde(default = "default_sell_terms")]
    pub sell_terms: Vec<String>,
}

impl Default for AcceptCfg {
    fn default() -> Self {
        Self {
            portfolio_threshold: default_portfolio_threshold(),
            discovery_threshold: default_discovery_threshold(),
            buy_terms: default_buy_terms(),
            sell_terms: default_sell_terms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateCfg {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateCfg {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioCfg {
    #[serde(default)]
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCfg {
    pub kind: SourceKind,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Env var holding the API key (social_api sources).
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Rss,
    SocialApi,
}

impl AppConfig {
    /// Load from `$TRADEWIRE_CONFIG_PATH` or the default path.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(toml_str).context("parsing config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.relevance.keywords.is_empty() {
            bail!("config: [relevance].keywords must not be empty");
        }
        if self.extract.models.is_empty() {
            bail!("config: [extract].models must list at least one model id");
        }
        if self.extract.max_attempts == 0 {
            bail!("config: [extract].max_attempts must be at least 1");
        }
        for (label, v) in [
            ("portfolio_threshold", self.accept.portfolio_threshold),
            ("discovery_threshold", self.accept.discovery_threshold),
        ] {
            if !(0.0..=100.0).contains(&v) {
                bail!("config: [accept].{label} must be within 0..=100, got {v}");
            }
        }
        if self.cluster.key_words == 0 {
            bail!("config: [cluster].key_words must be at least 1");
        }
        if self.gate.breadth == 0 || self.gate.cluster_min_size == 0 {
            bail!("config: [gate] thresholds must be at least 1");
        }
        Ok(())
    }
}

fn default_keyword_weight() -> u32 {
    1
}
fn default_signal_weight() -> u32 {
    2
}
fn default_trigger_weight() -> u32 {
    3
}
fn default_min_title_len() -> usize {
    40
}
fn default_title_bonus() -> u32 {
    1
}
fn default_press_release_penalty() -> u32 {
    2
}
fn default_min_score() -> u32 {
    2
}
fn default_max_age_hours() -> i64 {
    24
}
fn default_key_words() -> usize {
    10
}
fn default_locale_letters() -> String {
    "äöüß".to_string()
}
fn default_high_score() -> u32 {
    6
}
fn default_cluster_min_size() -> usize {
    3
}
fn default_cluster_avg_score() -> f32 {
    3.0
}
fn default_breadth() -> usize {
    6
}
fn default_max_items() -> usize {
    12
}
fn default_max_attempts() -> u32 {
    2
}
fn default_backoff_secs() -> u64 {
    20
}
fn default_prompt() -> String {
    "You are a financial news analyst. From the headlines below, extract \
     concrete trade ideas as JSON: {\"ideas\": [{\"name\": string, \"type\": string, \
     \"signal\": \"BUY\"|\"SELL\"|\"HOLD\", \"rationale\": string, \"confidence\": number, \
     \"affectsHeldPosition\": bool}]}. Only include ideas directly supported by a \
     headline. Respond with the JSON object only."
        .to_string()
}
fn default_portfolio_threshold() -> f64 {
    65.0
}
fn default_discovery_threshold() -> f64 {
    90.0
}
fn default_buy_terms() -> Vec<String> {
    ["buy", "long", "accumulate", "kaufen", "nachkaufen"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_sell_terms() -> Vec<String> {
    ["sell", "short", "reduce", "trim", "verkaufen"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_state_path() -> PathBuf {
    PathBuf::from("state/seen_ids.json")
}
