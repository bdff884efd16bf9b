//! Tradewire — Binary Entrypoint
//! One pipeline run per invocation; scheduling is external (cron or a
//! systemd timer). Configuration errors abort before any network call.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradewire::config::AppConfig;
use tradewire::dedup::SeenIdStore;
use tradewire::extract::{openai::OpenAiCaller, ExtractionClient};
use tradewire::ingest;
use tradewire::notify::NotifierMux;
use tradewire::pipeline;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tradewire=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let providers = ingest::build_providers(&cfg)?;
    if providers.is_empty() {
        tracing::warn!("no sources configured; the run will have nothing to do");
    }

    let extractor = ExtractionClient::new(Box::new(OpenAiCaller::from_env()), cfg.extract.clone());
    let notifier = NotifierMux::from_env();
    let store = SeenIdStore::new(cfg.state.path.clone());

    let summary = pipeline::run_once(&cfg, &providers, &extractor, &notifier, &store).await?;
    tracing::info!(
        fetched = summary.fetched,
        relevant = summary.relevant,
        new = summary.new_items,
        gate = ?summary.gate,
        candidates = summary.candidates,
        accepted = summary.accepted,
        delivered = summary.delivered,
        committed = summary.committed,
        "run finished"
    );
    Ok(())
}
