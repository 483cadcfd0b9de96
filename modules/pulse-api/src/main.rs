use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use openrouter_client::OpenRouterClient;
use pulse_common::Config;
use pulse_pipeline::{run_scheduled, BriefingPipeline, RetryConfig, Synthesizer};
use pulse_sources::{ArxivClient, GitHubReleases, HackerNewsClient};
use pulse_store::{ensure_schema, BriefingStore, PgBriefingStore};

mod cors;
mod rest;
mod routes;

pub struct AppState {
    pub store: Arc<dyn BriefingStore>,
    pub pipeline: Arc<BriefingPipeline>,
    pub trigger_secret: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    ensure_schema(&pool).await?;
    let store: Arc<dyn BriefingStore> = Arc::new(PgBriefingStore::new(pool));

    let synthesizer = Synthesizer::new(
        OpenRouterClient::new(&config.openrouter_api_key).with_app_name("Pulse"),
        &config.briefing_model,
    );

    let pipeline = Arc::new(BriefingPipeline::new(
        Arc::new(HackerNewsClient::new()),
        Arc::new(ArxivClient::new()),
        Arc::new(GitHubReleases::new(&config.github_token)),
        Arc::new(synthesizer),
        store.clone(),
        config.briefing_model.clone(),
    ));

    if let Some(hours) = config.briefing_interval_hours {
        spawn_schedule_loop(pipeline.clone(), hours);
    }

    let state = Arc::new(AppState {
        store,
        pipeline,
        trigger_secret: config.trigger_secret.clone(),
    });

    let app = routes::router(state, &config.allowed_origins, config.is_development());

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Pulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drive the scheduled path from inside the process. Most deployments point
/// an external timer at the scheduled entry point instead; this loop exists
/// for single-binary setups. Runs are detached and non-cancelable.
fn spawn_schedule_loop(pipeline: Arc<BriefingPipeline>, interval_hours: u64) {
    info!(interval_hours, "Starting briefing schedule loop");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_hours * 3600));
        loop {
            interval.tick().await;
            run_scheduled(&pipeline, RetryConfig::default()).await;
        }
    });
}
