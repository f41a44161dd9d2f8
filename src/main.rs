use outreach_gateway::config::Config;
use outreach_gateway::state::AppState;
use outreach_gateway::store::AirtableStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("AIRTABLE_BASE_ID set: {}", !config.airtable_base_id.is_empty());
    tracing::info!("AIRTABLE_PAT set: {}", !config.airtable_pat.is_empty());

    let store = AirtableStore::new(
        config.airtable_api_url.clone(),
        config.airtable_base_id.clone(),
        config.airtable_pat.clone(),
    );
    let shared = Arc::new(AppState::new(Arc::new(store)));

    let app = outreach_gateway::build_router(shared).layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
