use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use stackstats::config::AppConfig;
use stackstats::services::aggregator::StatsEngine;
use stackstats::services::management_client::ManagementClient;
use stackstats::services::query_port::RemoteQueryPort;
use stackstats::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stackstats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env();

    let port: Option<Arc<dyn RemoteQueryPort>> =
        match ManagementClient::new(&config.cma_base_url, config.management_token.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize Management Client");
                None
            }
        };

    let state = AppState {
        engine: Arc::new(StatsEngine::new(port, config.stats_max_concurrency)),
        config: config.clone(),
    };

    if state.engine.is_ready() && config.stack_api_key.is_some() {
        let _handle = state.trigger_refresh();
    } else {
        tracing::warn!("Stack API key or Management Client missing, skipping initial refresh");
    }

    let host: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((host, config.port));
    tracing::info!(host = %addr, "Starting stack statistics server");

    let app = stackstats::routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
