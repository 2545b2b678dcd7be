pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod session;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::ServiceConfig;
use crate::db::SqliteAnalysisStore;

/// Load configuration, open the database and serve the API until Ctrl-C.
pub fn run() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return;
        }
    };

    if !config.huggingface.is_configured() && !config.mistral.is_configured() {
        tracing::warn!("No completion provider API key set, every analysis will fail");
    }

    let conn = match db::open_database(&config.db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(path = %config.db_path.display(), "Cannot open database: {e}");
            return;
        }
    };
    let store = Arc::new(SqliteAnalysisStore::new(conn));
    let ctx = ApiContext::new(&config, store);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Cannot start async runtime: {e}");
            return;
        }
    };

    runtime.block_on(async move {
        let server = match api::start_server_on(ctx, config.bind_addr).await {
            Ok(server) => server,
            Err(e) => {
                tracing::error!("{e}");
                return;
            }
        };
        tracing::info!(addr = %server.addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for shutdown signal: {e}");
        }
        server.stop().await;
    });
}
