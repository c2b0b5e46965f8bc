use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use savvy_api::auth::{AppState, AppStateInner};
use savvy_api::fanout::FanoutCoordinator;
use savvy_gateway::hub::Hub;
use savvy_push::PushDispatcher;

mod config;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "savvy=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(savvy_db::Database::open(&PathBuf::from(&config.db_path))?);

    // Shared state
    let hub = Hub::new();
    let push = match &config.vapid {
        Some(identity) => PushDispatcher::new(identity)
            .map_err(|e| anyhow::anyhow!("invalid VAPID identity: {}", e))?,
        None => {
            warn!("VAPID keys missing. Push notifications are disabled.");
            PushDispatcher::disabled()
        }
    };
    let fanout = FanoutCoordinator::new(hub.clone(), push, db.clone());
    let state: AppState = Arc::new(AppStateInner { db, hub, fanout });

    let cors = if config.cors_origin == "*" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(
                config.cors_origin.parse::<HeaderValue>()?,
            ))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = savvy_api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Savvy ledger listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
