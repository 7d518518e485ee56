use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use pharmafind_api::auth::{AuthConfig, AuthService};
use pharmafind_api::config::{init_tracing, load_config};
use pharmafind_api::handlers::AppServices;
use pharmafind_api::{api_v1_routes, db, events, openapi, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        "starting pharmafind-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_pool = Arc::new(
        db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to the database")?,
    );

    if config.auto_migrate {
        db::run_migrations(&db_pool)
            .await
            .context("failed to run database migrations")?;
        info!("database migrations applied");
    }

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = events::EventSender::new(event_tx);
    tokio::spawn(events::process_events(event_rx));

    let auth = Arc::new(AuthService::new(AuthConfig::new(
        config.jwt_secret.clone(),
        config.auth_issuer.clone(),
        config.auth_audience.clone(),
        config.jwt_expiration as i64,
    )));

    let services = AppServices::new(db_pool.clone(), auth.clone(), event_sender.clone());

    let state = AppState {
        db: db_pool,
        config: config.clone(),
        event_sender,
        auth,
        services,
    };

    let cors = match config.cors_allowed_origins.as_deref() {
        Some(origins) => {
            let parsed = origins
                .split(',')
                .filter_map(|o| o.trim().parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => {
            if !config.is_development() {
                warn!("no CORS origins configured, allowing any origin");
            }
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = Router::new()
        .route("/", get(|| async { "PharmaFind API is running" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
