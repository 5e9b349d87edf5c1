//! convene server entry point.
//!
//! Starts the Axum HTTP server after wiring registries, the blob
//! store, services, the mail worker, and (optionally) the snapshot
//! persistence loop.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use convene::api;
use convene::app_state::AppState;
use convene::auth::TokenKeys;
use convene::blob::BlobStore;
use convene::config::AppConfig;
use convene::domain::{EventRegistry, Notifier, RegistrationLedger, UserDirectory};
use convene::persistence::{SnapshotStore, snapshotter};
use convene::service::{
    AuthService, EventService, Mailer, RegistrationService, StatsService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting convene");

    // Build domain layer
    let registry = Arc::new(EventRegistry::new());
    let ledger = Arc::new(RegistrationLedger::new());
    let users = Arc::new(UserDirectory::new());
    let notifier = Notifier::new(config.notifier_capacity);

    // Open the blob store before accepting any request that might
    // touch it.
    let blobs = Arc::new(BlobStore::new());
    blobs.init().await;

    // Optional snapshot persistence: restore prior state, then keep
    // snapshotting in the background.
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        let store = SnapshotStore::new(pool);

        snapshotter::restore(&store, &registry, &ledger).await;
        tokio::spawn(snapshotter::run_snapshot_loop(
            store,
            Arc::clone(&registry),
            Arc::clone(&ledger),
            config.snapshot_interval_secs,
            config.cleanup_after_days,
        ));
    }

    // Mail worker draining the notification channel.
    let mailer = Mailer::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    );
    let _mail_worker = mailer.spawn(&notifier);

    // Build service layer
    let token_keys = Arc::new(TokenKeys::new(&config.jwt_secret, config.token_ttl_hours));
    let events = Arc::new(EventService::new(
        Arc::clone(&registry),
        Arc::clone(&ledger),
        Arc::clone(&users),
        Arc::clone(&blobs),
        notifier.clone(),
    ));
    let registrations = Arc::new(RegistrationService::new(
        Arc::clone(&registry),
        Arc::clone(&ledger),
        Arc::clone(&users),
        Arc::clone(&blobs),
        notifier.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        Arc::clone(&users),
        Arc::clone(&token_keys),
    ));
    let stats = Arc::new(StatsService::new(
        Arc::clone(&registry),
        Arc::clone(&ledger),
        Arc::clone(&users),
    ));

    // Build application state
    let app_state = AppState {
        events,
        registrations,
        auth,
        stats,
        blobs,
        token_keys,
        public_base_url: config.public_base_url.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
