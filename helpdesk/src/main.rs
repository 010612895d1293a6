//! Help-desk HTTP server.

use helpdesk::auth::TokenRegistry;
use helpdesk::broadcast::TopicBroadcaster;
use helpdesk::config::Config;
use helpdesk::metrics::{register_helpdesk_metrics, IssueMetrics};
use helpdesk::server::{build_router, AppState};
use helpdesk::service::IssueService;
use helpdesk::store::InMemoryIssueStore;
use helpdesk::types::SystemClock;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting help-desk server");

    let config = Config::from_env();
    register_helpdesk_metrics();

    // Collaborators: in-memory store and in-process broadcast transport.
    // Both sit behind traits; swapping in a durable store or a socket
    // transport is a wiring change here, not a core change.
    let store = Arc::new(InMemoryIssueStore::new());
    let broadcaster = Arc::new(TopicBroadcaster::with_capacity(
        config.broadcast.channel_capacity,
    ));

    let resolver = Arc::new(TokenRegistry::new());
    for entry in &config.auth.tokens {
        match entry.role.as_str() {
            "tech" => {
                resolver
                    .register_technician(entry.token.clone(), entry.subject.clone())
                    .await;
            }
            _ => {
                resolver
                    .register_employee(entry.token.clone(), entry.subject.clone())
                    .await;
            }
        }
    }
    info!(seeded_tokens = config.auth.tokens.len(), "Token registry seeded");

    let service = Arc::new(IssueService::new(
        store,
        broadcaster,
        IssueMetrics::new(),
        Arc::new(SystemClock),
    ));
    let state = AppState::new(service, resolver);

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
