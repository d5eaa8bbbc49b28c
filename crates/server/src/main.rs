//! Realty Lead Agent Server Entry Point

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use realty_agent_agent::InMemorySessionStore;
use realty_agent_config::{load_settings, Settings};
use realty_agent_persistence::{
    lead_notifier_from_config, lead_store_from_config, NotificationDispatcher,
};
use realty_agent_server::{create_router, init_metrics, AppState};

/// Time allowed for queued lead notifications after shutdown
const NOTIFICATION_DRAIN_SECONDS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("REALTY_AGENT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Realty Lead Agent v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        dotenv = dotenv.is_ok(),
        "Configuration loaded"
    );

    let lead_store = lead_store_from_config(&config.persistence)
        .context("Failed to open lead store")?;
    let notifier = lead_notifier_from_config(&config.mail);
    let (notifications, notification_worker) =
        NotificationDispatcher::spawn(notifier, config.mail.queue_capacity);

    let mut state = AppState::new(
        config.clone(),
        Arc::new(InMemorySessionStore::new()),
        lead_store,
        notifications,
    );

    if config.observability.metrics_enabled {
        if let Some(handle) = init_metrics() {
            state = state.with_metrics_handle(handle);
            tracing::info!("Initialized Prometheus metrics at /metrics");
        }
    }

    tracing::info!(
        max_sessions = config.dialogue.max_sessions,
        merge_policy = ?config.dialogue.merge_policy,
        mail_enabled = config.mail.enabled,
        "Initialized application state"
    );

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it every dispatcher handle) is gone; let the
    // worker finish what is queued.
    match tokio::time::timeout(
        Duration::from_secs(NOTIFICATION_DRAIN_SECONDS),
        notification_worker,
    )
    .await
    {
        Ok(_) => tracing::debug!("Notification queue drained"),
        Err(_) => tracing::warn!("Timed out draining notification queue"),
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize console tracing
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("realty_agent={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
