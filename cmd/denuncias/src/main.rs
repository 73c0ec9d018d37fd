//! # denuncias
//!
//! Assembles the complaint platform from configuration: picks the store and
//! identity provider, optionally loads the demo data, then serves the JSON
//! API and, when enabled, the legacy `/api/denuncias` service on its own
//! port.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use api_adapters::{legacy, router, AppState, LegacyStore};
use auth_adapters::{CredentialIdentityProvider, DemoIdentityProvider, JwtTokenIssuer};
use configs::{AppConfig, DatabaseBackend, DatabaseConfig, IdentityMode, LogFormat, LoggingConfig};
use domains::IdentityProvider;
use services::{seed, AuthService, ComplaintService};
use storage_adapters::Stores;

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_stores(config: &DatabaseConfig) -> Result<Stores> {
    match config.backend {
        DatabaseBackend::Memory => Ok(Stores::memory()),
        DatabaseBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn open_postgres(config: &DatabaseConfig) -> Result<Stores> {
    let url = config
        .url
        .as_deref()
        .context("database.url is required for the postgres backend")?;
    Ok(Stores::postgres(url, config.max_connections).await?)
}

#[cfg(not(feature = "db-postgres"))]
async fn open_postgres(_config: &DatabaseConfig) -> Result<Stores> {
    anyhow::bail!("this build has no PostgreSQL support; enable the db-postgres feature")
}

fn identity_provider(mode: IdentityMode, stores: &Stores) -> Arc<dyn IdentityProvider> {
    match mode {
        IdentityMode::Demo => Arc::new(DemoIdentityProvider::new(
            stores.users.clone(),
            seed::demo_admin(Utc::now()),
        )),
        IdentityMode::Credentials => Arc::new(CredentialIdentityProvider::new(
            stores.users.clone(),
            stores.credentials.clone(),
        )),
    }
}

fn log_backend(config: &AppConfig) {
    let backend = &config.backend;
    info!(
        project_id = %backend.project_id,
        auth_domain = %backend.auth_domain(),
        storage_bucket = %backend.storage_bucket(),
        messaging_sender_id = backend.messaging_sender_id.as_deref().unwrap_or("-"),
        app_id = backend.app_id.as_deref().unwrap_or("-"),
        api_key_set = backend.has_api_key(),
        "backend project"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);
    log_backend(&config);

    let stores = open_stores(&config.database).await?;
    info!(backend = ?config.database.backend, "store ready");

    if config.seed_demo {
        let report = seed::load(
            seed::demo_dataset(Utc::now()),
            stores.complaints.as_ref(),
            stores.users.as_ref(),
        )
        .await
        .context("loading demo data")?;
        info!(?report, "demo data checked");
    }

    let identity = identity_provider(config.auth.identity, &stores);
    if config.auth.identity == IdentityMode::Demo {
        warn!("demo identity provider active; do not expose this instance publicly");
    }
    let tokens = Arc::new(JwtTokenIssuer::new(
        config.auth.jwt_secret.expose_secret().as_bytes(),
        Duration::hours(config.auth.token_ttl_hours),
    ));

    let complaints = Arc::new(ComplaintService::new(
        stores.complaints.clone(),
        stores.users.clone(),
    ));
    let auth = Arc::new(AuthService::new(identity, stores.users.clone(), tokens));
    let app = router(AppState::new(complaints, auth));

    let (stop, stopped) = watch::channel(false);

    let legacy_task = if config.legacy.enabled {
        let address = format!("{}:{}", config.server.host, config.legacy.port);
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("binding legacy API to {address}"))?;
        info!(%address, "legacy API listening");
        let mut stopped = stopped.clone();
        let legacy_app = legacy::router(Arc::new(LegacyStore::seeded()));
        Some(tokio::spawn(async move {
            axum::serve(listener, legacy_app)
                .with_graceful_shutdown(async move {
                    let _ = stopped.changed().await;
                })
                .await
        }))
    } else {
        None
    };

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding API to {address}"))?;
    info!(%address, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    let _ = stop.send(true);
    if let Some(task) = legacy_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "legacy API stopped with an error"),
            Err(e) => warn!(error = %e, "legacy API task panicked"),
        }
    }

    info!("shut down cleanly");
    Ok(())
}
