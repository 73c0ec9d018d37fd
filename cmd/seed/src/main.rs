//! # seed
//!
//! Loads the demo dataset into the configured store. Safe to run more than
//! once: records that already exist are left alone. With the credential
//! identity provider the demo admin also gets a password, so the seeded
//! account can sign in.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use auth_adapters::credentials::hash_password;
use auth_adapters::demo::DEMO_PASSWORD;
use configs::{AppConfig, DatabaseBackend, IdentityMode, LogFormat};
use services::seed::{self, DEMO_ADMIN_ID, DEMO_ADMIN_USERNAME};
use storage_adapters::Stores;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    let stores = match config.database.backend {
        DatabaseBackend::Memory => {
            warn!("memory backend selected; seeded data is discarded when this process exits");
            Stores::memory()
        }
        #[cfg(feature = "db-postgres")]
        DatabaseBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;
            Stores::postgres(url, config.database.max_connections).await?
        }
        #[cfg(not(feature = "db-postgres"))]
        DatabaseBackend::Postgres => {
            anyhow::bail!("this build has no PostgreSQL support; enable the db-postgres feature")
        }
    };

    let report = seed::load(
        seed::demo_dataset(Utc::now()),
        stores.complaints.as_ref(),
        stores.users.as_ref(),
    )
    .await
    .context("loading demo data")?;
    info!(
        users = report.users,
        complaints = report.complaints,
        comments = report.comments,
        "seed finished"
    );

    if config.auth.identity == IdentityMode::Credentials
        && stores.credentials.password_hash(DEMO_ADMIN_ID).await?.is_none()
    {
        let hash = hash_password(DEMO_PASSWORD).await?;
        stores.credentials.set_password_hash(DEMO_ADMIN_ID, hash).await?;
        info!(username = DEMO_ADMIN_USERNAME, "demo admin password set");
    }

    Ok(())
}
