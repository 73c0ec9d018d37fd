//! storage-adapters/src/lib.rs
//!
//! Concrete implementations of the repository and session-storage ports.
//! The in-memory stores are always compiled; PostgreSQL sits behind the
//! `db-postgres` feature.

pub mod memory;
pub mod session;

#[cfg(feature = "db-postgres")]
pub mod postgres;

// Re-exporting for easier access in other crates
pub use memory::{MemoryComplaintRepo, MemoryCredentialRepo, MemoryUserRepo};
pub use session::{FileSessionStore, MemorySessionStore};

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;

use std::sync::Arc;

use domains::{ComplaintRepo, CredentialRepo, UserRepo};

/// Every repository port, each backed by the same store.
#[derive(Clone)]
pub struct Stores {
    pub complaints: Arc<dyn ComplaintRepo>,
    pub users: Arc<dyn UserRepo>,
    pub credentials: Arc<dyn CredentialRepo>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            complaints: Arc::new(MemoryComplaintRepo::new()),
            users: Arc::new(MemoryUserRepo::new()),
            credentials: Arc::new(MemoryCredentialRepo::new()),
        }
    }

    /// Connects, applies pending migrations, and shares one pool across
    /// all three ports.
    #[cfg(feature = "db-postgres")]
    pub async fn postgres(url: &str, max_connections: u32) -> domains::Result<Self> {
        let store = Arc::new(PgStore::connect(url, max_connections).await?);
        store.migrate().await?;
        Ok(Self {
            complaints: store.clone(),
            users: store.clone(),
            credentials: store,
        })
    }
}
