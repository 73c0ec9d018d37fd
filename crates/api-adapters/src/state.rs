use std::sync::Arc;

use services::{AuthService, ComplaintService};

use crate::metrics::Metrics;

/// Shared by every handler. Services are built by the binary and handed in.
#[derive(Clone)]
pub struct AppState {
    pub complaints: Arc<ComplaintService>,
    pub auth: Arc<AuthService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(complaints: Arc<ComplaintService>, auth: Arc<AuthService>) -> Self {
        Self {
            complaints,
            auth,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
