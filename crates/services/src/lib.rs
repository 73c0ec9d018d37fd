//! services/src/lib.rs
//!
//! The controllers of the complaint platform. Each service is constructed
//! explicitly over the ports it needs and shared behind an `Arc`.

pub mod auth;
pub mod complaints;
pub mod events;
pub mod seed;
pub mod session;
pub mod utils;

// Re-exporting for easier access in other crates
pub use auth::{AuthService, AuthSession, INVALID_CREDENTIALS};
pub use complaints::{ComplaintService, ComplaintStats, DEFAULT_HIGHLIGHT_LIMIT};
pub use events::{AuthEvent, ComplaintEvent, EventBus};
pub use session::{SessionController, SessionState};
