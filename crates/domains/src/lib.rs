//! domains/src/lib.rs
//!
//! The central domain types and interface definitions for the complaint
//! platform ("Sistema de Denuncias Anónimas").

pub mod error;
pub mod models;
pub mod ports;
pub mod time;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
pub use validation::is_valid_email;
