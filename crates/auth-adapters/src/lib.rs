//! auth-adapters/src/lib.rs
//!
//! Identity providers and bearer-token issuers.

pub mod credentials;
pub mod demo;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

// Re-exporting for easier access in other crates
pub use credentials::CredentialIdentityProvider;
pub use demo::DemoIdentityProvider;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenIssuer;
