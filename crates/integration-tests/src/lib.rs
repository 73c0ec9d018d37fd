//! Shared fixtures for the integration tests: services wired over the
//! in-memory adapters, optionally loaded with the demo dataset, plus a few
//! HTTP helpers for driving the axum router.

use std::sync::Arc;

use auth_adapters::{CredentialIdentityProvider, DemoIdentityProvider, JwtTokenIssuer};
use chrono::{Duration, Utc};
use domains::{Caller, IdentityProvider};
use services::{seed, AuthService, ComplaintService};
use storage_adapters::Stores;

pub const TEST_SECRET: &[u8] = b"integration-test-secret-value";

pub struct Harness {
    pub stores: Stores,
    pub identity: Arc<dyn IdentityProvider>,
    pub complaints: Arc<ComplaintService>,
    pub auth: Arc<AuthService>,
}

impl Harness {
    fn build(stores: Stores, identity: Arc<dyn IdentityProvider>) -> Self {
        let tokens = Arc::new(JwtTokenIssuer::new(TEST_SECRET, Duration::hours(1)));
        let complaints = Arc::new(ComplaintService::new(
            stores.complaints.clone(),
            stores.users.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            identity.clone(),
            stores.users.clone(),
            tokens,
        ));
        Self {
            stores,
            identity,
            complaints,
            auth,
        }
    }

    /// Demo sign-in (`admin` / `password`) over empty in-memory stores.
    pub fn demo() -> Self {
        let stores = Stores::memory();
        let identity = Arc::new(DemoIdentityProvider::new(
            stores.users.clone(),
            seed::demo_admin(Utc::now()),
        ));
        Self::build(stores, identity)
    }

    /// E-mail/password accounts over empty in-memory stores.
    pub fn credentials() -> Self {
        let stores = Stores::memory();
        let identity = Arc::new(CredentialIdentityProvider::new(
            stores.users.clone(),
            stores.credentials.clone(),
        ));
        Self::build(stores, identity)
    }

    pub async fn with_demo_data(self) -> Self {
        seed::load(
            seed::demo_dataset(Utc::now()),
            self.stores.complaints.as_ref(),
            self.stores.users.as_ref(),
        )
        .await
        .expect("demo data loads");
        self
    }

    pub fn demo_admin(&self) -> Caller {
        Caller {
            user_id: seed::DEMO_ADMIN_ID,
            username: seed::DEMO_ADMIN_USERNAME.to_string(),
        }
    }

    #[cfg(feature = "web-axum")]
    pub fn router(&self) -> axum::Router {
        api_adapters::router(api_adapters::AppState::new(
            self.complaints.clone(),
            self.auth.clone(),
        ))
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            Request, StatusCode,
        },
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub fn request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
            None => builder.body(Body::empty()).expect("valid request"),
        }
    }

    pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
