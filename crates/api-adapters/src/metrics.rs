//! Prometheus counters for the main API, rendered in the OpenMetrics text
//! format at `GET /metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub struct Metrics {
    registry: Registry,
    pub complaints_created: Counter,
    pub likes_toggled: Counter,
    pub comments_added: Counter,
    pub failed_logins: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("denuncias");
        let complaints_created = Counter::default();
        let likes_toggled = Counter::default();
        let comments_added = Counter::default();
        let failed_logins = Counter::default();

        registry.register(
            "complaints_created",
            "Complaints accepted by the API",
            complaints_created.clone(),
        );
        registry.register(
            "likes_toggled",
            "Like toggles applied to complaints",
            likes_toggled.clone(),
        );
        registry.register(
            "comments_added",
            "Comments attached to complaints",
            comments_added.clone(),
        );
        registry.register(
            "failed_logins",
            "Rejected login attempts",
            failed_logins.clone(),
        );

        Self {
            registry,
            complaints_created,
            likes_toggled,
            comments_added,
            failed_logins,
        }
    }

    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_the_exposition() {
        let metrics = Metrics::new();
        metrics.complaints_created.inc();
        metrics.complaints_created.inc();
        metrics.failed_logins.inc();

        let body = metrics.render().unwrap();
        assert!(body.contains("denuncias_complaints_created_total 2"));
        assert!(body.contains("denuncias_failed_logins_total 1"));
        assert!(body.contains("denuncias_likes_toggled_total 0"));
        assert!(body.trim_end().ends_with("# EOF"));
    }
}
