//! Prometheus request counters.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    /// The matched route template, e.g. `/api/action/{id}`.
    pub route: String,
    pub status: String,
}

pub struct Metrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("thinking_models");
        let requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "HTTP requests served by method, route and status",
            requests.clone(),
        );
        Self { registry, requests }
    }

    pub fn record(&self, method: &str, route: &str, status: u16) {
        self.requests
            .get_or_create(&RequestLabels {
                method: method.to_owned(),
                route: route.to_owned(),
                status: status.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

#[cfg(feature = "web-axum")]
pub use middleware::track;

#[cfg(feature = "web-axum")]
mod middleware {
    use std::sync::Arc;

    use axum::extract::{MatchedPath, Request, State};
    use axum::middleware::Next;
    use axum::response::Response;

    use super::Metrics;

    /// Counts every routed request. Install with `route_layer` so the
    /// matched path is known.
    pub async fn track(State(metrics): State<Arc<Metrics>>, req: Request, next: Next) -> Response {
        let method = req.method().to_string();
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_else(|| "unmatched".to_owned());
        let resp = next.run(req).await;
        metrics.record(&method, &route, resp.status().as_u16());
        resp
    }
}
