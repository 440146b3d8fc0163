//! # api-adapters
//!
//! The HTTP surface. Handlers translate requests into service calls and
//! wrap every result in the `{code, msg, data}` envelope.

#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod response;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use response::{ApiError, ApiResponse, ApiResult};
#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::{AppState, CookiePolicy};
