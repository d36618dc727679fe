//! Response include expansion for JSON HTTP APIs.
//!
//! `GET /api/cars?include=manufacturer` fetches every `manufacturer_url`
//! found in the response and stores the result under `manufacturer`.

pub mod config;
pub mod http;
pub mod include;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use include::{with_includes, IncludeEngine, IncludeSpec};
pub use lifecycle::Shutdown;
