//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo catalog and health handlers
//! - Wire up middleware (tracing, timeout, request ID, includes)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{http::header::InvalidHeaderName, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::resources::{self, Catalog};
use crate::include::{with_includes, IncludeEngine};

/// HTTP server for the demo API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, InvalidHeaderName> {
        let engine = Arc::new(IncludeEngine::from_config(&config.include)?);
        Ok(Self::with_engine(config, engine))
    }

    /// Create a server around an existing include engine.
    pub fn with_engine(config: AppConfig, engine: Arc<IncludeEngine>) -> Self {
        let catalog = Arc::new(Catalog::demo(&config.catalog.public_base_url));
        let router = Self::build_router(&config, catalog, engine);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The timeout bounds the handlers only. It sits inside the include
    /// middleware so linked fetches are never cut short by it.
    #[allow(deprecated)]
    fn build_router(
        config: &AppConfig,
        catalog: Arc<Catalog>,
        engine: Arc<IncludeEngine>,
    ) -> Router {
        let api = resources::routes(catalog)
            .route("/health", get(|| async { "ok" }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        with_includes(api, engine)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IncludeConfig;
    use crate::include::testing::ScriptedTransport;
    use axum::{body::Body, http::StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn slow_includes_outlive_the_handler_timeout() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 1;
        config.catalog.public_base_url = "http://catalog.test".to_string();

        let transport = Arc::new(ScriptedTransport::new().ok_after(
            "http://catalog.test/api/manufacturers/tesla",
            r#"{"id":"tesla","name":"Tesla"}"#,
            Duration::from_millis(1500),
        ));
        let engine =
            Arc::new(IncludeEngine::with_transport(&IncludeConfig::default(), transport).unwrap());
        let server = HttpServer::with_engine(config, engine);

        let response = server
            .router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/cars/1?include=manufacturer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["manufacturer"], json!({"id": "tesla", "name": "Tesla"}));
    }
}
