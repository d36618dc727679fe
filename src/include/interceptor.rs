//! Response interception.
//!
//! # Data Flow
//! ```text
//! handler response
//!     → include_middleware (JSON only, once per request)
//!     → IncludeEngine::emit
//!         → IncludeSpec::from_query
//!         → ObjectExpander (object or array)
//!     → original emitter (rebuilds the response)
//!   or
//!     → InclusionFailure (500, nothing of the payload is sent)
//! ```
//!
//! # Design Decisions
//! - The emitter is a decorator over a closure, not a patched method
//! - The install guard lives in the request's extensions
//! - Payloads with nothing resolvable are re-sent byte for byte

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;

use crate::config::IncludeConfig;
use crate::include::error::{IncludeError, InclusionFailure};
use crate::include::expander::ObjectExpander;
use crate::include::fetcher::{AllowedHeaders, HttpTransport, LinkFetcher, Transport};
use crate::include::query::IncludeSpec;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Arguments of an emission call.
///
/// Mirrors the two call shapes `emit(body)` and `emit(status, body)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    Body(Value),
    Status(StatusCode, Value),
}

impl Emit {
    /// Split into `(status, body)`, defaulting the status to 200.
    pub fn normalize(self) -> (StatusCode, Value) {
        match self {
            Emit::Body(body) => (StatusCode::OK, body),
            Emit::Status(status, body) => (status, body),
        }
    }
}

impl From<Value> for Emit {
    fn from(body: Value) -> Self {
        Emit::Body(body)
    }
}

impl From<(StatusCode, Value)> for Emit {
    fn from((status, body): (StatusCode, Value)) -> Self {
        Emit::Status(status, body)
    }
}

/// What a single request asked for: its include set and its headers.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    pub includes: IncludeSpec,
    pub headers: HeaderMap,
}

impl RequestScope {
    pub fn new(includes: IncludeSpec, headers: HeaderMap) -> Self {
        Self { includes, headers }
    }

    pub fn from_request(request: &Request) -> Self {
        Self::new(
            IncludeSpec::from_query(request.uri().query()),
            request.headers().clone(),
        )
    }
}

/// Marker placed in request extensions once the interceptor is installed.
#[derive(Debug, Clone, Copy)]
pub struct IncludeInstalled;

/// Shared include engine: configuration plus the outbound transport.
#[derive(Debug, Clone)]
pub struct IncludeEngine {
    fetcher: LinkFetcher,
    max_concurrent_fetches: Option<usize>,
    max_body_bytes: usize,
}

impl IncludeEngine {
    pub fn new(
        fetcher: LinkFetcher,
        max_concurrent_fetches: Option<usize>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            fetcher,
            max_concurrent_fetches,
            max_body_bytes,
        }
    }

    /// Build an engine with the `reqwest` transport.
    pub fn from_config(config: &IncludeConfig) -> Result<Self, header::InvalidHeaderName> {
        let transport = HttpTransport::new(config.reject_error_status);
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build an engine with a caller-supplied transport.
    pub fn with_transport(
        config: &IncludeConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, header::InvalidHeaderName> {
        let allowed = AllowedHeaders::parse(&config.headers)?;
        Ok(Self::new(
            LinkFetcher::new(transport, allowed),
            config.max_concurrent_fetches,
            config.max_body_bytes,
        ))
    }

    /// Expand `args` for `scope`, then hand the result to `original`.
    ///
    /// `original` runs at most once and only with a fully expanded payload.
    /// With no includes requested it runs immediately without any fetch.
    pub async fn emit<F, R>(
        &self,
        scope: &RequestScope,
        args: impl Into<Emit>,
        original: F,
    ) -> Result<R, InclusionFailure>
    where
        F: FnOnce(StatusCode, Value) -> R,
    {
        let (status, body) = args.into().normalize();
        let (_, body) = self.resolve(scope, body).await?;
        Ok(original(status, body))
    }

    /// Expand `body` in place. Returns it along with the number of merged fields.
    async fn resolve(
        &self,
        scope: &RequestScope,
        mut body: Value,
    ) -> Result<(usize, Value), InclusionFailure> {
        if scope.includes.is_empty() {
            return Ok((0, body));
        }

        let expander = ObjectExpander::new(&self.fetcher, self.max_concurrent_fetches);
        let merged = expander
            .expand(&mut body, &scope.includes, &scope.headers)
            .await
            .inspect_err(|_| metrics::record_inclusion_failure())?;
        Ok((merged, body))
    }
}

/// Install the include middleware on `router`.
pub fn with_includes<S>(router: Router<S>, engine: Arc<IncludeEngine>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(engine, include_middleware))
}

/// Axum middleware that expands `<name>_url` links in JSON responses.
///
/// A request already carrying [`IncludeInstalled`] passes straight through.
pub async fn include_middleware(
    State(engine): State<Arc<IncludeEngine>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<IncludeInstalled>().is_some() {
        return next.run(request).await;
    }
    request.extensions_mut().insert(IncludeInstalled);

    let scope = RequestScope::from_request(&request);
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;
    if scope.includes.is_empty() || !is_json(response.headers()) {
        return response;
    }

    match engine.expand_response(&scope, response).await {
        Ok(response) => response,
        Err(failure) => {
            tracing::error!(request_id = %request_id, error = %failure, "Include failed");
            failure.into_response()
        }
    }
}

impl IncludeEngine {
    async fn expand_response(
        &self,
        scope: &RequestScope,
        response: Response,
    ) -> Result<Response, InclusionFailure> {
        let (mut parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| IncludeError::Payload(e.to_string()))?;

        let payload: Value = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Response is not valid JSON; skipping includes");
                return Ok(Response::from_parts(parts, Body::from(bytes)));
            }
        };

        let (merged, payload) = self.resolve(scope, payload).await?;
        if merged == 0 {
            return Ok(Response::from_parts(parts, Body::from(bytes)));
        }

        let encoded: Bytes = serde_json::to_vec(&payload)
            .map_err(|e| IncludeError::Payload(e.to_string()))?
            .into();
        parts.headers.remove(header::CONTENT_LENGTH);
        Ok(Response::from_parts(parts, Body::from(encoded)))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
