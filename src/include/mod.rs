//! Include resolution subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/cars?include=manufacturer
//!     → interceptor.rs (wraps the response emission once per request)
//!     → query.rs (include=manufacturer → {"manufacturer"})
//!     → expander.rs (manufacturer_url present? schedule a fetch)
//!     → fetcher.rs (GET manufacturer_url with allow-listed headers)
//!     → merged payload → emitted response
//! ```
//!
//! # Design Decisions
//! - Only one level of expansion; fetched values are never expanded
//! - No caching or deduplication of identical URLs
//! - All-or-nothing: the first failure fails the whole response

pub mod error;
pub mod expander;
pub mod fetcher;
pub mod interceptor;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{IncludeError, InclusionFailure};
pub use expander::{FetchJob, ObjectExpander};
pub use fetcher::{AllowedHeaders, HttpTransport, LinkFetcher, Transport};
pub use interceptor::{include_middleware, with_includes, Emit, IncludeEngine, RequestScope};
pub use query::IncludeSpec;
