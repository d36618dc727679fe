//! Object expansion.
//!
//! Fan-out is two levels deep: across the elements of an array payload, and
//! within each object across its resolvable fields. Both levels are joined
//! with `try_join_all`, so the first failure wins and the remaining futures
//! are dropped.

use axum::http::HeaderMap;
use futures_util::future::try_join_all;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;

use crate::include::error::IncludeError;
use crate::include::fetcher::LinkFetcher;
use crate::include::query::IncludeSpec;

/// Suffix of the sibling property holding a relation's URL.
pub const URL_SUFFIX: &str = "_url";

/// One outbound fetch scheduled for a single object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub field: String,
    pub url: String,
}

/// Fields of `obj` that can be resolved for `fields`.
///
/// `name` is resolvable when `obj` has a non-empty string `name_url`.
pub fn fetch_jobs(obj: &Map<String, Value>, fields: &IncludeSpec) -> Vec<FetchJob> {
    fields
        .iter()
        .filter_map(|field| {
            match obj.get(&format!("{field}{URL_SUFFIX}")) {
                Some(Value::String(url)) if !url.is_empty() => Some(FetchJob {
                    field: field.to_string(),
                    url: url.clone(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Expands `<name>_url` links on a single request's payload.
///
/// Built per request; the optional semaphore caps in-flight fetches across
/// both fan-out levels.
#[derive(Debug)]
pub struct ObjectExpander<'a> {
    fetcher: &'a LinkFetcher,
    permits: Option<Semaphore>,
}

impl<'a> ObjectExpander<'a> {
    pub fn new(fetcher: &'a LinkFetcher, max_concurrent_fetches: Option<usize>) -> Self {
        Self {
            fetcher,
            permits: max_concurrent_fetches
                .map(|limit| Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS))),
        }
    }

    /// Expand an object or an array of objects in place.
    ///
    /// Returns the number of fields merged. Other JSON values are left alone.
    pub async fn expand(
        &self,
        payload: &mut Value,
        fields: &IncludeSpec,
        headers: &HeaderMap,
    ) -> Result<usize, IncludeError> {
        match payload {
            Value::Array(items) => self.expand_many(items, fields, headers).await,
            Value::Object(obj) => self.expand_one(obj, fields, headers).await,
            _ => Ok(0),
        }
    }

    /// Resolve every requested field of `obj` concurrently.
    ///
    /// Nothing is written to `obj` unless all of its fetches succeed.
    pub async fn expand_one(
        &self,
        obj: &mut Map<String, Value>,
        fields: &IncludeSpec,
        headers: &HeaderMap,
    ) -> Result<usize, IncludeError> {
        let jobs = fetch_jobs(obj, fields);
        if jobs.is_empty() {
            return Ok(0);
        }

        let fetched = try_join_all(jobs.iter().map(|job| self.run(job, headers))).await?;

        let merged = jobs.len();
        for (job, value) in jobs.into_iter().zip(fetched) {
            obj.insert(job.field, value);
        }
        Ok(merged)
    }

    /// Expand every element of `objs` concurrently.
    pub async fn expand_many(
        &self,
        objs: &mut [Value],
        fields: &IncludeSpec,
        headers: &HeaderMap,
    ) -> Result<usize, IncludeError> {
        if fields.is_empty() {
            return Ok(0);
        }

        let merged = try_join_all(objs.iter_mut().map(|item| async move {
            match item {
                Value::Object(obj) => self.expand_one(obj, fields, headers).await,
                _ => Ok(0),
            }
        }))
        .await?;
        Ok(merged.into_iter().sum())
    }

    async fn run(&self, job: &FetchJob, headers: &HeaderMap) -> Result<Value, IncludeError> {
        // A closed semaphore only means no cap.
        let _permit = match &self.permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        };

        self.fetcher.fetch(&job.url, headers).await.inspect_err(|e| {
            tracing::warn!(field = %job.field, url = %job.url, error = %e, "Include fetch failed");
        })
    }
}
