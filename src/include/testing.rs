//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::include::error::BoxError;
use crate::include::fetcher::Transport;

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
struct Script {
    result: Result<String, String>,
    delay: Duration,
}

/// Answers GETs from a fixed table and records every call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.script(url, Ok(body.to_string()), Duration::ZERO)
    }

    pub fn ok_after(self, url: &str, body: &str, delay: Duration) -> Self {
        self.script(url, Ok(body.to_string()), delay)
    }

    pub fn fail(self, url: &str, message: &str) -> Self {
        self.script(url, Err(message.to_string()), Duration::ZERO)
    }

    fn script(mut self, url: &str, result: Result<String, String>, delay: Duration) -> Self {
        self.scripts.insert(url.to_string(), Script { result, delay });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<String, BoxError> {
        self.calls.lock().expect("calls mutex poisoned").push(Call {
            url: url.to_string(),
            headers,
        });

        let script = self
            .scripts
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no route to {url}"))?;
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        script.result.map_err(Into::into)
    }
}
