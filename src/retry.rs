//! Fixed-schedule retry for outbound HTTP calls.
//!
//! Both the GitHub and the Anthropic clients send every request through
//! [`RetryPolicy::execute`]. A request is retried on transport errors and on a
//! configurable set of transient statuses; anything else ends the loop. When
//! the schedule runs out the last response (or transport error) is handed back
//! as-is, so callers keep treating a non-success status as their own error.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Request, Response, StatusCode};
use serde::Serialize;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;
use crate::error::{Result, SummarizeError};

/// Everything needed to send the same request more than once.
///
/// The body is kept as serialized bytes and copied into each attempt, since a
/// sent body cannot be read again.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            SummarizeError::RequestBuild(format!("invalid value for header {}: {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn static_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(payload)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Builds a fresh request for one attempt. An unusable URL fails here,
    /// before anything is sent.
    fn prepare(&self, client: &Client) -> Result<Request> {
        let builder = client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone());
        let builder = match &self.body {
            Some(bytes) => builder.body(bytes.clone()),
            None => builder,
        };
        builder.build().map_err(|e| {
            SummarizeError::RequestBuild(format!("invalid request to {}: {}", self.url, e))
        })
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    schedule: Vec<Duration>,
    transient: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        let transient = config
            .transient_statuses
            .iter()
            .filter_map(|code| StatusCode::from_u16(*code).ok())
            .collect();
        Self::new(config.schedule(), transient)
    }
}

impl RetryPolicy {
    /// An empty schedule still makes one attempt.
    pub fn new(schedule: Vec<Duration>, transient: Vec<StatusCode>) -> Self {
        let schedule = if schedule.is_empty() {
            vec![Duration::ZERO]
        } else {
            schedule
        };
        Self {
            schedule,
            transient,
        }
    }

    pub fn attempts(&self) -> usize {
        self.schedule.len()
    }

    pub fn schedule(&self) -> &[Duration] {
        &self.schedule
    }

    pub fn is_transient(&self, status: StatusCode) -> bool {
        self.transient.contains(&status)
    }

    /// Sends `request`, retrying per the schedule.
    ///
    /// Returns `Err(NetworkError)` only when the last attempt failed at the
    /// transport level, and `Err(Cancelled)` as soon as `cancel` fires. A
    /// request that cannot be built is `Err(RequestBuild)` and never retried.
    pub async fn execute(
        &self,
        client: &Client,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SummarizeError::Cancelled);
            }
            let prepared = request.prepare(client)?;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SummarizeError::Cancelled),
                outcome = client.execute(prepared) => outcome,
            };
            attempt += 1;

            let retryable = match &outcome {
                Ok(response) => self.is_transient(response.status()),
                Err(_) => true,
            };

            if !retryable || attempt >= self.schedule.len() {
                return outcome.map_err(SummarizeError::NetworkError);
            }

            let wait = self.schedule[attempt];
            match &outcome {
                Ok(response) => debug!(
                    "{} {} returned {} (attempt {}/{}), retrying in {:?}",
                    request.method,
                    request.url,
                    response.status(),
                    attempt,
                    self.schedule.len(),
                    wait
                ),
                Err(e) => debug!(
                    "{} {} failed (attempt {}/{}): {}, retrying in {:?}",
                    request.method,
                    request.url,
                    attempt,
                    self.schedule.len(),
                    e,
                    wait
                ),
            }
            drop(outcome);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SummarizeError::Cancelled),
                _ = sleep(wait) => {}
            }
        }
    }
}

/// Reads a response body, giving up early if `cancel` fires.
pub async fn read_body(response: Response, cancel: &CancellationToken) -> Result<Vec<u8>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SummarizeError::Cancelled),
        body = response.bytes() => Ok(body?.to_vec()),
    }
}
