//! Retrying HTTP client for the backend service.
//!
//! The backend is a stateless remote endpoint that may be briefly
//! unavailable; every call goes through a bounded retry loop. Retry is
//! policy here, never control flow in the relay: callers see a plain
//! `(body, error)` outcome after the attempts are spent.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::{BackendConfig, RetryConfig};
use crate::observability::{stats, Stats};
use crate::resilience::retry_delay;

/// Shared client for all backend traffic.
///
/// Connection pooling is per-host inside the underlying `reqwest::Client`,
/// so one instance serves every session.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
    retries: RetryConfig,
    stats: Arc<Stats>,
}

impl BackendClient {
    pub fn new(
        config: &BackendConfig,
        retries: RetryConfig,
        stats: Arc<Stats>,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            client,
            retries,
            stats,
        })
    }

    /// Authorization probe at upgrade time: `GET /<address>`.
    pub async fn authorize(&self, address: &str) -> Result<Bytes, BackendError> {
        self.fetch(Method::GET, self.url(address), None).await
    }

    /// Forward a client-initiated CALL: `POST /call/<action>/<address>/<id>`.
    pub async fn call(
        &self,
        action: &str,
        address: &str,
        id: &str,
        frame: &str,
    ) -> Result<Bytes, BackendError> {
        let url = self.url(&format!("call/{action}/{address}/{id}"));
        self.fetch(Method::POST, url, Some(frame.to_owned())).await
    }

    /// Deliver a CALLRESULT: `POST /result/<action>/<address>/<id>`.
    pub async fn forward_result(
        &self,
        action: &str,
        address: &str,
        id: &str,
        frame: &str,
    ) -> Result<Bytes, BackendError> {
        let url = self.url(&format!("result/{action}/{address}/{id}"));
        self.fetch(Method::POST, url, Some(frame.to_owned())).await
    }

    /// Deliver a CALLERROR: `POST /error/<action>/<address>/<id>`.
    pub async fn forward_error(
        &self,
        action: &str,
        address: &str,
        id: &str,
        frame: &str,
    ) -> Result<Bytes, BackendError> {
        let url = self.url(&format!("error/{action}/{address}/{id}"));
        self.fetch(Method::POST, url, Some(frame.to_owned())).await
    }

    /// Close notification: `DELETE /<address>` with the reason as the body.
    pub async fn disconnected(&self, address: &str, reason: &str) -> Result<Bytes, BackendError> {
        self.fetch(Method::DELETE, self.url(address), Some(reason.to_owned()))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One logical fetch: up to `retries.attempts` tries with jittered
    /// delays in between. Any transport error or non-2xx status is
    /// retryable; a 2xx never is. Returns the last error on exhaustion.
    async fn fetch(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
    ) -> Result<Bytes, BackendError> {
        self.stats.increment(stats::REQUESTS_STARTED);
        let mut attempt = 1u32;
        let result = loop {
            match self.attempt(method.clone(), &url, body.as_deref()).await {
                Ok(bytes) => break Ok(bytes),
                Err(err) if attempt < self.retries.attempts => {
                    debug!(%url, %err, attempt, "backend call failed, retrying");
                    tokio::time::sleep(retry_delay(
                        self.retries.base_delay_ms,
                        self.retries.max_jitter_ms,
                    ))
                    .await;
                    attempt += 1;
                }
                Err(err) => break Err(err),
            }
        };
        match result {
            Ok(bytes) => {
                self.stats.increment(stats::REQUESTS_SUCCEEDED);
                Ok(bytes)
            }
            Err(err) => {
                self.stats.increment(stats::REQUESTS_FAILED);
                Err(err)
            }
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<Bytes, BackendError> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_owned());
        }
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

/// Errors from backend calls, after retries are exhausted.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request never completed (connect failure, timeout, broken pool).
    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}
