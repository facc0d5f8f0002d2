//! Typed JSON client for one microservice.
//!
//! # Responsibilities
//! - Build URLs against the service's base URL
//! - Retry idempotent calls with backoff under the shared retry budget
//! - Turn non-2xx responses into `UpstreamError::Status` carrying the JSON body
//! - Record per-service metrics

use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use reqwest::{RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::{calculate_backoff, is_retryable, RetryBudget};

/// Failure of a call to a microservice.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The service answered with a non-success status.
    #[error("{service} responded with status {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: Value,
    },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unexpected body: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Client bound to a single microservice base URL.
#[derive(Clone)]
pub struct ServiceClient {
    service: &'static str,
    base_url: String,
    http: reqwest::Client,
    retry: RetryConfig,
    budget: Arc<RetryBudget>,
}

impl ServiceClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        http: reqwest::Client,
        retry: RetryConfig,
        budget: Arc<RetryBudget>,
    ) -> Self {
        Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            retry,
            budget,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let request = self.http.get(self.url(path)).query(query);
        let response = self.send(Method::GET, request).await?;
        self.decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send(Method::POST, request).await?;
        self.decode(response).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let request = self.http.post(self.url(path)).form(form);
        let response = self.send(Method::POST, request).await?;
        self.decode(response).await
    }

    /// POST whose response body is irrelevant.
    pub async fn post_json_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), UpstreamError> {
        let request = self.http.post(self.url(path)).json(body);
        self.send(Method::POST, request).await.map(drop)
    }

    pub async fn delete<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), UpstreamError> {
        let mut request = self.http.delete(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(Method::DELETE, request).await.map(drop)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, UpstreamError> {
        response.json::<T>().await.map_err(|source| UpstreamError::Decode {
            service: self.service,
            source,
        })
    }

    async fn send(&self, method: Method, request: RequestBuilder) -> Result<Response, UpstreamError> {
        let start = Instant::now();
        let max_attempts = if self.retry.enabled {
            self.retry.max_attempts.max(1)
        } else {
            1
        };
        self.budget.record_request();

        let mut attempt = 0;
        loop {
            attempt += 1;

            // Bodies here are always buffered, so cloning only fails for streams.
            let Some(current) = request.try_clone() else {
                return self.finish(request.send().await, start).await;
            };

            match current.send().await {
                Ok(response) => {
                    let status = response.status();
                    if attempt < max_attempts
                        && is_retryable(&method, Some(status), false)
                        && self.budget.can_retry()
                    {
                        self.pause(attempt, Some(status)).await;
                        continue;
                    }
                    return self.finish(Ok(response), start).await;
                }
                Err(e) => {
                    if attempt < max_attempts
                        && is_retryable(&method, None, true)
                        && self.budget.can_retry()
                    {
                        tracing::debug!(service = self.service, error = %e, "Upstream transport error");
                        self.pause(attempt, None).await;
                        continue;
                    }
                    return self.finish(Err(e), start).await;
                }
            }
        }
    }

    async fn pause(&self, attempt: u32, status: Option<StatusCode>) {
        let delay = calculate_backoff(attempt, &self.retry);
        tracing::info!(
            service = self.service,
            attempt,
            delay = ?delay,
            status = ?status,
            "Retrying upstream request"
        );
        metrics::record_retry(self.service);
        tokio::time::sleep(delay).await;
    }

    async fn finish(
        &self,
        result: Result<Response, reqwest::Error>,
        start: Instant,
    ) -> Result<Response, UpstreamError> {
        match result {
            Ok(response) if response.status().is_success() => {
                metrics::record_upstream(self.service, "success", start);
                Ok(response)
            }
            Ok(response) => {
                let status = response.status();
                metrics::record_upstream(self.service, "status", start);
                tracing::debug!(service = self.service, status = %status, "Upstream returned error status");
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                Err(UpstreamError::Status {
                    service: self.service,
                    status,
                    body,
                })
            }
            Err(source) => {
                metrics::record_upstream(self.service, "error", start);
                tracing::warn!(service = self.service, error = %source, "Upstream request failed");
                Err(UpstreamError::Transport {
                    service: self.service,
                    source,
                })
            }
        }
    }
}
