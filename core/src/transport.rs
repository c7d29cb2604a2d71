//! The request/response pipeline shared by every repository.
//!
//! # Design
//! `Transport` holds the frozen config, the executor (connection pool) and
//! the metrics. Each call: stamp the vendor headers, encode the body, time
//! the round-trip, record metrics, then decode the body into the expected
//! shape. There is no retry here; a transport failure is returned as-is.
//!
//! `close()` drops the executor, releasing its connection pool. Every later
//! call fails with `Closed`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{
    Executor, HttpMethod, HttpRequest, HttpResponse, HEADER_VENDOR_ID, HEADER_VENDOR_TOKEN,
};
use crate::metrics::ClientMetrics;
use crate::response::{is_success_status, ApiResponse};

/// Whether the caller wants the body decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Payload,
    NoContent,
}

pub struct Transport {
    config: ClientConfig,
    executor: RwLock<Option<Arc<dyn Executor>>>,
    metrics: ClientMetrics,
}

impl Transport {
    pub fn new(config: ClientConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            executor: RwLock::new(Some(executor)),
            metrics: ClientMetrics::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// The live executor, or `Closed` once the transport has been closed.
    pub(crate) fn executor(&self) -> Result<Arc<dyn Executor>> {
        self.executor.read().as_ref().cloned().ok_or(ClientError::Closed)
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.send(HttpMethod::Get, endpoint, None, Expect::Payload)
    }

    pub fn get_empty(&self, endpoint: &str) -> Result<ApiResponse<()>> {
        self.send(HttpMethod::Get, endpoint, None, Expect::NoContent)
    }

    pub fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.send(HttpMethod::Post, endpoint, body, Expect::Payload)
    }

    pub fn post_empty<B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<()>>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.send(HttpMethod::Post, endpoint, body, Expect::NoContent)
    }

    pub fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.send(HttpMethod::Put, endpoint, body, Expect::Payload)
    }

    pub fn put_empty<B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<()>>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.send(HttpMethod::Put, endpoint, body, Expect::NoContent)
    }

    pub fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.send(HttpMethod::Delete, endpoint, None, Expect::Payload)
    }

    pub fn delete_empty(&self, endpoint: &str) -> Result<ApiResponse<()>> {
        self.send(HttpMethod::Delete, endpoint, None, Expect::NoContent)
    }

    /// The two vendor authentication headers.
    pub(crate) fn auth_headers(&self) -> Vec<(String, String)> {
        auth_headers(&self.config)
    }

    pub fn is_closed(&self) -> bool {
        self.executor.read().is_none()
    }

    /// Drop the executor. Returns `true` only for the first call.
    pub(crate) fn close(&self) -> bool {
        self.executor.write().take().is_some()
    }

    fn build_request(&self, method: HttpMethod, endpoint: &str, body: Option<String>) -> HttpRequest {
        let mut headers = self.auth_headers();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: format!("{}{}", self.config.base_url(), endpoint),
            headers,
            body,
        }
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        expect: Expect,
    ) -> Result<ApiResponse<T>> {
        let executor = self.executor()?;
        let request = self.build_request(method, endpoint, body);
        if self.config.logging_enabled() {
            tracing::debug!(method = method.as_str(), url = %request.url, "executing request");
        }
        let response = self.exchange(executor.as_ref(), &request)?;
        decode(response, expect, self.config.logging_enabled())
    }

    fn exchange(&self, executor: &dyn Executor, request: &HttpRequest) -> Result<HttpResponse> {
        let started = Instant::now();
        let outcome = executor.execute(request);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let logging = self.config.logging_enabled();

        match outcome {
            Ok(response) if is_success_status(response.status) => {
                self.metrics.record_success(elapsed_ms);
                if logging {
                    tracing::debug!(
                        url = %request.url,
                        status = response.status,
                        elapsed_ms,
                        "request completed"
                    );
                }
                Ok(response)
            }
            Ok(response) => {
                self.metrics.record_failure(elapsed_ms);
                if logging {
                    tracing::warn!(
                        url = %request.url,
                        status = response.status,
                        elapsed_ms,
                        "request failed"
                    );
                }
                Ok(response)
            }
            Err(source) => {
                self.metrics.record_failure(elapsed_ms);
                if logging {
                    tracing::error!(url = %request.url, elapsed_ms, error = %source, "HTTP request failed");
                }
                Err(ClientError::Transport {
                    url: request.url.clone(),
                    source,
                })
            }
        }
    }
}

pub(crate) fn auth_headers(config: &ClientConfig) -> Vec<(String, String)> {
    vec![
        (HEADER_VENDOR_ID.to_string(), config.vendor_id().to_string()),
        (HEADER_VENDOR_TOKEN.to_string(), config.token().to_string()),
    ]
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<Option<String>> {
    body.map(|body| {
        serde_json::to_string(body).map_err(|source| ClientError::Serialization {
            target: std::any::type_name::<B>(),
            raw: String::new(),
            source,
        })
    })
    .transpose()
}

fn decode<T: DeserializeOwned>(
    response: HttpResponse,
    expect: Expect,
    logging: bool,
) -> Result<ApiResponse<T>> {
    let HttpResponse {
        status,
        reason,
        headers,
        body,
    } = response;

    let data = if expect == Expect::Payload
        && is_success_status(status)
        && !body.trim().is_empty()
    {
        let parsed = serde_json::from_str(&body).map_err(|source| {
            if logging {
                tracing::error!(status, error = %source, "failed to parse response body");
            }
            ClientError::Serialization {
                target: std::any::type_name::<T>(),
                raw: body.clone(),
                source,
            }
        })?;
        Some(parsed)
    } else {
        None
    };

    let headers: HashMap<String, String> = headers.into_iter().collect();
    Ok(ApiResponse::new(data, status, reason, headers, body))
}
