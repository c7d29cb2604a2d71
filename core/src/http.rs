//! HTTP request/response data and the executor seam.
//!
//! # Design
//! Requests and responses are plain owned data. The transport core builds an
//! `HttpRequest`, hands it to an [`Executor`] for the network round-trip, and
//! classifies the returned `HttpResponse`. `UreqExecutor` is the blocking
//! production executor; tests plug in scripted executors instead.

use std::time::Duration;

use crate::error::BoxError;

pub const HEADER_VENDOR_ID: &str = "X-Vendor-Id";
pub const HEADER_VENDOR_TOKEN: &str = "X-Vendor-Access-Token";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. `"Not Found"`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Performs one HTTP round-trip.
///
/// Non-2xx statuses are returned as data, never as `Err`. An `Err` means the
/// exchange itself failed (DNS, connect, timeout, broken body).
pub trait Executor: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Blocking executor backed by a pooled `ureq` agent.
pub struct UreqExecutor {
    agent: ureq::Agent,
}

impl UreqExecutor {
    pub fn new(connection_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(connection_timeout))
            .timeout_recv_response(Some(read_timeout))
            .timeout_recv_body(Some(read_timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Executor for UreqExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            HttpMethod::Post => {
                send_body(with_headers(self.agent.post(url), &request.headers), request)
            }
            HttpMethod::Put => {
                send_body(with_headers(self.agent.put(url), &request.headers), request)
            }
        };
        let mut response = result?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match request.body.as_deref() {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
