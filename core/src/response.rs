//! The response envelope returned by the transport core.
//!
//! # Design
//! An `ApiResponse` is built once per exchange and never mutated. A non-2xx
//! status is not an error at this level: callers either inspect the envelope
//! or ask for value-or-error semantics through
//! [`ApiResponse::into_data_or_throw`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    data: Option<T>,
    success: bool,
    status_code: u16,
    message: String,
    timestamp: DateTime<Utc>,
    headers: HashMap<String, String>,
    raw_body: String,
}

impl<T> ApiResponse<T> {
    /// `data` must already be `None` unless the status is 2xx.
    pub(crate) fn new(
        data: Option<T>,
        status_code: u16,
        message: String,
        headers: HashMap<String, String>,
        raw_body: String,
    ) -> Self {
        let success = is_success_status(status_code);
        Self {
            data: if success { data } else { None },
            success,
            status_code,
            message,
            timestamp: Utc::now(),
            headers,
            raw_body,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The server's reason phrase.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Fail with `RequestFailed` when the status is outside 2xx.
    pub fn throw_if_error(&self) -> Result<()> {
        if self.success {
            return Ok(());
        }
        Err(ClientError::RequestFailed {
            status: self.status_code,
            message: self.message.clone(),
            body: self.raw_body.clone(),
        })
    }

    /// The payload, or an error if the request failed or returned no body.
    pub fn into_data_or_throw(self) -> Result<T> {
        self.throw_if_error()?;
        match self.data {
            Some(data) => Ok(data),
            None => Err(ClientError::Serialization {
                target: std::any::type_name::<T>(),
                raw: self.raw_body,
                source: <serde_json::Error as serde::de::Error>::custom(
                    "response body was empty",
                ),
            }),
        }
    }
}

pub(crate) fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}
