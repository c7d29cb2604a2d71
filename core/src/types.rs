//! Wire DTOs for the Nexus API.
//!
//! # Design
//! These mirror the server's JSON (camelCase keys) and carry no behaviour.
//! The live `User`/`Service` records that can call back into the API wrap
//! these in `users` and `services`.

use serde::{Deserialize, Serialize};

/// A user as returned by `/api/nexus/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A vendor service as returned by `/api/vendor/services`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceData {
    pub id: String,
    pub name: String,
}

/// Payload for `POST /api/nexus/users/{id}/send-email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_html: bool,
}

impl Email {
    /// Plain-text email.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            is_html: false,
        }
    }

    pub fn html(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            is_html: true,
            ..Self::new(subject, body)
        }
    }
}
