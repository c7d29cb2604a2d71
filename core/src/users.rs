//! User repository and the live `User` record.

use std::sync::{Arc, Weak};

use crate::error::{require_id, ClientError, Result};
use crate::transport::Transport;
use crate::types::{Email, UserData};

pub const USERS_ENDPOINT: &str = "/api/nexus/users";

/// Typed access to `/api/nexus/users`.
#[derive(Clone)]
pub struct UserRepository {
    transport: Arc<Transport>,
}

impl UserRepository {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// All users visible to the vendor. An empty array yields an empty `Vec`.
    pub fn get_users(&self) -> Result<Vec<User>> {
        let users: Vec<UserData> = self.transport.get(USERS_ENDPOINT)?.into_data_or_throw()?;
        tracing::debug!(count = users.len(), "fetched users");
        Ok(users.into_iter().map(|data| self.bind(data)).collect())
    }

    /// Fetch one user. Blank ids fail before any request is sent.
    pub fn get_user(&self, user_id: &str) -> Result<User> {
        let user_id = require_id(user_id, "User")?;
        let data: UserData = self
            .transport
            .get(&format!("{USERS_ENDPOINT}/{user_id}"))?
            .into_data_or_throw()?;
        Ok(self.bind(data))
    }

    /// Send an email to a user and return the server's verdict.
    ///
    /// A `None` payload is rejected without a request.
    pub fn send_email(&self, user_id: &str, email: Option<&Email>) -> Result<bool> {
        let user_id = require_id(user_id, "User")?;
        let email = require_email(email)?;
        self.transport
            .post(&format!("{USERS_ENDPOINT}/{user_id}/send-email"), Some(email))?
            .into_data_or_throw()
    }

    fn bind(&self, data: UserData) -> User {
        User {
            data,
            transport: Arc::downgrade(&self.transport),
        }
    }
}

fn require_email(email: Option<&Email>) -> Result<&Email> {
    email.ok_or_else(|| ClientError::validation("Email cannot be null"))
}

/// A user bound to the client that fetched it.
///
/// Holds only a weak handle: once the client is dropped, calls that need the
/// network fail with `Closed`.
#[derive(Debug, Clone)]
pub struct User {
    data: UserData,
    transport: Weak<Transport>,
}

impl User {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn username(&self) -> &str {
        &self.data.username
    }

    pub fn email(&self) -> &str {
        &self.data.email
    }

    pub fn first_name(&self) -> &str {
        &self.data.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.data.last_name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.data.avatar.as_deref()
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn into_data(self) -> UserData {
        self.data
    }

    pub fn send_email(&self, email: Option<&Email>) -> Result<bool> {
        let email = require_email(email)?;
        self.repository()?.send_email(self.id(), Some(email))
    }

    /// Re-fetch this user from the server.
    pub fn refresh(&self) -> Result<User> {
        self.repository()?.get_user(self.id())
    }

    fn repository(&self) -> Result<UserRepository> {
        self.transport
            .upgrade()
            .map(UserRepository::new)
            .ok_or(ClientError::Closed)
    }
}
