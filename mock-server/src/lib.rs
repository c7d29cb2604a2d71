use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const VENDOR_ID_HEADER: &str = "x-vendor-id";
pub const VENDOR_TOKEN_HEADER: &str = "x-vendor-access-token";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_html: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SentEmail {
    pub id: Uuid,
    pub user_id: String,
    pub email: Email,
}

type Db<T> = Arc<RwLock<HashMap<String, T>>>;

/// Shared state behind the mock API.
#[derive(Clone)]
pub struct MockState {
    vendor_id: Arc<str>,
    token: Arc<str>,
    users: Db<User>,
    services: Db<Service>,
    outbox: Arc<RwLock<Vec<SentEmail>>>,
    failing_pings: Arc<AtomicUsize>,
    pings: Arc<AtomicUsize>,
}

impl MockState {
    /// Empty state accepting only the given credentials.
    pub fn new(vendor_id: &str, token: &str) -> Self {
        Self {
            vendor_id: Arc::from(vendor_id),
            token: Arc::from(token),
            users: Db::default(),
            services: Db::default(),
            outbox: Arc::default(),
            failing_pings: Arc::default(),
            pings: Arc::default(),
        }
    }

    /// State pre-populated with a couple of users and services.
    pub fn seeded(vendor_id: &str, token: &str) -> Self {
        Self::new(vendor_id, token)
            .with_users(vec![
                User {
                    id: "b699523a-d185-432a-a58e-2ddbebecc8e3".to_string(),
                    username: "ada".to_string(),
                    email: "ada@example.com".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    avatar: Some("https://cdn.example.com/ada.png".to_string()),
                },
                User {
                    id: "u-grace".to_string(),
                    username: "grace".to_string(),
                    email: "grace@example.com".to_string(),
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    avatar: None,
                },
            ])
            .with_services(vec![
                Service {
                    id: "svc-billing".to_string(),
                    name: "Billing".to_string(),
                },
                Service {
                    id: "svc-search".to_string(),
                    name: "Search".to_string(),
                },
            ])
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
            ..self
        }
    }

    pub fn with_services(self, services: Vec<Service>) -> Self {
        let services = services.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            services: Arc::new(RwLock::new(services)),
            ..self
        }
    }

    /// Answer the first `count` authorized pings with 503.
    pub fn with_failing_pings(self, count: usize) -> Self {
        self.failing_pings.store(count, Ordering::SeqCst);
        self
    }

    /// Number of `/ping` requests received, authorized or not.
    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.outbox.read().await.clone()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let matches = |name: &str, expected: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected)
        };
        if matches(VENDOR_ID_HEADER, &*self.vendor_id) && matches(VENDOR_TOKEN_HEADER, &*self.token)
        {
            Ok(())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/api/nexus/users", get(list_users))
        .route("/api/nexus/users/{id}", get(get_user))
        .route("/api/nexus/users/{id}/send-email", post(send_email))
        .route("/api/vendor/services", get(list_services))
        .route("/api/vendor/services/{id}", get(get_service))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn ping(State(state): State<MockState>, headers: HeaderMap) -> StatusCode {
    state.pings.fetch_add(1, Ordering::SeqCst);
    if let Err(status) = state.authorize(&headers) {
        return status;
    }
    let remaining = state
        .failing_pings
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    match remaining {
        Ok(_) => StatusCode::SERVICE_UNAVAILABLE,
        Err(_) => StatusCode::OK,
    }
}

async fn list_users(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, StatusCode> {
    state.authorize(&headers)?;
    let users = state.users.read().await;
    let mut list: Vec<User> = users.values().cloned().collect();
    list.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(Json(list))
}

async fn get_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<User>, StatusCode> {
    state.authorize(&headers)?;
    let users = state.users.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn send_email(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(email): Json<Email>,
) -> Result<Json<bool>, StatusCode> {
    state.authorize(&headers)?;
    if !state.users.read().await.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!(user_id = %id, subject = %email.subject, "email queued");
    state.outbox.write().await.push(SentEmail {
        id: Uuid::new_v4(),
        user_id: id,
        email,
    });
    Ok(Json(true))
}

async fn list_services(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, StatusCode> {
    state.authorize(&headers)?;
    let services = state.services.read().await;
    let mut list: Vec<Service> = services.values().cloned().collect();
    list.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(list))
}

async fn get_service(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Service>, StatusCode> {
    state.authorize(&headers)?;
    let services = state.services.read().await;
    services.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}
