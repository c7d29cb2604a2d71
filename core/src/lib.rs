//! Blocking client SDK for the Nexus vendor API.
//!
//! # Overview
//! A client is built from a vendor id and access token. Before it is handed
//! out, the builder probes `{base}/ping` with bounded retries to confirm the
//! base URL and credentials. The client then exposes typed repositories for
//! users and services on top of a shared transport core.
//!
//! # Design
//! - `transport::Transport` is the single request pipeline: vendor headers,
//!   JSON encoding, timing, metrics, status classification, typed errors.
//! - Network I/O goes through the `http::Executor` trait. `UreqExecutor` is
//!   the production executor; tests substitute scripted ones.
//! - Verification never raises mid-loop; only exhaustion (`Authentication`)
//!   or a cancelled wait (`Interrupted`) stops `build()`.
//! - Data-plane requests are never retried.
//!
//! ```no_run
//! use nexus_client::{Email, NexusClient};
//!
//! # fn main() -> nexus_client::Result<()> {
//! let client = NexusClient::with_token("token")
//!     .with_vendor_id("vendor")
//!     .build()?;
//! for user in client.users().get_users()? {
//!     user.send_email(Some(&Email::new("Hello", "Welcome aboard")))?;
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod response;
pub mod services;
pub mod transport;
pub mod types;
pub mod users;
pub mod verify;

pub use client::{ClientBuilder, NexusClient};
pub use config::{ClientConfig, ClientOptions};
pub use error::{ClientError, Result};
pub use http::{Executor, HttpMethod, HttpRequest, HttpResponse, UreqExecutor};
pub use metrics::ClientMetrics;
pub use response::ApiResponse;
pub use services::{Service, ServiceRepository};
pub use transport::Transport;
pub use types::{Email, ServiceData, UserData};
pub use users::{User, UserRepository};
pub use verify::{CancelToken, Pause};
