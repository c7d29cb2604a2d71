//! Pre-flight connection verification.
//!
//! # Design
//! Before a client is handed out, `GET {base}/ping` is probed with the vendor
//! headers up to `verify_attempts` times. Each probe collapses to a yes/no
//! answer: 404 and 525 mean the base URL is wrong, any other non-200 means
//! the credentials are wrong, and I/O failures just count as a miss. Only
//! when every attempt has missed does the caller see `Authentication`.
//!
//! The wait between attempts goes through [`Pause`] so it can be cancelled
//! with a [`CancelToken`]; a cancelled wait ends the loop with `Interrupted`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{Executor, HttpMethod, HttpRequest};
use crate::transport::auth_headers;

pub const PING_PATH: &str = "/ping";

/// Blocks between verification attempts.
pub trait Pause {
    /// Wait for `delay`, or fail with `Interrupted` if cancelled first.
    fn pause(&self, delay: Duration) -> Result<()>;
}

/// Cancellation handle shared between the caller and a blocking wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every waiter. Irreversible.
    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        *flag.lock() = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }
}

impl Pause for CancelToken {
    fn pause(&self, delay: Duration) -> Result<()> {
        let (flag, signal) = &*self.inner;
        let mut cancelled = flag.lock();
        match Instant::now().checked_add(delay) {
            Some(deadline) => {
                while !*cancelled {
                    if signal.wait_until(&mut cancelled, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*cancelled {
                    signal.wait(&mut cancelled);
                }
            }
        }
        if *cancelled {
            return Err(ClientError::Interrupted);
        }
        Ok(())
    }
}

/// Result of a single `/ping` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Verified,
    /// 404 or 525: nothing listens at the configured base URL.
    BadBaseUrl(u16),
    /// Any other non-200 status.
    BadCredentials(u16),
    Unreachable,
}

/// Successful verification summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Number of probes sent, including the successful one.
    pub attempts: u32,
}

pub fn probe(executor: &dyn Executor, config: &ClientConfig) -> ProbeOutcome {
    let request = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{}{PING_PATH}", config.base_url()),
        headers: auth_headers(config),
        body: None,
    };

    match executor.execute(&request) {
        Ok(response) => match response.status {
            200 => ProbeOutcome::Verified,
            status @ (404 | 525) => {
                tracing::error!(
                    base_url = config.base_url(),
                    status,
                    "Unable to verify connection: invalid base URL"
                );
                ProbeOutcome::BadBaseUrl(status)
            }
            status => {
                tracing::error!(
                    status,
                    "Unable to verify connection: invalid token or vendor ID"
                );
                ProbeOutcome::BadCredentials(status)
            }
        },
        Err(error) => {
            tracing::error!(
                url = %request.url,
                error = %error,
                "Unable to verify connection: unexpected transport error"
            );
            ProbeOutcome::Unreachable
        }
    }
}

/// Probe until verified or out of attempts, pausing `verify_delay` between misses.
pub fn verify_connection(
    executor: &dyn Executor,
    config: &ClientConfig,
    pause: &dyn Pause,
) -> Result<Verification> {
    let total = config.verify_attempts();
    let mut remaining = total;

    loop {
        let attempt = total - remaining + 1;
        if probe(executor, config) == ProbeOutcome::Verified {
            tracing::info!(attempt, "Connection verified successfully");
            return Ok(Verification { attempts: attempt });
        }

        remaining -= 1;
        if remaining == 0 {
            return Err(ClientError::Authentication { attempts: total });
        }
        tracing::warn!(
            retry_in_secs = config.verify_delay().as_secs(),
            attempts_left = remaining,
            "Trying to verify connection again"
        );
        pause.pause(config.verify_delay())?;
    }
}
