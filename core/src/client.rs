//! Client construction and ownership.
//!
//! # Design
//! `ClientBuilder` only collects options. `build()` validates them into a
//! `ClientConfig`, opens the executor (connection pool), runs the connection
//! verifier, and only then hands out a `NexusClient`. The client owns the
//! transport; repositories share it and records hold weak handles to it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::http::{Executor, UreqExecutor};
use crate::metrics::ClientMetrics;
use crate::services::ServiceRepository;
use crate::transport::Transport;
use crate::users::UserRepository;
use crate::verify::{verify_connection, CancelToken, Pause};

/// A verified, ready-to-use Nexus API client.
pub struct NexusClient {
    transport: Arc<Transport>,
    users: UserRepository,
    services: ServiceRepository,
}

impl NexusClient {
    /// Start building a client for the given access token.
    pub fn with_token(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::from_options(ClientOptions {
            token: token.into(),
            ..ClientOptions::default()
        })
    }

    /// Verify `config` over HTTP and build a client.
    pub fn connect(config: ClientConfig, cancel: &CancelToken) -> Result<Self> {
        let executor = Arc::new(UreqExecutor::new(
            config.connection_timeout(),
            config.read_timeout(),
        ));
        Self::connect_with(config, executor, cancel)
    }

    /// Like [`connect`](Self::connect) with a caller-supplied executor and pause.
    pub fn connect_with(
        config: ClientConfig,
        executor: Arc<dyn Executor>,
        pause: &dyn Pause,
    ) -> Result<Self> {
        verify_connection(executor.as_ref(), &config, pause)?;
        Ok(Self::from_transport(Arc::new(Transport::new(config, executor))))
    }

    fn from_transport(transport: Arc<Transport>) -> Self {
        Self {
            users: UserRepository::new(transport.clone()),
            services: ServiceRepository::new(transport.clone()),
            transport,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn services(&self) -> &ServiceRepository {
        &self.services
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub fn metrics(&self) -> &ClientMetrics {
        self.transport.metrics()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Stop accepting requests. Safe to call more than once.
    pub fn close(&self) {
        if self.transport.close() {
            tracing::info!(metrics = %self.transport.metrics(), "HTTP client closed");
        }
    }
}

/// Collects [`ClientOptions`] and builds a verified [`NexusClient`].
pub struct ClientBuilder {
    options: ClientOptions,
    cancel: CancelToken,
    executor: Option<Arc<dyn Executor>>,
}

impl ClientBuilder {
    pub fn from_options(options: ClientOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
            executor: None,
        }
    }

    pub fn with_vendor_id(mut self, vendor_id: impl Into<String>) -> Self {
        self.options.vendor_id = vendor_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.options.base_url = base_url.into();
        self
    }

    pub fn with_verify_attempts(mut self, attempts: u32) -> Self {
        self.options.verify_attempts = attempts;
        self
    }

    pub fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.options.verify_delay_ms = millis(delay);
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.options.connection_timeout_ms = millis(timeout);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.options.read_timeout_ms = millis(timeout);
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.options.enable_logging = enabled;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay_ms = millis(delay);
        self
    }

    /// Token that interrupts the wait between verification attempts.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the default `ureq` executor.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Validate, verify the connection, and build the client.
    pub fn build(self) -> Result<NexusClient> {
        let config = ClientConfig::from_options(self.options)?;
        match self.executor {
            Some(executor) => NexusClient::connect_with(config, executor, &self.cancel),
            None => NexusClient::connect(config, &self.cancel),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
