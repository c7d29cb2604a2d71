//! Service repository and the live `Service` record.

use std::sync::{Arc, Weak};

use crate::error::{require_id, ClientError, Result};
use crate::transport::Transport;
use crate::types::ServiceData;

pub const SERVICES_ENDPOINT: &str = "/api/vendor/services";

/// Typed access to `/api/vendor/services`.
#[derive(Clone)]
pub struct ServiceRepository {
    transport: Arc<Transport>,
}

impl ServiceRepository {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn get_services(&self) -> Result<Vec<Service>> {
        let services: Vec<ServiceData> =
            self.transport.get(SERVICES_ENDPOINT)?.into_data_or_throw()?;
        tracing::debug!(count = services.len(), "fetched services");
        Ok(services.into_iter().map(|data| self.bind(data)).collect())
    }

    pub fn get_service(&self, service_id: &str) -> Result<Service> {
        let service_id = require_id(service_id, "Service")?;
        let data: ServiceData = self
            .transport
            .get(&format!("{SERVICES_ENDPOINT}/{service_id}"))?
            .into_data_or_throw()?;
        Ok(self.bind(data))
    }

    fn bind(&self, data: ServiceData) -> Service {
        Service {
            data,
            transport: Arc::downgrade(&self.transport),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Service {
    data: ServiceData,
    transport: Weak<Transport>,
}

impl Service {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn data(&self) -> &ServiceData {
        &self.data
    }

    pub fn into_data(self) -> ServiceData {
        self.data
    }

    /// Re-fetch this service. Fails with `Closed` once the client is gone.
    pub fn refresh(&self) -> Result<Service> {
        let transport = self.transport.upgrade().ok_or(ClientError::Closed)?;
        ServiceRepository::new(transport).get_service(self.id())
    }
}
