//! Base implementation shared by the domain clients.

use crate::client::Gateway;
use crate::domains::{DomainClient, DomainOperations, ValidationOperations};
use std::sync::Arc;

/// Gateway handle plus the domain name used in logs and errors
#[derive(Clone)]
pub struct BaseDomainClient {
    gateway: Arc<dyn Gateway>,
    domain_name: String,
}

impl BaseDomainClient {
    pub fn new(gateway: Arc<dyn Gateway>, domain_name: impl Into<String>) -> Self {
        Self {
            gateway,
            domain_name: domain_name.into(),
        }
    }
}

impl DomainClient for BaseDomainClient {
    fn domain_name(&self) -> &str {
        &self.domain_name
    }
}

impl ValidationOperations for BaseDomainClient {}

impl DomainOperations for BaseDomainClient {
    fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }
}
