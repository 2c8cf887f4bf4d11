// Consul catalog service lookup (read-only)

use async_trait::async_trait;
use serde_json::Value;

use super::Module;
use crate::api::ConsulApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::ModuleResult;

/// List the registered instances of a named service. The whole point of
/// this module is to resolve a service address and port, so an empty
/// instance list is an error rather than an empty success.
#[derive(Debug, Clone)]
pub struct ServiceModule {
    pub service_name: String,
}

#[async_trait]
impl Module for ServiceModule {
    fn name(&self) -> &'static str {
        "consul_service"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        let consul = ConsulApi::new(config)?;

        let instances = consul.get_service(&self.service_name).await?;

        if instances.is_empty() {
            return Err(HashictlError::NotFound(format!(
                "could not find consul service named {}",
                self.service_name
            )));
        }

        Ok(ModuleResult::unchanged().with("instances", Value::Array(instances)))
    }
}
