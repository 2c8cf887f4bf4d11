// Consul ACL token lookup (read-only)

use async_trait::async_trait;

use super::Module;
use crate::api::ConsulApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::ModuleResult;

/// Read one ACL token by accessor id; without an accessor id, reads the
/// token the request authenticated with
#[derive(Debug, Clone, Default)]
pub struct AclTokenModule {
    pub accessor_id: Option<String>,
}

#[async_trait]
impl Module for AclTokenModule {
    fn name(&self) -> &'static str {
        "consul_acl_token"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        let consul = ConsulApi::new(config)?;

        let token = consul
            .get_acl_token(self.accessor_id.as_deref())
            .await?
            .ok_or_else(|| {
                HashictlError::NotFound(format!(
                    "ACL token '{}' does not exist",
                    self.accessor_id.as_deref().unwrap_or("self")
                ))
            })?;

        Ok(ModuleResult::unchanged().with("token", token))
    }
}
