// Consul connect intention reconciliation

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::Module;
use crate::api::ConsulApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::{is_subset, prune_nulls, ModuleResult, ResourceState};

/// Desired state of one intention, keyed by its source/destination pair
#[derive(Debug, Clone)]
pub struct IntentionModule {
    pub source: String,
    pub destination: String,
    pub state: ResourceState,
    pub description: Option<String>,
    pub action: Option<String>,
    pub permissions: Option<Vec<Value>>,
}

impl IntentionModule {
    /// Desired wire body with unset optional fields pruned, so remote
    /// defaults survive
    fn desired_body(&self) -> Value {
        prune_nulls(json!({
            "SourceType": "consul",
            "Description": self.description,
            "Action": self.action,
            "Permissions": self.permissions,
        }))
    }
}

#[async_trait]
impl Module for IntentionModule {
    fn name(&self) -> &'static str {
        "consul_connect_intention"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        let consul = ConsulApi::new(config)?;

        let existing = consul
            .get_connect_intention(&self.source, &self.destination)
            .await?;
        let desired = self.desired_body();

        match self.state {
            ResourceState::Absent => match existing {
                Some(_) => {
                    consul
                        .delete_connect_intention(&self.source, &self.destination)
                        .await?;
                    Ok(ModuleResult::changed())
                }
                None => Ok(ModuleResult::unchanged()),
            },

            ResourceState::Present => {
                let satisfied = existing
                    .as_ref()
                    .map(|e| is_subset(&desired, e))
                    .unwrap_or(false);

                if satisfied {
                    debug!(source = %self.source, destination = %self.destination,
                        "intention already satisfies desired state");
                    return Ok(ModuleResult::unchanged());
                }

                consul
                    .upsert_connect_intention(&self.source, &self.destination, &desired)
                    .await?;
                Ok(ModuleResult::changed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_desired_body_prunes_unset_fields() {
        let module = IntentionModule {
            source: "web".to_string(),
            destination: "db".to_string(),
            state: ResourceState::Present,
            description: None,
            action: Some("allow".to_string()),
            permissions: None,
        };

        assert_eq!(
            module.desired_body(),
            json!({"SourceType": "consul", "Action": "allow"})
        );
    }

    #[test]
    fn test_desired_body_keeps_set_fields() {
        let module = IntentionModule {
            source: "web".to_string(),
            destination: "db".to_string(),
            state: ResourceState::Present,
            description: Some(String::new()),
            action: Some("deny".to_string()),
            permissions: Some(vec![]),
        };

        // empty-but-set values are not pruned
        assert_eq!(
            module.desired_body(),
            json!({
                "SourceType": "consul",
                "Description": "",
                "Action": "deny",
                "Permissions": [],
            })
        );
    }
}
