// Nomad ACL policy reconciliation

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::Module;
use crate::api::NomadApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::{is_subset, prune_nulls, ModuleResult, ResourceState};

/// Workload-identity scoping for a policy
#[derive(Debug, Clone, Default)]
pub struct JobAcl {
    pub namespace: Option<String>,
    pub job_id: Option<String>,
    pub group: Option<String>,
    pub task: Option<String>,
}

impl JobAcl {
    fn is_empty(&self) -> bool {
        self.namespace.is_none()
            && self.job_id.is_none()
            && self.group.is_none()
            && self.task.is_none()
    }
}

/// Desired state of one named ACL policy
#[derive(Debug, Clone)]
pub struct AclPolicyModule {
    pub name: String,
    pub state: ResourceState,
    pub description: Option<String>,
    /// HCL policy rules; required when state is present
    pub rules: Option<String>,
    pub job_acl: JobAcl,
}

impl AclPolicyModule {
    fn desired_body(&self) -> Value {
        let job_acl = if self.job_acl.is_empty() {
            Value::Null
        } else {
            prune_nulls(json!({
                "Namespace": self.job_acl.namespace,
                "JobID": self.job_acl.job_id,
                "Group": self.job_acl.group,
                "Task": self.job_acl.task,
            }))
        };

        prune_nulls(json!({
            "Name": self.name,
            "Description": self.description,
            "Rules": self.rules,
            "JobACL": job_acl,
        }))
    }
}

#[async_trait]
impl Module for AclPolicyModule {
    fn name(&self) -> &'static str {
        "nomad_acl_policy"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        if self.state == ResourceState::Present && self.rules.is_none() {
            return Err(HashictlError::Config(
                "rules are required when state is present".to_string(),
            ));
        }

        let nomad = NomadApi::new(config)?;

        let existing = nomad.get_acl_policy(&self.name).await?;

        match self.state {
            ResourceState::Absent => match existing {
                Some(_) => {
                    nomad.delete_acl_policy(&self.name).await?;
                    Ok(ModuleResult::changed())
                }
                None => Ok(ModuleResult::unchanged()),
            },

            ResourceState::Present => {
                let desired = self.desired_body();
                let satisfied = existing
                    .as_ref()
                    .map(|e| is_subset(&desired, e))
                    .unwrap_or(false);

                if satisfied {
                    debug!(policy = %self.name, "policy already satisfies desired state");
                    let existing = existing.unwrap_or(Value::Null);
                    return Ok(ModuleResult::unchanged().with("policy", existing));
                }

                nomad.upsert_acl_policy(&self.name, &desired).await?;

                // report the policy as the server now holds it
                let policy = nomad
                    .get_acl_policy(&self.name)
                    .await?
                    .unwrap_or(Value::Null);

                Ok(ModuleResult::changed().with("policy", policy))
            }
        }
    }
}
