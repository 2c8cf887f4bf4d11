// Nomad HTTP API wrapper

use serde_json::Value;

use crate::client::{ConnectionConfig, HttpClient};
use crate::output::errors::HashictlError;

pub struct NomadApi {
    client: HttpClient,
}

impl NomadApi {
    pub fn new(config: ConnectionConfig) -> Result<Self, HashictlError> {
        Ok(NomadApi {
            client: HttpClient::new(config)?,
        })
    }

    /// Fetch an ACL policy by name; None when it does not exist yet
    pub async fn get_acl_policy(&self, name: &str) -> Result<Option<Value>, HashictlError> {
        let path = format!("/v1/acl/policy/{}", name);
        self.client.get_or_none(&path, &[]).await
    }

    /// Idempotent upsert of an ACL policy
    pub async fn upsert_acl_policy(
        &self,
        name: &str,
        body: &Value,
    ) -> Result<(), HashictlError> {
        let path = format!("/v1/acl/policy/{}", name);
        self.client.post(&path, &[], body).await?;
        Ok(())
    }

    pub async fn delete_acl_policy(&self, name: &str) -> Result<(), HashictlError> {
        let path = format!("/v1/acl/policy/{}", name);
        self.client.delete(&path, &[]).await?;
        Ok(())
    }

    /// The operator scheduler configuration always exists
    pub async fn get_scheduler_config(&self) -> Result<Value, HashictlError> {
        self.client
            .get("/v1/operator/scheduler/configuration", &[])
            .await?
            .ok_or_else(|| HashictlError::Remote {
                status: 200,
                message: "scheduler configuration response had no body".to_string(),
            })
    }

    pub async fn update_scheduler_config(&self, body: &Value) -> Result<(), HashictlError> {
        self.client
            .post("/v1/operator/scheduler/configuration", &[], body)
            .await?;
        Ok(())
    }

    /// Translate an HCL job spec into its JSON form
    pub async fn parse_job(&self, body: &Value) -> Result<Value, HashictlError> {
        self.client
            .post("/v1/jobs/parse", &[], body)
            .await?
            .ok_or_else(|| HashictlError::Remote {
                status: 200,
                message: "job parse response had no body".to_string(),
            })
    }
}
