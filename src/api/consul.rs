// Consul HTTP API wrapper
//
// Covers the three surfaces the modules need: ACL tokens, the catalog and
// connect intentions. Paths follow the v1 API; auth is the bearer form of
// the management token.

use serde_json::Value;

use crate::client::{ConnectionConfig, HttpClient};
use crate::output::errors::HashictlError;

pub struct ConsulApi {
    client: HttpClient,
}

impl ConsulApi {
    pub fn new(config: ConnectionConfig) -> Result<Self, HashictlError> {
        Ok(ConsulApi {
            client: HttpClient::new(config)?,
        })
    }

    /// Read one ACL token by accessor id, or the token the request itself
    /// authenticated with when no accessor id is given
    pub async fn get_acl_token(
        &self,
        accessor_id: Option<&str>,
    ) -> Result<Option<Value>, HashictlError> {
        let path = match accessor_id {
            Some(id) => format!("/v1/acl/token/{}", id),
            None => "/v1/acl/token/self".to_string(),
        };
        self.client.get_or_none(&path, &[]).await
    }

    /// List the catalog entries for a named service; unknown services come
    /// back as an empty list, not an error
    pub async fn get_service(&self, name: &str) -> Result<Vec<Value>, HashictlError> {
        let path = format!("/v1/catalog/service/{}", name);
        match self.client.get(&path, &[]).await? {
            Some(Value::Array(instances)) => Ok(instances),
            Some(other) => Err(HashictlError::Remote {
                status: 200,
                message: format!("expected a JSON array of service instances, got: {}", other),
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch an intention by its source/destination pair; None when it does
    /// not exist yet
    pub async fn get_connect_intention(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Option<Value>, HashictlError> {
        self.client
            .get_or_none(
                "/v1/connect/intentions/exact",
                &[("source", source), ("destination", destination)],
            )
            .await
    }

    /// Idempotent upsert of an intention
    pub async fn upsert_connect_intention(
        &self,
        source: &str,
        destination: &str,
        body: &Value,
    ) -> Result<(), HashictlError> {
        self.client
            .put(
                "/v1/connect/intentions/exact",
                &[("source", source), ("destination", destination)],
                body,
            )
            .await?;
        Ok(())
    }

    pub async fn delete_connect_intention(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<(), HashictlError> {
        self.client
            .delete(
                "/v1/connect/intentions/exact",
                &[("source", source), ("destination", destination)],
            )
            .await?;
        Ok(())
    }
}
