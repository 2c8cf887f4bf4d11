// 1Password Connect REST API wrapper

use serde_json::Value;

use crate::client::{ConnectionConfig, HttpClient};
use crate::config;
use crate::output::errors::HashictlError;

pub struct ConnectApi {
    client: HttpClient,
}

impl ConnectApi {
    pub fn new(config: ConnectionConfig) -> Result<Self, HashictlError> {
        Ok(ConnectApi {
            client: HttpClient::new(config)?,
        })
    }

    pub async fn list_vaults(&self) -> Result<Vec<Value>, HashictlError> {
        match self.client.get("/v1/vaults", &[]).await? {
            Some(Value::Array(vaults)) => Ok(vaults),
            Some(other) => Err(HashictlError::Remote {
                status: 200,
                message: format!("expected a JSON array of vaults, got: {}", other),
            }),
            None => Ok(Vec::new()),
        }
    }

    pub async fn list_items(&self, vault_id: &str) -> Result<Vec<Value>, HashictlError> {
        let path = format!("/v1/vaults/{}/items", vault_id);
        match self.client.get(&path, &[]).await? {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(HashictlError::Remote {
                status: 200,
                message: format!("expected a JSON array of items, got: {}", other),
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Full item record, including fields (the list endpoint omits them)
    pub async fn get_item(&self, vault_id: &str, item_id: &str) -> Result<Value, HashictlError> {
        let path = format!("/v1/vaults/{}/items/{}", vault_id, item_id);
        self.client
            .get(&path, &[])
            .await?
            .ok_or_else(|| HashictlError::NotFound(format!("item '{}' has no record", item_id)))
    }

    /// Resolve which vault to search: explicit id, then OP_VAULT_ID, then
    /// the first vault the server lists. The server gives no ordering
    /// guarantee for that list; the fallback is a convenience, not a
    /// deterministic choice.
    pub async fn resolve_vault(&self, explicit: Option<String>) -> Result<String, HashictlError> {
        if let Some(vault_id) = config::resolve_opt(explicit, config::OP_VAULT_ID) {
            return Ok(vault_id);
        }

        let vaults = self.list_vaults().await?;
        let first = vaults
            .first()
            .ok_or_else(|| HashictlError::NotFound("no vaults found".to_string()))?;

        first
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HashictlError::Remote {
                status: 200,
                message: "vault record has no id field".to_string(),
            })
    }
}
