// 1Password Connect lookup: fetch one field value from one item
//
// Find-by-title: list the vault's items, match case-exactly on the title
// display field, then fetch the full record by internal id. Titles are not
// guaranteed unique by the server; the first match wins.

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ConnectApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;

/// Fetch the value of the field labeled `field_label` from the item titled
/// `item_title`. `vault` falls back to OP_VAULT_ID, then to the first vault
/// the Connect server lists.
pub async fn onepassword_connect(
    config: ConnectionConfig,
    item_title: &str,
    field_label: &str,
    vault: Option<String>,
) -> Result<String, HashictlError> {
    let api = ConnectApi::new(config)?;

    let vault_id = api.resolve_vault(vault).await?;
    debug!(%vault_id, %item_title, "looking up item");

    let item = find_item_by_title(&api, &vault_id, item_title).await?;

    field_value(&item, field_label).ok_or_else(|| {
        HashictlError::NotFound(format!(
            "field '{}' not found in item '{}'",
            field_label, item_title
        ))
    })
}

async fn find_item_by_title(
    api: &ConnectApi,
    vault_id: &str,
    title: &str,
) -> Result<Value, HashictlError> {
    let items = api.list_items(vault_id).await?;

    let mut matches = items
        .iter()
        .filter(|item| item.get("title").and_then(Value::as_str) == Some(title));

    let item = matches.next().ok_or_else(|| {
        HashictlError::NotFound(format!("item '{}' not found in vault", title))
    })?;

    if matches.next().is_some() {
        warn!(%title, "multiple items share this title; taking the first match");
    }

    let item_id = item
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| HashictlError::Remote {
            status: 200,
            message: format!("item '{}' has no id field", title),
        })?;

    api.get_item(vault_id, item_id).await
}

/// Extract the value of the field with the given label from a full item
/// record. Unlabeled fields and non-string values are skipped.
fn field_value(item: &Value, label: &str) -> Option<String> {
    item.get("fields")?
        .as_array()?
        .iter()
        .find(|field| field.get("label").and_then(Value::as_str) == Some(label))
        .and_then(|field| field.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_by_label() {
        let item = json!({
            "id": "item-1",
            "title": "My Item",
            "fields": [
                {"id": "f1", "label": "username", "value": "admin"},
                {"id": "f2", "label": "password", "value": "s3cr3t"},
            ]
        });

        assert_eq!(field_value(&item, "password").as_deref(), Some("s3cr3t"));
        assert_eq!(field_value(&item, "username").as_deref(), Some("admin"));
        assert_eq!(field_value(&item, "otp"), None);
    }

    #[test]
    fn test_field_value_tolerates_missing_fields_array() {
        let item = json!({"id": "item-1", "title": "Empty"});
        assert_eq!(field_value(&item, "password"), None);
    }
}
