// End-to-end module flows against a mock HTTP server
//
// Each test asserts both the result shape and the exact write calls issued,
// since the whole point of the subset check is to avoid redundant writes.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hashictl::client::ConnectionConfig;
use hashictl::modules::{
    AclPolicyModule, IntentionModule, JobAcl, JobParseModule, Module, SchedulerModule,
    ServiceModule,
};
use hashictl::output::HashictlError;
use hashictl::plugins::onepassword_connect;
use hashictl::reconcile::ResourceState;

fn policy_module(state: ResourceState, rules: Option<&str>) -> AclPolicyModule {
    AclPolicyModule {
        name: "dev".to_string(),
        state,
        description: None,
        rules: rules.map(str::to_string),
        job_acl: JobAcl::default(),
    }
}

#[tokio::test]
async fn absent_policy_that_does_not_exist_is_a_noop() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = policy_module(ResourceState::Absent, None)
        .run(ConnectionConfig::new(server.uri()).with_token("secret"))
        .await
        .unwrap();

    assert!(!result.changed);
}

#[tokio::test]
async fn missing_policy_is_created_once() {
    let server = MockServer::start().await;

    let created = json!({
        "Name": "dev",
        "Rules": "namespace \"dev\" { policy = \"write\" }",
        "CreateIndex": 12,
        "ModifyIndex": 12,
    });

    // first fetch: not found yet
    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/acl/policy/dev"))
        .and(body_json(json!({
            "Name": "dev",
            "Rules": "namespace \"dev\" { policy = \"write\" }",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // re-fetch after the write reports the created policy
    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = policy_module(
        ResourceState::Present,
        Some("namespace \"dev\" { policy = \"write\" }"),
    )
    .run(ConnectionConfig::new(server.uri()).with_token("secret"))
    .await
    .unwrap();

    assert!(result.changed);
    assert_eq!(result.data.get("policy"), Some(&created));
}

#[tokio::test]
async fn satisfied_policy_issues_no_write() {
    let server = MockServer::start().await;

    let existing = json!({
        "Name": "dev",
        "Description": "managed elsewhere",
        "Rules": "namespace \"dev\" { policy = \"write\" }",
        "CreateIndex": 7,
    });

    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = policy_module(
        ResourceState::Present,
        Some("namespace \"dev\" { policy = \"write\" }"),
    )
    .run(ConnectionConfig::new(server.uri()).with_token("secret"))
    .await
    .unwrap();

    assert!(!result.changed);
    assert_eq!(result.data.get("policy"), Some(&existing));
}

#[tokio::test]
async fn drifted_policy_is_updated_with_the_full_desired_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "dev",
            "Rules": "namespace \"dev\" { policy = \"read\" }",
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/acl/policy/dev"))
        .and(body_json(json!({
            "Name": "dev",
            "Description": "dev namespace access",
            "Rules": "namespace \"dev\" { policy = \"write\" }",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "dev",
            "Description": "dev namespace access",
            "Rules": "namespace \"dev\" { policy = \"write\" }",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut module = policy_module(
        ResourceState::Present,
        Some("namespace \"dev\" { policy = \"write\" }"),
    );
    module.description = Some("dev namespace access".to_string());

    let result = module
        .run(ConnectionConfig::new(server.uri()).with_token("secret"))
        .await
        .unwrap();

    assert!(result.changed);
}

#[tokio::test]
async fn present_rules_are_required() {
    let err = policy_module(ResourceState::Present, None)
        .run(ConnectionConfig::new("http://127.0.0.1:1"))
        .await
        .unwrap_err();

    assert!(matches!(err, HashictlError::Config(_)));
}

#[tokio::test]
async fn absent_intention_is_deleted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/connect/intentions/exact"))
        .and(query_param("source", "web"))
        .and(query_param("destination", "db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceName": "web",
            "DestinationName": "db",
            "Action": "allow",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/connect/intentions/exact"))
        .and(query_param("source", "web"))
        .and(query_param("destination", "db"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = IntentionModule {
        source: "web".to_string(),
        destination: "db".to_string(),
        state: ResourceState::Absent,
        description: None,
        action: None,
        permissions: None,
    }
    .run(ConnectionConfig::new(server.uri()).with_token("secret"))
    .await
    .unwrap();

    assert!(result.changed);
}

#[tokio::test]
async fn satisfied_intention_issues_no_write() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/connect/intentions/exact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceType": "consul",
            "SourceName": "web",
            "DestinationName": "db",
            "Action": "allow",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v1/connect/intentions/exact"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = IntentionModule {
        source: "web".to_string(),
        destination: "db".to_string(),
        state: ResourceState::Present,
        description: None,
        action: Some("allow".to_string()),
        permissions: None,
    }
    .run(ConnectionConfig::new(server.uri()).with_token("secret"))
    .await
    .unwrap();

    assert!(!result.changed);
}

#[tokio::test]
async fn drifted_scheduler_config_is_overwritten() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/operator/scheduler/configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SchedulerConfig": {
                "SchedulerAlgorithm": "spread",
                "MemoryOversubscriptionEnabled": false,
                "RejectJobRegistration": false,
                "PauseEvalBroker": false,
                "PreemptionConfig": {
                    "SystemSchedulerEnabled": true,
                    "SysBatchSchedulerEnabled": false,
                    "BatchSchedulerEnabled": false,
                    "ServiceSchedulerEnabled": false,
                },
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/operator/scheduler/configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Updated": true})))
        .expect(1)
        .mount(&server)
        .await;

    // desired algorithm is the default, binpack, while the server runs spread
    let result = SchedulerModule::default()
        .run(ConnectionConfig::new(server.uri()).with_token("secret"))
        .await
        .unwrap();

    assert!(result.changed);
    let reported = result.data.get("scheduler_config").unwrap();
    assert_eq!(reported["SchedulerAlgorithm"], json!("binpack"));
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/catalog/service/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let err = ServiceModule {
        service_name: "ghost".to_string(),
    }
    .run(ConnectionConfig::new(server.uri()).with_token("secret"))
    .await
    .unwrap_err();

    assert!(matches!(err, HashictlError::NotFound(_)));
}

#[tokio::test]
async fn job_parse_returns_the_translated_spec() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/jobs/parse"))
        .and(body_json(json!({
            "namespace": "default",
            "JobHCL": "job \"web\" {}",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": "web",
            "Name": "web",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = JobParseModule::new("job \"web\" {}")
        .run(ConnectionConfig::new(server.uri()).with_token("secret"))
        .await
        .unwrap();

    assert!(!result.changed);
    assert_eq!(result.data.get("parsed").unwrap()["ID"], json!("web"));
}

async fn mount_connect_vault(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "item-1", "title": "My Item"},
            {"id": "item-2", "title": "Other Item"},
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items/item-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-1",
            "title": "My Item",
            "fields": [
                {"id": "f1", "label": "username", "value": "admin"},
                {"id": "f2", "label": "password", "value": "s3cr3t"},
            ],
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn secret_fetch_returns_the_field_value() {
    let server = MockServer::start().await;
    mount_connect_vault(&server).await;

    let value = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "My Item",
        "password",
        Some("vault-1".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(value, "s3cr3t");
}

#[tokio::test]
async fn secret_fetch_falls_back_to_the_first_listed_vault() {
    std::env::remove_var("OP_VAULT_ID");

    let server = MockServer::start().await;
    mount_connect_vault(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "vault-1", "name": "Infrastructure"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let value = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "My Item",
        "password",
        None,
    )
    .await
    .unwrap();

    assert_eq!(value, "s3cr3t");
}

#[tokio::test]
async fn secret_fetch_with_duplicate_titles_takes_the_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "item-1", "title": "My Item"},
            {"id": "item-2", "title": "My Item"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items/item-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-1",
            "title": "My Item",
            "fields": [
                {"id": "f1", "label": "password", "value": "first-wins"},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    // the second item's record must never be fetched
    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items/item-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-2",
            "title": "My Item",
            "fields": [
                {"id": "f1", "label": "password", "value": "second"},
            ],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let value = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "My Item",
        "password",
        Some("vault-1".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(value, "first-wins");
}

#[tokio::test]
async fn secret_fetch_rejects_a_malformed_item_list() {
    let server = MockServer::start().await;

    // a 200 whose body is not the expected array is a remote error, not an
    // empty vault
    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "unexpected shape",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "My Item",
        "password",
        Some("vault-1".to_string()),
    )
    .await
    .unwrap_err();

    match err {
        HashictlError::Remote { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("array of items"));
        }
        other => panic!("expected Remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn secret_fetch_unknown_title_is_not_found() {
    let server = MockServer::start().await;
    mount_connect_vault(&server).await;

    let err = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "No Such Item",
        "password",
        Some("vault-1".to_string()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HashictlError::NotFound(_)));
}

#[tokio::test]
async fn secret_fetch_unknown_field_is_not_found() {
    let server = MockServer::start().await;
    mount_connect_vault(&server).await;

    let err = onepassword_connect(
        ConnectionConfig::new(server.uri()).with_token("connect-token"),
        "My Item",
        "otp",
        Some("vault-1".to_string()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HashictlError::NotFound(_)));
}

#[tokio::test]
async fn remote_failure_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/policy/dev"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .expect(1)
        .mount(&server)
        .await;

    let err = policy_module(ResourceState::Present, Some("rules"))
        .run(ConnectionConfig::new(server.uri()).with_token("bad-token"))
        .await
        .unwrap_err();

    match err {
        HashictlError::Remote { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("Permission denied"));
        }
        other => panic!("expected Remote error, got {:?}", other),
    }
}
