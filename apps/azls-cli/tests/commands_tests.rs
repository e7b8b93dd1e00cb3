//! Integration tests for CLI commands against a mocked tenant
//!
//! Tests cover:
//! - Listing a directory type, then serving it from cache
//! - Looking up cached objects by UUID
//! - Role assignment report with resolved names
//! - Management group tree rendering
//! - Status rows from local and remote counts
//! - Error mapping for token failures

mod common;

use azls_cli::commands::{build_inventory, list, open_store, report, status, tree, Globals};
use azls_cli::credentials::Credentials;
use azls_cli::error::CliError;
use azls_cli::logging::LogLevel;
use azls_sync::ObjectType;
use common::{TestContext, TENANT};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

// =========================================================================
// list
// =========================================================================

#[tokio::test]
async fn test_list_groups_syncs_once_then_uses_cache() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/groups/delta"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "G1", "displayName": "Admins"},
                {"id": "G2", "displayName": "Readers"}
            ],
            "@odata.deltaLink": "https://graph.test/v1.0/groups/delta?$deltatoken=abc"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let inventory = ctx.inventory();
    let records = inventory
        .get_current(ObjectType::Group, "adm", false)
        .await
        .unwrap();
    assert_eq!(
        list::render(ObjectType::Group, &records, false).unwrap(),
        vec!["G1  Admins"]
    );

    let cached = inventory
        .get_current(ObjectType::Group, "", false)
        .await
        .unwrap();
    assert_eq!(cached.len(), 2);
    assert!(ctx
        .paths
        .config_dir
        .join(format!("{TENANT}_groups_deltaLink.json"))
        .exists());
}

// =========================================================================
// show
// =========================================================================

#[tokio::test]
async fn test_cached_subscription_found_by_uuid() {
    let ctx = TestContext::new().await;
    let sub_id = "33333333-3333-3333-3333-333333333333";
    ctx.mock_get(
        ctx.arm("/subscriptions"),
        json!({"value": [{"subscriptionId": sub_id, "displayName": "prod", "state": "Enabled"}]}),
    )
    .await;

    ctx.inventory()
        .get_current(ObjectType::Subscription, "", false)
        .await
        .unwrap();

    let store = open_store(&ctx.paths).unwrap();
    let found = store.find_by_uuid(&sub_id.to_uppercase());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, ObjectType::Subscription);
    assert_eq!(found[0].1.text("displayName"), "prod");
}

// =========================================================================
// report
// =========================================================================

#[tokio::test]
async fn test_report_resolves_names() {
    let ctx = TestContext::new().await;
    let authz = |scope: &str, resource: &str| {
        ctx.arm(&format!("{scope}/providers/Microsoft.Authorization/{resource}"))
    };
    let root = format!("/providers/Microsoft.Management/managementGroups/{TENANT}");

    ctx.mock_get(
        ctx.arm("/subscriptions"),
        json!({"value": [{"subscriptionId": "S1", "displayName": "prod", "state": "Enabled"}]}),
    )
    .await;
    ctx.mock_get(
        authz(&root, "roleDefinitions"),
        json!({"value": [{"name": "rd1", "properties": {"roleName": "Reader", "type": "BuiltInRole"}}]}),
    )
    .await;
    ctx.mock_get(authz("/subscriptions/S1", "roleDefinitions"), json!({"value": []}))
        .await;
    ctx.mock_get(authz(&root, "roleAssignments"), json!({"value": []}))
        .await;
    ctx.mock_get(
        authz("/subscriptions/S1", "roleAssignments"),
        json!({"value": [{
            "name": "a1",
            "properties": {
                "roleDefinitionId": "/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions/rd1",
                "principalId": "U1",
                "principalType": "User",
                "scope": "/subscriptions/S1/resourceGroups/rg1"
            }
        }]}),
    )
    .await;
    for resource in ["users", "groups", "servicePrincipals"] {
        let value = match resource {
            "users" => json!([{"id": "U1", "displayName": "Alice"}]),
            "groups" => json!([{"id": "G1", "displayName": "Admins"}]),
            _ => json!([]),
        };
        ctx.mock_get(
            format!("/v1.0/{resource}/delta"),
            json!({"value": value, "@odata.deltaLink": "https://graph.test/done"}),
        )
        .await;
    }

    let inventory = ctx.inventory();
    let maps = report::NameMaps::load(&inventory).await.unwrap();
    assert_eq!(maps.roles["rd1"], "Reader");
    assert_eq!(maps.subscriptions["S1"], "prod");
    assert_eq!(maps.users.len(), 1);
    assert_eq!(maps.groups["G1"], "Admins");
    assert!(maps.service_principals.is_empty());
    let assignments = inventory
        .get_current(ObjectType::RoleAssignment, "", false)
        .await
        .unwrap();

    let mut out = Vec::new();
    report::write_report(&assignments, &maps, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\"Reader\",\"Alice\",\"User\",\"prod resourceGroups/rg1\"\n"
    );
}

// =========================================================================
// tree
// =========================================================================

#[tokio::test]
async fn test_tree_from_management_group_expansion() {
    let ctx = TestContext::new().await;
    ctx.mock_get(
        ctx.arm(&format!(
            "/providers/Microsoft.Management/managementGroups/{TENANT}"
        )),
        json!({
            "name": TENANT,
            "properties": {
                "displayName": "Tenant Root Group",
                "tenantId": TENANT,
                "children": [
                    {"name": "S1", "displayName": "prod", "type": "/subscriptions"}
                ]
            }
        }),
    )
    .await;

    let tree = ctx.inventory().management_tree().await.unwrap();
    let lines = tree::render_tree(&tree);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(TENANT));
    assert!(lines[1].trim_start().starts_with("prod"));
}

// =========================================================================
// status
// =========================================================================

#[tokio::test]
async fn test_status_row_counts_remote_and_local() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/users/$count"))
        .and(header("ConsistencyLevel", "eventual"))
        .respond_with(ResponseTemplate::new(200).set_body_string("42"))
        .mount(&ctx.server)
        .await;

    let inventory = ctx.inventory();
    let row = status::StatusRow {
        object_type: ObjectType::User,
        local: inventory.count_local(ObjectType::User),
        remote: Some(inventory.count_remote(ObjectType::User).await.unwrap()),
    };
    assert_eq!(row.local, 0);
    assert_eq!(row.remote, Some(42));
    assert!(row.render().ends_with("        42"));
}

// =========================================================================
// errors
// =========================================================================

#[tokio::test]
async fn test_unknown_tenant_is_authentication_error() {
    let ctx = TestContext::new().await;
    let stranger = Credentials::new(
        "99999999-9999-9999-9999-999999999999",
        common::CLIENT,
        "s3cret".to_string().into(),
    )
    .unwrap();

    let inventory = build_inventory(
        &ctx.paths,
        &ctx.config,
        &stranger,
        &Globals::new(LogLevel::Quiet),
    )
    .unwrap();
    let err: CliError = inventory
        .get_current(ObjectType::User, "", true)
        .await
        .unwrap_err()
        .into();

    assert!(matches!(err, CliError::AuthenticationFailed(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_remote_error_payload_exit_code() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/applications/delta"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BadRequest", "message": "Invalid $select"}
        })))
        .mount(&ctx.server)
        .await;

    let err: CliError = ctx
        .inventory()
        .get_current(ObjectType::Application, "", false)
        .await
        .unwrap_err()
        .into();

    assert!(matches!(err, CliError::Api { ref code, .. } if code == "BadRequest"));
    assert_eq!(err.exit_code(), 5);
}
