//! Common test utilities for azls-sync integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use azls_sync::{
    ApiClient, ApiResponse, Endpoints, ObjectType, Progress, RecordSet, SyncError, SyncResult,
};
use serde_json::{json, Value};

pub const GRAPH: &str = "https://graph.test";
pub const ARM: &str = "https://arm.test";
pub const TENANT: &str = "11111111-1111-1111-1111-111111111111";

pub fn endpoints() -> Endpoints {
    Endpoints {
        graph_url: GRAPH.to_string(),
        arm_url: ARM.to_string(),
        login_url: "https://login.test".to_string(),
    }
}

pub fn records(value: Value) -> RecordSet {
    azls_sync::records_from_value(value).unwrap()
}

/// Wraps items in an OData page.
pub fn odata_page(items: Value, next_link: Option<&str>, delta_link: Option<&str>) -> Value {
    let mut page = json!({ "value": items });
    if let Some(link) = next_link {
        page["@odata.nextLink"] = json!(link);
    }
    if let Some(link) = delta_link {
        page["@odata.deltaLink"] = json!(link);
    }
    page
}

pub fn arm_error(code: &str) -> Value {
    json!({"error": {"code": code, "message": format!("{code} raised by test")}})
}

pub fn subscription(id: &str, name: &str) -> Value {
    json!({
        "id": format!("/subscriptions/{id}"),
        "subscriptionId": id,
        "displayName": name,
        "state": "Enabled"
    })
}

pub fn role_assignment(name: &str, scope: &str) -> Value {
    json!({
        "id": format!("{scope}/providers/Microsoft.Authorization/roleAssignments/{name}"),
        "name": name,
        "properties": {
            "roleDefinitionId": "/providers/Microsoft.Authorization/roleDefinitions/acdd72a7",
            "principalId": "22222222-2222-2222-2222-222222222222",
            "principalType": "User",
            "scope": scope
        }
    })
}

pub fn role_definition(name: &str, role_name: &str, kind: &str) -> Value {
    json!({
        "id": format!("/providers/Microsoft.Authorization/roleDefinitions/{name}"),
        "name": name,
        "properties": {"roleName": role_name, "type": kind}
    })
}

pub fn root_scope_url(resource: &str) -> String {
    format!(
        "{ARM}/providers/Microsoft.Management/managementGroups/{TENANT}/providers/Microsoft.Authorization/{resource}"
    )
}

pub fn sub_scope_url(sub: &str, resource: &str) -> String {
    format!("{ARM}/subscriptions/{sub}/providers/Microsoft.Authorization/{resource}")
}

pub fn subscriptions_url() -> String {
    format!("{ARM}/subscriptions")
}

enum Reply {
    Body(Value),
    Fail(SyncError),
}

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory `ApiClient` answering from per-URL reply queues.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON body for the next GET of `url`.
    pub fn reply(&self, url: impl Into<String>, body: Value) -> &Self {
        self.push(url.into(), Reply::Body(body));
        self
    }

    /// Queues a failure for the next GET of `url`.
    pub fn fail(&self, url: impl Into<String>, error: SyncError) -> &Self {
        self.push(url.into(), Reply::Fail(error));
        self
    }

    fn push(&self, url: String, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(url)
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }
}

#[async_trait]
impl ApiClient for ScriptedClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> SyncResult<ApiResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Body(body)) => Ok(ApiResponse::from_body(body)),
            Some(Reply::Fail(error)) => Err(error),
            None => Err(SyncError::Transport(format!("no scripted reply for {url}"))),
        }
    }
}

/// Progress sink that remembers what it was told.
#[derive(Default)]
pub struct RecordingProgress {
    pub pages: Mutex<Vec<(usize, usize)>>,
    pub scopes: Mutex<Vec<(String, usize)>>,
    pub failures: Mutex<Vec<String>>,
}

impl Progress for RecordingProgress {
    fn sync_page(&self, _object_type: ObjectType, records: usize, calls: usize) {
        self.pages.lock().unwrap().push((records, calls));
    }

    fn scope_fetched(&self, _object_type: ObjectType, scope: &str, count: usize, _calls: usize) {
        self.scopes.lock().unwrap().push((scope.to_string(), count));
    }

    fn scope_failed(&self, _object_type: ObjectType, scope: &str, _error: &SyncError) {
        self.failures.lock().unwrap().push(scope.to_string());
    }
}
