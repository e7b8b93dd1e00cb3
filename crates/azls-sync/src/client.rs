//! API client collaborator: one `get` shape for both Graph and ARM.
//!
//! Graph paginates with `@odata.nextLink` and ends a delta round with
//! `@odata.deltaLink`; ARM paginates with `nextLink`. Both are normalised to
//! [`Continuation`] so the sync code never looks at raw link fields.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::auth::TokenProvider;
use crate::config::Endpoints;
use crate::error::{SyncError, SyncResult};
use crate::object_type::Api;
use crate::record::{records_from_value, RecordSet};

/// Where a paged query goes next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Continuation {
    /// More pages follow at this URL.
    Next(String),
    /// The round is complete; resume later from this delta link.
    Delta(String),
    /// No link at all.
    #[default]
    End,
}

impl Continuation {
    /// Reads the continuation out of a response body.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let link = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        if let Some(next) = link("@odata.nextLink").or_else(|| link("nextLink")) {
            Continuation::Next(next)
        } else if let Some(delta) = link("@odata.deltaLink") {
            Continuation::Delta(delta)
        } else {
            Continuation::End
        }
    }
}

/// Error object embedded in a response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// One normalised API response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    pub continuation: Continuation,
    pub error: Option<ApiErrorBody>,
}

impl ApiResponse {
    /// Builds a response from a decoded body, extracting links and any error object.
    #[must_use]
    pub fn from_body(body: Value) -> Self {
        let error = body
            .get("error")
            .filter(|e| e.is_object())
            .and_then(|_| serde_json::from_value::<ErrorEnvelope>(body.clone()).ok())
            .map(|envelope| envelope.error);
        Self {
            continuation: Continuation::from_body(&body),
            body,
            error,
        }
    }

    /// Fails with [`SyncError::Remote`] if the response carries an error payload.
    pub fn into_result(self) -> SyncResult<Self> {
        match self.error {
            Some(e) => Err(SyncError::Remote {
                code: e.code,
                message: e.message,
            }),
            None => Ok(self),
        }
    }

    /// Records under `value`; a missing or non-array `value` is a shape error.
    pub fn records(&self) -> SyncResult<RecordSet> {
        self.body
            .get("value")
            .cloned()
            .and_then(records_from_value)
            .ok_or_else(|| SyncError::Shape("response has no 'value' array".to_string()))
    }
}

/// Issues authenticated GET requests.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GETs `url` with extra `headers` and `query` parameters.
    ///
    /// Transport and decode failures are errors; an error object in the body
    /// is returned in [`ApiResponse::error`] for the caller to surface.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> SyncResult<ApiResponse>;
}

/// Result of following every page of a non-delta query.
#[derive(Debug, Clone, Default)]
pub struct Paged {
    pub records: RecordSet,
    pub calls: usize,
}

/// Follows next links until the query is exhausted.
///
/// A page without a `value` array contributes nothing. A terminal delta link
/// is treated as the end of the listing.
pub async fn get_all(
    client: &dyn ApiClient,
    url: &str,
    headers: &[(&str, &str)],
    query: &[(&str, &str)],
) -> SyncResult<Paged> {
    let mut paged = Paged::default();
    let mut response = client.get(url, headers, query).await?.into_result()?;
    loop {
        paged.calls += 1;
        match response.records() {
            Ok(records) => paged.records.extend(records),
            Err(SyncError::Shape(msg)) => warn!(url = %url, "{msg}, treating as empty"),
            Err(e) => return Err(e),
        }
        match response.continuation {
            Continuation::Next(next) => {
                response = client.get(&next, headers, &[]).await?.into_result()?;
            }
            Continuation::Delta(_) | Continuation::End => return Ok(paged),
        }
    }
}

/// Transport settings for [`HttpApiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoints: Endpoints,
    pub timeout: Duration,
    /// Retries for throttled and transient responses.
    pub max_retries: u32,
    /// First backoff delay; doubled on each transient retry.
    pub retry_base_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

/// `reqwest`-backed [`ApiClient`] with bearer auth and retry handling.
pub struct HttpApiClient {
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    settings: ClientSettings,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl HttpApiClient {
    /// Builds the HTTP client used for API calls.
    pub fn build_http(timeout: Duration) -> SyncResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("azls/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to create HTTP client: {e}")))
    }

    pub fn new(
        http_client: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            http_client,
            tokens,
            settings,
        }
    }

    fn api_for(&self, url: &str) -> Api {
        if url.starts_with(self.settings.endpoints.arm()) {
            Api::Arm
        } else {
            Api::Graph
        }
    }

    fn decode(status: reqwest::StatusCode, text: &str) -> SyncResult<ApiResponse> {
        let trimmed = text.trim();

        // `$count` endpoints answer with a bare integer.
        if let (true, Ok(count)) = (status.is_success(), trimmed.parse::<i64>()) {
            return Ok(ApiResponse::from_body(json!({ "value": count })));
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(body) => {
                let response = ApiResponse::from_body(body);
                if status.is_success() || response.error.is_some() {
                    Ok(response)
                } else {
                    Err(SyncError::Remote {
                        code: status.as_u16().to_string(),
                        message: trimmed.to_string(),
                    })
                }
            }
            Err(_) if !status.is_success() => Err(SyncError::Remote {
                code: status.as_u16().to_string(),
                message: trimmed.to_string(),
            }),
            Err(_) if trimmed.is_empty() => Ok(ApiResponse::from_body(Value::Null)),
            Err(e) => Err(SyncError::Parse(format!("Invalid JSON body: {e}"))),
        }
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip(self, headers, query))]
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> SyncResult<ApiResponse> {
        let api = self.api_for(url);
        let mut retries = 0;
        let mut delay = self.settings.retry_base_delay;
        let mut reauthenticated = false;

        loop {
            let token = self.tokens.token(api).await?;
            let mut request = self.http_client.get(url).bearer_auth(&token);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            if !query.is_empty() {
                request = request.query(query);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED && !reauthenticated {
                debug!("Token rejected, re-authenticating");
                self.tokens.invalidate(api).await;
                reauthenticated = true;
                continue;
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS && retries < self.settings.max_retries
            {
                retries += 1;
                let wait = retry_after(&response).unwrap_or(delay);
                warn!(
                    "Throttled, retry {}/{} after {:?}",
                    retries, self.settings.max_retries, wait
                );
                tokio::time::sleep(wait).await;
                delay *= 2;
                continue;
            }

            if matches!(
                status,
                reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            ) && retries < self.settings.max_retries
            {
                retries += 1;
                warn!(
                    "Transient error {}, retry {}/{} after {:?}",
                    status, retries, self.settings.max_retries, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            let text = response.text().await?;
            return Self::decode(status, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_continuation_normalisation() {
        assert_eq!(
            Continuation::from_body(&json!({"value": [], "@odata.nextLink": "n1"})),
            Continuation::Next("n1".into())
        );
        assert_eq!(
            Continuation::from_body(&json!({"value": [], "nextLink": "arm2"})),
            Continuation::Next("arm2".into())
        );
        assert_eq!(
            Continuation::from_body(&json!({"value": [], "@odata.deltaLink": "d"})),
            Continuation::Delta("d".into())
        );
        assert_eq!(
            Continuation::from_body(&json!({"value": [], "nextLink": null})),
            Continuation::End
        );
    }

    #[test]
    fn test_error_payload_detected() {
        let response = ApiResponse::from_body(json!({
            "error": {"code": "AuthorizationFailed", "message": "no access"}
        }));
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, SyncError::Remote { ref code, .. } if code == "AuthorizationFailed"));
    }

    #[test]
    fn test_string_error_field_is_not_a_payload() {
        let response = ApiResponse::from_body(json!({"value": [], "error": "none"}));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_decode_integer_body() {
        let response = HttpApiClient::decode(StatusCode::OK, "1234").unwrap();
        assert_eq!(response.body, json!({"value": 1234}));
    }

    #[test]
    fn test_decode_non_json_failure_is_remote() {
        let err = HttpApiClient::decode(StatusCode::NOT_FOUND, "<html>").unwrap_err();
        assert!(matches!(err, SyncError::Remote { ref code, .. } if code == "404"));
        let err = HttpApiClient::decode(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, SyncError::Parse(_)));
    }

    #[test]
    fn test_records_shape() {
        let response = ApiResponse::from_body(json!({"properties": {}}));
        assert!(matches!(response.records(), Err(SyncError::Shape(_))));
    }
}
