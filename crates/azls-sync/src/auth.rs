//! OAuth2 client-credentials tokens for Graph and ARM.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::config::Endpoints;
use crate::error::{SyncError, SyncResult};
use crate::object_type::Api;

/// Service principal used to authenticate against the tenant.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Supplies bearer tokens to the HTTP client.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid access token for `api`.
    async fn token(&self, api: Api) -> SyncResult<String>;

    /// Drops any cached token for `api`, forcing a new one on next use.
    async fn invalidate(&self, _api: Api) {}
}

/// OAuth2 token response from the identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Token cache for one resource (`{resource}/.default` scope).
#[derive(Debug)]
pub struct TokenCache {
    credentials: Arc<ClientCredentials>,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(
        http_client: reqwest::Client,
        credentials: Arc<ClientCredentials>,
        login_url: &str,
        resource_url: &str,
    ) -> Self {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            login_url.trim_end_matches('/'),
            credentials.tenant_id
        );
        Self {
            credentials,
            token_url,
            scope: format!("{}/.default", resource_url.trim_end_matches('/')),
            http_client,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self), fields(scope = %self.scope))]
    pub async fn get_token(&self) -> SyncResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing access token");
        let new_token = self.acquire_token().await?;
        let access_token = new_token.access_token.clone();
        *self.cached_token.write().await = Some(new_token);
        Ok(access_token)
    }

    async fn acquire_token(&self) -> SyncResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| SyncError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }
}

/// One token cache per backing API.
#[derive(Debug)]
pub struct ClientCredentialTokens {
    graph: TokenCache,
    arm: TokenCache,
}

impl ClientCredentialTokens {
    pub fn new(
        http_client: reqwest::Client,
        credentials: ClientCredentials,
        endpoints: &Endpoints,
    ) -> Self {
        let credentials = Arc::new(credentials);
        Self {
            graph: TokenCache::new(
                http_client.clone(),
                Arc::clone(&credentials),
                &endpoints.login_url,
                &endpoints.graph_url,
            ),
            arm: TokenCache::new(
                http_client,
                credentials,
                &endpoints.login_url,
                &endpoints.arm_url,
            ),
        }
    }

    fn cache(&self, api: Api) -> &TokenCache {
        match api {
            Api::Graph => &self.graph,
            Api::Arm => &self.arm,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialTokens {
    async fn token(&self, api: Api) -> SyncResult<String> {
        self.cache(api).get_token().await
    }

    async fn invalidate(&self, api: Api) {
        self.cache(api).invalidate().await;
    }
}

/// Fixed token, for tests and pre-acquired tokens.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self, _api: Api) -> SyncResult<String> {
        Ok(self.0.clone())
    }
}
