//! Shared fixtures for azls CLI integration tests.

#![allow(dead_code)]

use azls_cli::commands::{build_inventory, Globals};
use azls_cli::config::{Config, ConfigPaths};
use azls_cli::credentials::Credentials;
use azls_cli::logging::LogLevel;
use azls_sync::{Endpoints, Inventory};
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "11111111-1111-1111-1111-111111111111";
pub const CLIENT: &str = "22222222-2222-2222-2222-222222222222";

/// Temporary config directory plus a mock server standing in for
/// Graph, ARM and the token endpoint.
pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
    pub paths: ConfigPaths,
    pub config: Config,
    pub credentials: Credentials,
}

impl TestContext {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::at(dir.path().join(".azls"));
        paths.ensure_dir_exists().unwrap();

        let config = Config {
            endpoints: Endpoints {
                graph_url: server.uri(),
                arm_url: format!("{}/arm", server.uri()),
                login_url: format!("{}/login", server.uri()),
            },
            timeout_secs: 5,
            max_retries: 0,
            ..Config::default()
        };
        config.save(&paths.config_file).unwrap();

        let credentials = Credentials::new(TENANT, CLIENT, "s3cret".to_string().into()).unwrap();
        credentials.save(&paths.credentials_file).unwrap();

        Mock::given(method("POST"))
            .and(path(format!("/login/{TENANT}/oauth2/v2.0/token")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        Self {
            server,
            dir,
            paths,
            config,
            credentials,
        }
    }

    pub fn inventory(&self) -> Inventory {
        build_inventory(
            &self.paths,
            &self.config,
            &self.credentials,
            &Globals::new(LogLevel::Quiet),
        )
        .unwrap()
    }

    pub fn arm(&self, suffix: &str) -> String {
        format!("/arm{suffix}")
    }

    /// Serves `body` for every GET of `route`.
    pub async fn mock_get(&self, route: impl Into<String>, body: Value) {
        Mock::given(method("GET"))
            .and(path(route.into()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
