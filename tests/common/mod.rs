//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use burrow_api::{AppState, build_router};
use burrow_core::config::AppConfig;
use burrow_plugin::{PluginCatalog, resolve};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    // Keep the plugin config and asset directories alive for the app's life.
    _config_dir: TempDir,
    _asset_dir: TempDir,
}

impl TestApp {
    /// App with every shipped plugin enabled.
    pub async fn new() -> Self {
        Self::with_disabled(&[]).await
    }

    /// App whose named plugins have no configuration file, leaving them
    /// disabled at resolution time. Routes stay bound regardless.
    pub async fn with_disabled(disabled: &[&str]) -> Self {
        let config_dir = tempfile::tempdir().expect("Failed to create config dir");
        let asset_dir = tempfile::tempdir().expect("Failed to create asset dir");
        std::fs::write(asset_dir.path().join("index.html"), "<html>burrow</html>")
            .expect("Failed to write test asset");

        for name in ["static", "trail", "minimap"] {
            if disabled.contains(&name) {
                continue;
            }
            let contents = if name == "static" {
                format!("[settings]\nroots = [{:?}]\n", asset_dir.path().to_string_lossy())
            } else {
                "[plugin]\nenabled = true\n".to_string()
            };
            std::fs::write(config_dir.path().join(format!("{name}.toml")), contents)
                .expect("Failed to write plugin config");
        }

        let mut config = AppConfig::default();
        config.plugins.config_dir = config_dir.path().to_string_lossy().into_owned();

        let catalog = PluginCatalog::discover(
            &config.plugins,
            &[
                plugin_static::builtin(),
                plugin_trail::builtin(),
                plugin_minimap::builtin(),
            ],
        );
        let registry = resolve(catalog.descriptors());
        let plugin_routes = catalog.routes().cloned().collect();

        let state = AppState::new(config, registry);
        let router = build_router(state, plugin_routes);

        Self {
            router,
            _config_dir: config_dir,
            _asset_dir: asset_dir,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(cookie) = cookie {
            req = req.header("Cookie", cookie);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.to_string());

        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            cookie,
            body,
            raw,
        }
    }

    /// Creates a maze and returns (session cookie, maze value).
    pub async fn start_game(&self, body: Value) -> (String, Value) {
        let response = self.request("POST", "/maze", Some(body), None).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "maze creation failed: {:?}",
            response.body
        );
        let cookie = response.cookie.clone().expect("No session cookie set");
        (cookie, response.body)
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// The `name=value` pair from the Set-Cookie header, if any
    pub cookie: Option<String>,
    /// Parsed JSON body (null when the body is empty or not JSON)
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}

/// Identifiers of rooms directly connected to the deep room value's room.
pub fn connected_identifiers(room: &Value) -> Vec<u64> {
    room["walls"]
        .as_array()
        .expect("room has no walls")
        .iter()
        .filter_map(|wall| wall["target"].as_object())
        .filter_map(|target| target["identifier"].as_u64())
        .collect()
}
