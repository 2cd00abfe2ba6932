// API client module: a small blocking HTTP client for the MIO resource API.
// Every call returns the status code and the raw body; deciding what a
// status means is left to the caller.

use crate::config::RunConfig;
use crate::error::{ImportError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};

/// Media type used for every request and response body.
pub const MIO_MEDIA_TYPE: &str = "application/vnd.nativ.mio.v1+json";

/// Blocking client bound to one MIO instance and one set of credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, `None` when it is empty or not JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl ApiClient {
    /// Build a client for `config`. Authentication and media-type headers
    /// are attached to every request.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&config.credentials().authorization())
            .map_err(|_| ImportError::Input("credentials contain invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MIO_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(MIO_MEDIA_TYPE));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ImportError::Transport {
                endpoint: config.base_url().to_string(),
                source: e,
            })?;
        Ok(ApiClient {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            tracing::debug!(%method, %url, payload = %body, "sending request");
            req = req.body(body.to_string());
        } else {
            tracing::debug!(%method, %url, "sending request");
        }

        let res = req.send().map_err(|e| ImportError::Transport {
            endpoint: format!("{} {}", method, path),
            source: e,
        })?;
        let status = res.status().as_u16();
        let body = res.text().unwrap_or_else(|e| {
            tracing::debug!(%method, %url, status, error = %e, "could not read response body");
            String::new()
        });
        tracing::debug!(%method, %url, status, body = %body, "received response");
        Ok(ApiResponse { status, body })
    }

    pub fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body))
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::PUT, path, Some(body))
    }

    /// `GET /api/accounts`.
    pub fn list_accounts(&self) -> Result<ApiResponse> {
        self.get("/api/accounts")
    }

    /// True when the resource search by exact name reports at least one hit.
    pub fn resource_exists(&self, name: &str) -> Result<bool> {
        let res = self.get(&format!(
            "/api/resources;name={}",
            urlencoding::encode(name)
        ))?;
        if !res.is_success() {
            return Ok(false);
        }
        let total = res
            .json()
            .and_then(|v| v.get("totalCount").and_then(Value::as_u64))
            .unwrap_or(0);
        Ok(total > 0)
    }

    pub fn workflow_exists(&self, id: &str) -> Result<bool> {
        self.status_is_ok(&format!("/api/workflowDefinitions/{}", urlencoding::encode(id)))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.status_is_ok(&format!("/api/users/{}", urlencoding::encode(id)))
    }

    pub fn metadata_definition_exists(&self, id: &str) -> Result<bool> {
        self.status_is_ok(&format!(
            "/api/metadataDefinitions/{}",
            urlencoding::encode(id)
        ))
    }

    fn status_is_ok(&self, path: &str) -> Result<bool> {
        Ok(self.get(path)?.status == 200)
    }

    /// `POST /api/resources`.
    pub fn create_resource(&self, payload: &Value) -> Result<ApiResponse> {
        self.post("/api/resources", payload)
    }

    /// `PUT /api/resources/{id}/configuration`.
    pub fn configure_resource(&self, id: &str, configuration: &Value) -> Result<ApiResponse> {
        self.put(&format!("/api/resources/{}/configuration", id), configuration)
    }

    /// `POST /api/resources/{id}/tags` with a JSON list of tag strings.
    pub fn tag_resource(&self, id: &str, tags: &[String]) -> Result<ApiResponse> {
        self.post(&format!("/api/resources/{}/tags", id), &json!(tags))
    }

    /// `POST /api/resources/{id}/actions` asking for the `enable` action.
    pub fn enable_resource(&self, id: &str) -> Result<ApiResponse> {
        self.post(
            &format!("/api/resources/{}/actions", id),
            &json!({ "action": "enable", "options": {} }),
        )
    }
}
