//! Backend API client
//!
//! Thin JSON-over-HTTP client for the backend origin. Every protected call
//! carries `Authorization: Bearer {token}`; the schema endpoint is public.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sessiongate_domain::AppConfig;
use tracing::{debug, info, instrument};

use super::errors::ApiError;

/// Configuration for the backend API client
#[derive(Debug, Clone)]
pub struct BackendApiConfig {
    /// Backend origin, e.g. `https://api.example.com`
    pub base_url: String,
    /// Scope prefix of the backend app registration (`api://{app-id}`)
    pub api_scope: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl BackendApiConfig {
    pub fn new(base_url: impl Into<String>, api_scope: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_scope: api_scope.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Backend API client
#[derive(Debug, Clone)]
pub struct BackendApiClient {
    http: Client,
    config: BackendApiConfig,
}

impl BackendApiClient {
    /// Create a client for `backend_origin` whose scopes live under
    /// `api_scope`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn new(backend_origin: &str, api_scope: &str) -> Result<Self, ApiError> {
        Self::with_config(BackendApiConfig::new(backend_origin, api_scope))
    }

    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn with_config(config: BackendApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.backend_origin, &config.identity.api_scope)
    }

    pub fn config(&self) -> &BackendApiConfig {
        &self.config
    }

    /// Fully qualified scope for a backend permission, e.g.
    /// `scope_for("api.read")` → `api://{app-id}/api.read`.
    pub fn scope_for(&self, permission: &str) -> String {
        format!("{}/{}", self.config.api_scope, permission.trim_start_matches('/'))
    }

    /// Execute an authenticated GET request
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, access_token), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).bearer_auth(access_token);
        let response = self.send(request, path).await?;
        let result = Self::decode(response).await?;
        info!(path = %path, "GET request successful");
        Ok(result)
    }

    /// Execute an authenticated POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, access_token, body), fields(path = %path))]
    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = self.request(Method::POST, path).bearer_auth(access_token).json(body);
        let response = self.send(request, path).await?;
        let result = Self::decode(response).await?;
        info!(path = %path, "POST request successful");
        Ok(result)
    }

    /// Fetch the backend's public OpenAPI document
    ///
    /// # Errors
    ///
    /// Returns error if request fails or the document is not JSON
    #[instrument(skip(self))]
    pub async fn openapi_schema(&self) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::GET, "/openapi.json"), "/openapi.json").await?;
        Self::decode(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.config.base_url, path.trim_start_matches('/'));
        debug!(method = %method, url = %url, "Backend request");
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.config.timeout)
            } else {
                ApiError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, path, &body));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        // 204/205 carry no body
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Decode(format!(
                    "No content response ({}), but response type cannot be deserialized from empty body",
                    status.as_u16()
                ))
            });
        }

        response.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_status_error(status: StatusCode, path: &str, body: &str) -> ApiError {
    let message = if body.is_empty() {
        format!("{path} returned status {status}")
    } else {
        format!("{path} returned status {status}: {body}")
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Auth(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::RateLimit(message)
    } else if status.is_server_error() {
        ApiError::Server(message)
    } else {
        ApiError::Client(message)
    }
}
