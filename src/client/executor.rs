use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use crate::client::config::BotConfig;
use crate::client::credentials::UserCredential;
use crate::client::error::{ClientError, Result};

/// Marker the server puts in the `code` field when an access token is
/// expired or unknown.
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Joins the service base URL and an endpoint path.
pub fn build_url(base_url: &str, path: &str) -> String {
    match (base_url.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base_url, &path[1..]),
        (false, false) if !path.is_empty() => format!("{}/{}", base_url, path),
        _ => format!("{}{}", base_url, path),
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json"))
}

fn is_token_not_valid(body: &Value) -> bool {
    body.get("code").and_then(Value::as_str) == Some(TOKEN_NOT_VALID)
}

/// Everything about a request except the method and the credential, so the
/// same request can be re-sent after a refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            json: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

/// HTTP client bound to one remote service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<BotConfig>,
}

impl ApiClient {
    pub fn new(config: Arc<BotConfig>) -> Result<Self> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    /// Same as [`ApiClient::new`] with a per-request timeout other than 30s.
    pub fn with_timeout(config: Arc<BotConfig>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        build_url(&self.config.base_url, path)
    }

    /// Status and JSON body of a response. `204 No Content` reads as `null`;
    /// any other non-JSON response is a protocol error.
    async fn read_json(response: reqwest::Response) -> Result<(StatusCode, Value)> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok((status, Value::Null));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !content_type.as_deref().is_some_and(is_json) {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Protocol { content_type, body });
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("{}: {}", e, text)))?;
        Ok((status, body))
    }

    /// Unauthenticated JSON POST, used by signup/login/refresh.
    pub(crate) async fn post_public(&self, url: &str, payload: &Value) -> Result<(StatusCode, Value)> {
        let response = self.http.post(url).json(payload).send().await?;
        Self::read_json(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        credential: &UserCredential,
        request: &ApiRequest,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = self
            .http
            .request(method.clone(), &request.url)
            .header(AUTHORIZATION, credential.auth_header());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        Self::read_json(response).await
    }

    /// Sends an authenticated request.
    ///
    /// If the server reports the access token as not valid, the credential is
    /// refreshed and the request is sent exactly once more. A second rejection
    /// (or a transport failure on the retry) is an authentication error, so a
    /// logical request never costs more than two calls to `request.url`.
    pub async fn execute(
        &self,
        method: Method,
        credential: &mut UserCredential,
        request: &ApiRequest,
    ) -> Result<Value> {
        let (status, body) = self.send_once(&method, credential, request).await?;
        if !is_token_not_valid(&body) {
            return Self::check_status(status, body);
        }

        tracing::debug!(username = credential.username(), url = %request.url, "access token expired");
        self.refresh(credential).await?;

        let (status, body) = match self.send_once(&method, credential, request).await {
            Ok(response) => response,
            Err(ClientError::Transport(e)) => {
                return Err(ClientError::Authentication(format!(
                    "retry after token refresh failed: {}",
                    e
                )))
            }
            Err(e) => return Err(e),
        };
        if is_token_not_valid(&body) {
            return Err(ClientError::Authentication(format!(
                "token still not valid after refresh: {}",
                body
            )));
        }

        Self::check_status(status, body)
    }

    fn check_status(status: StatusCode, body: Value) -> Result<Value> {
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
