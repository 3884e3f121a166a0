//! Authenticated proxy in front of the HTTP agent
//!
//! Resolves registry paths against the server base URL, logs in with
//! username/password when credentials are configured and attaches the
//! resulting access token to every request.

use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
    agent::{HttpAgent, HttpAgentConfig, HttpMethod, HttpResponse},
    error::{Result, TransportError},
};

const ACCESS_TOKEN_HEADER: &str = "accessToken";
const DEFAULT_TOKEN_TTL_SECS: i64 = 18_000;
const TOKEN_REFRESH_WINDOW: Duration = Duration::from_secs(300);

/// Where and how to reach the registry
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Server address, `host:port` with or without an `http(s)://` scheme
    pub server_addr: String,
    /// Context path (e.g. "nacos")
    pub context_path: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Login endpoint path
    pub auth_endpoint: String,
}

impl ProxyConfig {
    pub fn new(server_addr: &str) -> Self {
        Self {
            server_addr: server_addr.to_string(),
            context_path: "nacos".to_string(),
            username: None,
            password: None,
            auth_endpoint: "/v3/auth/user/login".to_string(),
        }
    }

    /// Set credentials; an empty username disables authentication
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        if username.is_empty() {
            self.username = None;
            self.password = None;
        } else {
            self.username = Some(username.to_string());
            self.password = Some(password.to_string());
        }
        self
    }

    pub fn with_context_path(mut self, path: &str) -> Self {
        self.context_path = path.to_string();
        self
    }

    pub fn with_auth_endpoint(mut self, endpoint: &str) -> Self {
        self.auth_endpoint = endpoint.to_string();
        self
    }
}

/// Token info for authentication
#[derive(Clone, Debug)]
struct TokenInfo {
    access_token: String,
    /// Past this point the token is renewed before use
    refresh_at: Instant,
}

/// Renew `TOKEN_REFRESH_WINDOW` before expiry, or halfway through a shorter TTL
fn refresh_window(ttl: Duration) -> Duration {
    TOKEN_REFRESH_WINDOW.min(ttl / 2)
}

/// HTTP proxy that adds base URL resolution and authentication to `HttpAgent`
pub struct ClientHttpProxy {
    agent: HttpAgent,
    base_url: String,
    config: ProxyConfig,
    token: RwLock<Option<TokenInfo>>,
}

impl ClientHttpProxy {
    pub fn new(config: ProxyConfig, agent_config: &HttpAgentConfig) -> Result<Self> {
        let agent = HttpAgent::new(agent_config)?;
        let base_url = normalize_server_addr(&config.server_addr);

        Ok(Self {
            agent,
            base_url,
            config,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.agent.timeout()
    }

    pub fn has_credentials(&self) -> bool {
        self.config.username.is_some()
    }

    /// Build full URL with context path
    pub fn build_url(&self, path: &str) -> String {
        let context_path = self.config.context_path.trim_matches('/');

        if context_path.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}{}", self.base_url, context_path, path)
        }
    }

    /// Get the current access token if it is not about to expire
    fn get_token(&self) -> Option<String> {
        let token_guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        token_guard
            .as_ref()
            .filter(|t| t.refresh_at > Instant::now())
            .map(|t| t.access_token.clone())
    }

    fn set_token(&self, access_token: String, ttl_seconds: i64) {
        let ttl = Duration::from_secs(ttl_seconds.max(0) as u64);
        let refresh_at = Instant::now() + (ttl - refresh_window(ttl));
        let mut token_guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *token_guard = Some(TokenInfo {
            access_token,
            refresh_at,
        });
    }

    fn invalidate_token(&self) {
        let mut token_guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *token_guard = None;
    }

    /// Log in with the configured credentials and cache the access token
    pub async fn authenticate(&self) -> Result<()> {
        self.login().await.map(|_| ())
    }

    /// Returns the fresh token, or `None` without credentials
    async fn login(&self) -> Result<Option<String>> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Ok(None);
        };

        let url = self.build_url(&self.config.auth_endpoint);
        debug!("Authenticating with server: {}", url);

        let form = vec![
            ("username".to_string(), username.clone()),
            ("password".to_string(), password.clone()),
        ];
        let response = self.agent.post(&url, &[], &[], &form).await?;

        if !response.is_success() {
            return Err(TransportError::AuthFailed(format!(
                "login returned status {}: {}",
                response.status, response.body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .map_err(|e| TransportError::AuthFailed(format!("invalid login response: {}", e)))?;

        let access_token = result
            .get("accessToken")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TransportError::AuthFailed("no accessToken in response".to_string()))?;
        let ttl = result
            .get("tokenTtl")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        self.set_token(access_token.to_string(), ttl);
        debug!("Authentication successful, token expires in {} seconds", ttl);
        Ok(Some(access_token.to_string()))
    }

    /// Ensure we have a valid token, logging in if needed
    async fn ensure_token(&self) -> Result<Option<String>> {
        if !self.has_credentials() {
            return Ok(None);
        }
        if let Some(token) = self.get_token() {
            return Ok(Some(token));
        }

        // A just-issued token is used even when its TTL is shorter than the refresh window
        self.login().await
    }

    /// Login (if due) and request share one timeout budget
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        form: Option<&[(String, String)]>,
    ) -> Result<HttpResponse> {
        let timeout = self.agent.timeout();
        tokio::time::timeout(timeout, self.send_authenticated(method, path, query, form))
            .await
            .unwrap_or(Err(TransportError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }))
    }

    async fn send_authenticated(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        form: Option<&[(String, String)]>,
    ) -> Result<HttpResponse> {
        let url = self.build_url(path);
        let token = self.ensure_token().await?;
        let headers: Vec<(&str, &str)> = token
            .as_deref()
            .map(|t| vec![(ACCESS_TOKEN_HEADER, t)])
            .unwrap_or_default();

        let response = self
            .agent
            .request(method, &url, &headers, query, form)
            .await?;

        if response.status == 401 && token.is_some() {
            // The next call logs in again; this one is surfaced as-is.
            warn!("Token rejected by {}, dropping cached token", url);
            self.invalidate_token();
        }

        Ok(response)
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.send(HttpMethod::Get, path, query, None)
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.send(HttpMethod::Post, path, query, Some(form))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.send(HttpMethod::Put, path, query, Some(form))
            .await
    }

    pub async fn delete(&self, path: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.send(HttpMethod::Delete, path, query, None)
            .await
    }
}

/// `localhost:8848` -> `http://localhost:8848`; an explicit scheme is kept
fn normalize_server_addr(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}
