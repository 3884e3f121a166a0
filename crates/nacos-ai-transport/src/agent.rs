//! Pooled HTTP agent
//!
//! `HttpAgent` owns a single `reqwest::Client`. The client keeps an internal
//! connection pool that is shared by every call made through the agent, so
//! concurrent requests check connections out and back in without any locking
//! on our side. A connection in use by a future that gets dropped (caller
//! cancellation or timeout) is closed by `reqwest` rather than leaked.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, TransportError};

/// Ordered list of `key=value` pairs used for query strings and form bodies
pub type Params = Vec<(String, String)>;

/// Tuning for the HTTP agent
#[derive(Clone, Debug)]
pub struct HttpAgentConfig {
    /// Upper bound for a whole call, connect + send + body read
    pub timeout_ms: u64,
    /// Connection establishment timeout
    pub connect_timeout_ms: u64,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// How long an idle connection stays in the pool
    pub pool_idle_timeout_ms: u64,
}

impl Default for HttpAgentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 3_000,
            pool_max_idle_per_host: 16,
            pool_idle_timeout_ms: 90_000,
        }
    }
}

impl HttpAgentConfig {
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    pub fn with_pool(mut self, max_idle_per_host: usize, idle_timeout_ms: u64) -> Self {
        self.pool_max_idle_per_host = max_idle_per_host;
        self.pool_idle_timeout_ms = idle_timeout_ms;
        self
    }
}

/// HTTP verbs used against the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Raw response: status code plus the undecoded body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Turn a non-2xx response into `TransportError::Status`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status: self.status,
                message: self.body,
            })
        }
    }
}

/// Connection-pooled HTTP agent with a hard per-call timeout
pub struct HttpAgent {
    client: Client,
    timeout: Duration,
}

impl HttpAgent {
    /// Create a new agent; the pool lives as long as the agent does
    pub fn new(config: &HttpAgentConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_millis(config.pool_idle_timeout_ms))
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a single request. Non-2xx statuses are returned, not raised.
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(String, String)],
        form: Option<&[(String, String)]>,
    ) -> Result<HttpResponse> {
        let mut builder = self.client.request(method.into(), url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(form) = form {
            builder = builder.form(form);
        }

        let call = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, body })
        };

        let timeout_ms = self.timeout.as_millis() as u64;
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => {
                debug!("{} {} -> {}", method.as_str(), url, response.status);
                Ok(response)
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!("{} {} timed out after {}ms", method.as_str(), url, timeout_ms);
                Err(TransportError::Timeout { timeout_ms })
            }
            Ok(Err(e)) => {
                warn!("{} {} failed: {}", method.as_str(), url, e);
                Err(TransportError::Network(e))
            }
            Err(_) => {
                warn!("{} {} timed out after {}ms", method.as_str(), url, timeout_ms);
                Err(TransportError::Timeout { timeout_ms })
            }
        }
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.request(HttpMethod::Get, url, headers, query, None).await
    }

    pub async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.request(HttpMethod::Post, url, headers, query, Some(form))
            .await
    }

    pub async fn put(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.request(HttpMethod::Put, url, headers, query, Some(form))
            .await
    }

    pub async fn delete(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.request(HttpMethod::Delete, url, headers, query, None)
            .await
    }
}
