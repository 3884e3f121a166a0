// Configuration for the AI maintainer client

use std::path::PathBuf;

use nacos_ai_transport::{HttpAgentConfig, ProxyConfig};

use crate::{
    constants::{
        DEFAULT_CONTEXT_PATH, DEFAULT_LOG_BACKUP_COUNT, DEFAULT_LOG_LEVEL, DEFAULT_NAMESPACE,
        DEFAULT_TIMEOUT_MS, admin_api_path,
    },
    error::{MaintainerError, Result},
};

/// How deletes of records that do not exist are reported
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Absence is reported as `DeleteOutcome::Absent`
    #[default]
    Lenient,
    /// Absence is reported as `MaintainerError::NotFound`
    Strict,
}

/// Connection pool and connect-timeout tuning for the HTTP transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpTuning {
    pub connect_timeout_ms: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_ms: u64,
}

impl Default for HttpTuning {
    fn default() -> Self {
        let agent = HttpAgentConfig::default();
        Self {
            connect_timeout_ms: agent.connect_timeout_ms,
            pool_max_idle_per_host: agent.pool_max_idle_per_host,
            pool_idle_timeout_ms: agent.pool_idle_timeout_ms,
        }
    }
}

/// Immutable client configuration, produced by [`AiMaintainerClientConfigBuilder`]
#[derive(Clone, Debug)]
pub struct AiMaintainerClientConfig {
    server_address: String,
    namespace_id: String,
    username: Option<String>,
    password: Option<String>,
    context_path: String,
    timeout_ms: i64,
    log_dir: Option<PathBuf>,
    log_level: String,
    log_rotation_backup_count: usize,
    http: HttpTuning,
    delete_mode: DeleteMode,
}

impl AiMaintainerClientConfig {
    pub fn builder() -> AiMaintainerClientConfigBuilder {
        AiMaintainerClientConfigBuilder::default()
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Timeout as supplied; may be non-positive before client construction
    pub fn timeout_ms(&self) -> i64 {
        self.timeout_ms
    }

    /// Timeout the transport actually uses
    pub fn effective_timeout_ms(&self) -> u64 {
        if self.timeout_ms <= 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            self.timeout_ms as u64
        }
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }

    /// Configured log directory, or `<home>/logs/nacos/`
    pub fn effective_log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join("logs").join("nacos")
            }
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn log_rotation_backup_count(&self) -> usize {
        self.log_rotation_backup_count
    }

    pub fn http_tuning(&self) -> &HttpTuning {
        &self.http
    }

    pub fn delete_mode(&self) -> DeleteMode {
        self.delete_mode
    }

    /// Copy with the timeout and log directory defaults applied
    pub(crate) fn resolved(&self) -> Self {
        Self {
            timeout_ms: self.effective_timeout_ms() as i64,
            log_dir: Some(self.effective_log_dir()),
            ..self.clone()
        }
    }

    pub(crate) fn agent_config(&self) -> HttpAgentConfig {
        HttpAgentConfig::default()
            .with_timeout(self.effective_timeout_ms())
            .with_connect_timeout(self.http.connect_timeout_ms)
            .with_pool(
                self.http.pool_max_idle_per_host,
                self.http.pool_idle_timeout_ms,
            )
    }

    pub(crate) fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig::new(&self.server_address)
            .with_auth(
                self.username.as_deref().unwrap_or_default(),
                self.password.as_deref().unwrap_or_default(),
            )
            .with_context_path(&self.context_path)
            .with_auth_endpoint(admin_api_path::AUTH_LOGIN)
    }
}

/// Fluent builder for [`AiMaintainerClientConfig`]
#[derive(Clone, Debug, Default)]
pub struct AiMaintainerClientConfigBuilder {
    server_address: Option<String>,
    namespace_id: Option<String>,
    username: Option<String>,
    password: Option<String>,
    context_path: Option<String>,
    timeout_ms: Option<i64>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_rotation_backup_count: Option<usize>,
    http: Option<HttpTuning>,
    delete_mode: Option<DeleteMode>,
}

impl AiMaintainerClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `host:port`; a comma-separated list is accepted and its first entry used
    pub fn server_address(mut self, server_address: &str) -> Self {
        self.server_address = Some(server_address.to_string());
        self
    }

    pub fn namespace_id(mut self, namespace_id: &str) -> Self {
        self.namespace_id = Some(namespace_id.to_string());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn context_path(mut self, context_path: &str) -> Self {
        self.context_path = Some(context_path.to_string());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn log_level(mut self, log_level: &str) -> Self {
        self.log_level = Some(log_level.to_string());
        self
    }

    pub fn log_rotation_backup_count(mut self, count: usize) -> Self {
        self.log_rotation_backup_count = Some(count);
        self
    }

    pub fn http_config(mut self, http: HttpTuning) -> Self {
        self.http = Some(http);
        self
    }

    pub fn delete_mode(mut self, delete_mode: DeleteMode) -> Self {
        self.delete_mode = Some(delete_mode);
        self
    }

    pub fn build(self) -> Result<AiMaintainerClientConfig> {
        let server_address = self
            .server_address
            .as_deref()
            .and_then(|addrs| addrs.split(',').map(str::trim).find(|a| !a.is_empty()))
            .ok_or_else(|| {
                MaintainerError::Configuration("server_address is required".to_string())
            })?
            .to_string();

        // Empty credentials mean an unauthenticated client
        let username = self.username.filter(|u| !u.trim().is_empty());
        let password = match username {
            Some(_) => Some(self.password.unwrap_or_default()),
            None => None,
        };

        let log_dir = self
            .log_dir
            .filter(|dir| !dir.as_os_str().to_string_lossy().trim().is_empty());

        Ok(AiMaintainerClientConfig {
            server_address,
            namespace_id: self
                .namespace_id
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            username,
            password,
            context_path: self
                .context_path
                .unwrap_or_else(|| DEFAULT_CONTEXT_PATH.to_string()),
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS as i64),
            log_dir,
            log_level: self
                .log_level
                .filter(|level| !level.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_rotation_backup_count: self
                .log_rotation_backup_count
                .unwrap_or(DEFAULT_LOG_BACKUP_COUNT),
            http: self.http.unwrap_or_default(),
            delete_mode: self.delete_mode.unwrap_or_default(),
        })
    }
}
