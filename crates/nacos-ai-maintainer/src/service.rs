// NacosAiMaintainerService - facade for the AI admin API (MCP servers and A2A agents)

use std::future::Future;

use nacos_ai_transport::ClientHttpProxy;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    codec,
    config::{AiMaintainerClientConfig, DeleteMode},
    constants::{DEFAULT_LOG_MODULE, admin_api_path, search_mode},
    error::{MaintainerError, Result},
    logging::ClientLogger,
    model::{
        AgentCard, AgentCardDetailInfo, AgentCardVersionInfo, AgentVersionDetail, DeleteOutcome,
        McpEndpointSpec, McpServerBasicInfo, McpServerDetailInfo, McpToolSpecification, Page,
        RegistrationType,
    },
};

/// Maintainer client for MCP server and agent card records
///
/// Safe to share between tasks; calls do not block each other. Every call runs
/// under the client's own logger.
pub struct NacosAiMaintainerService {
    config: AiMaintainerClientConfig,
    proxy: ClientHttpProxy,
    logger: ClientLogger,
}

impl NacosAiMaintainerService {
    /// Build a ready client: logger first, then the pooled transport.
    ///
    /// When credentials are configured an initial login is attempted; a
    /// failed login is logged and retried on the first call.
    pub async fn create_ai_service(config: AiMaintainerClientConfig) -> Result<Self> {
        let config = config.resolved();
        let log_dir = config.effective_log_dir();
        let logger = ClientLogger::new(
            &log_dir,
            DEFAULT_LOG_MODULE,
            config.log_level(),
            config.log_rotation_backup_count(),
        )?;

        let proxy = ClientHttpProxy::new(config.proxy_config(), &config.agent_config())
            .map_err(|e| MaintainerError::Configuration(e.to_string()))?;

        let service = Self {
            config,
            proxy,
            logger,
        };

        service
            .scoped(async {
                info!("log directory: {}.", log_dir.display());
                debug!(
                    "Maintainer client for {} (namespace {}, timeout {}ms)",
                    service.proxy.base_url(),
                    service.config.namespace_id(),
                    service.config.effective_timeout_ms()
                );
                if service.proxy.has_credentials()
                    && let Err(e) = service.proxy.authenticate().await
                {
                    warn!("Initial login failed, retrying on first request: {}", e);
                }
                Ok(())
            })
            .await?;

        Ok(service)
    }

    pub fn config(&self) -> &AiMaintainerClientConfig {
        &self.config
    }

    pub fn logger(&self) -> &ClientLogger {
        &self.logger
    }

    async fn scoped<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        self.logger.scope(call).await
    }

    fn absent(&self, resource: String) -> Result<DeleteOutcome> {
        match self.config.delete_mode() {
            DeleteMode::Lenient => {
                info!("{} does not exist, nothing to delete", resource);
                Ok(DeleteOutcome::Absent)
            }
            DeleteMode::Strict => Err(MaintainerError::NotFound { resource }),
        }
    }

    fn delete_outcome(&self, result: Result<Value>, resource: String) -> Result<DeleteOutcome> {
        match result {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => self.absent(resource),
            Err(e) => Err(e),
        }
    }

    // ============================================================================
    // AI MCP APIs
    // ============================================================================

    /// Create a new MCP server version; returns the registry-assigned id
    pub async fn create_mcp_server(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        server_spec: &McpServerBasicInfo,
        tool_spec: Option<&McpToolSpecification>,
        endpoint_spec: Option<&McpEndpointSpec>,
    ) -> Result<String> {
        self.scoped(async {
            let form = codec::encode_mcp_write(
                namespace_id,
                mcp_name,
                server_spec,
                tool_spec,
                endpoint_spec,
                None,
            )?;
            let response = self.proxy.post(admin_api_path::AI_MCP, &[], &form).await?;
            let data = codec::decode_ack(response, &mcp_resource(mcp_name, None))?;

            info!(
                "Created mcp server {}/{} version {}",
                namespace_id,
                mcp_name,
                server_spec.version().unwrap_or_default()
            );
            Ok(match data {
                Value::String(id) => id,
                Value::Null => String::new(),
                other => other.to_string(),
            })
        })
        .await
    }

    /// Detail of one version; `None` resolves to the latest version
    pub async fn get_mcp_server_detail(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        version: Option<&str>,
    ) -> Result<McpServerDetailInfo> {
        self.scoped(async {
            let query = codec::encode_mcp_query(namespace_id, mcp_name, version)?;
            let response = self.proxy.get(admin_api_path::AI_MCP, &query).await?;
            codec::decode_required(response, &mcp_resource(mcp_name, version))
        })
        .await
    }

    /// Replace basic info, tools and endpoint of an existing server
    pub async fn update_mcp_server(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        is_latest: bool,
        server_spec: &McpServerBasicInfo,
        tool_spec: Option<&McpToolSpecification>,
        endpoint_spec: Option<&McpEndpointSpec>,
    ) -> Result<bool> {
        self.scoped(async {
            let form = codec::encode_mcp_write(
                namespace_id,
                mcp_name,
                server_spec,
                tool_spec,
                endpoint_spec,
                Some(is_latest),
            )?;
            let response = self.proxy.put(admin_api_path::AI_MCP, &[], &form).await?;
            codec::decode_ack(response, &mcp_resource(mcp_name, None))?;

            info!(
                "Updated mcp server {}/{} to version {} (latest: {})",
                namespace_id,
                mcp_name,
                server_spec.version().unwrap_or_default(),
                is_latest
            );
            Ok(true)
        })
        .await
    }

    /// Delete one version, or every version when `version` is `None`
    pub async fn delete_mcp_server(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        version: Option<&str>,
    ) -> Result<DeleteOutcome> {
        self.scoped(async {
            let query = codec::encode_mcp_query(namespace_id, mcp_name, version)?;
            let resource = mcp_resource(mcp_name, version);
            let response = self.proxy.delete(admin_api_path::AI_MCP, &query).await?;
            let outcome = self.delete_outcome(codec::decode_ack(response, &resource), resource)?;

            if outcome == DeleteOutcome::Deleted {
                info!("Deleted mcp server {}/{}", namespace_id, mcp_name);
            }
            Ok(outcome)
        })
        .await
    }

    /// Servers whose name matches `mcp_name_pattern` (fuzzy)
    pub async fn search_mcp_server(
        &self,
        namespace_id: &str,
        mcp_name_pattern: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<McpServerBasicInfo>> {
        self.list_mcp(
            namespace_id,
            mcp_name_pattern,
            search_mode::BLUR,
            page_no,
            page_size,
        )
        .await
    }

    /// Servers whose name equals `mcp_name`; an empty name lists all
    pub async fn list_mcp_servers(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<McpServerBasicInfo>> {
        self.list_mcp(
            namespace_id,
            mcp_name,
            search_mode::ACCURATE,
            page_no,
            page_size,
        )
        .await
    }

    async fn list_mcp(
        &self,
        namespace_id: &str,
        mcp_name: &str,
        search: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<McpServerBasicInfo>> {
        self.scoped(async {
            let query = codec::encode_list_query(
                "mcpName",
                namespace_id,
                mcp_name,
                search,
                page_no,
                page_size,
            )?;
            let response = self.proxy.get(admin_api_path::AI_MCP_LIST, &query).await?;
            let page: Option<Page<McpServerBasicInfo>> =
                codec::decode_data(response, "mcp server list")?;
            Ok(page.unwrap_or_default())
        })
        .await
    }

    // ============================================================================
    // AI Agent (A2A) APIs
    // ============================================================================

    pub async fn register_agent(
        &self,
        agent_card: &AgentCard,
        namespace_id: &str,
        registration_type: RegistrationType,
    ) -> Result<bool> {
        self.scoped(async {
            let form = codec::encode_agent_write(agent_card, namespace_id, registration_type, None)?;
            let response = self.proxy.post(admin_api_path::AI_AGENT, &[], &form).await?;
            codec::decode_ack(response, &agent_resource(&agent_card.name))?;

            info!(
                "Registered agent {}/{} version {}",
                namespace_id, agent_card.name, agent_card.version
            );
            Ok(true)
        })
        .await
    }

    /// Latest version of an agent card
    pub async fn get_agent_card(
        &self,
        namespace_id: &str,
        agent_name: &str,
        registration_type: Option<RegistrationType>,
    ) -> Result<AgentCardDetailInfo> {
        self.get_agent_card_detail(namespace_id, agent_name, None, registration_type)
            .await
    }

    /// One version of an agent card; `None` resolves to the latest version
    pub async fn get_agent_card_detail(
        &self,
        namespace_id: &str,
        agent_name: &str,
        version: Option<&str>,
        registration_type: Option<RegistrationType>,
    ) -> Result<AgentCardDetailInfo> {
        self.scoped(async {
            let mut query = codec::encode_agent_query(namespace_id, agent_name, registration_type)?;
            if let Some(version) = version.filter(|v| !v.is_empty()) {
                query.push(("version".to_string(), version.to_string()));
            }
            let response = self.proxy.get(admin_api_path::AI_AGENT, &query).await?;
            codec::decode_required(response, &agent_resource(agent_name))
        })
        .await
    }

    pub async fn update_agent_card(
        &self,
        agent_card: &AgentCard,
        namespace_id: &str,
        set_as_latest: bool,
        registration_type: RegistrationType,
    ) -> Result<bool> {
        self.scoped(async {
            let form = codec::encode_agent_write(
                agent_card,
                namespace_id,
                registration_type,
                Some(set_as_latest),
            )?;
            let response = self.proxy.put(admin_api_path::AI_AGENT, &[], &form).await?;
            codec::decode_ack(response, &agent_resource(&agent_card.name))?;

            info!(
                "Updated agent {}/{} to version {} (latest: {})",
                namespace_id, agent_card.name, agent_card.version, set_as_latest
            );
            Ok(true)
        })
        .await
    }

    /// Every registered version; an unknown agent has none
    pub async fn list_all_version_of_agent(
        &self,
        namespace_id: &str,
        agent_name: &str,
    ) -> Result<Vec<AgentVersionDetail>> {
        self.scoped(async {
            let query = codec::encode_agent_query(namespace_id, agent_name, None)?;
            let response = self
                .proxy
                .get(admin_api_path::AI_AGENT_VERSION_LIST, &query)
                .await?;

            match codec::decode_data::<Vec<AgentVersionDetail>>(response, &agent_resource(agent_name))
            {
                Ok(versions) => Ok(versions.unwrap_or_default()),
                Err(e) if e.is_not_found() => {
                    debug!("Agent {} has no versions", agent_name);
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Agents whose name equals `agent_name`; an empty name lists all
    pub async fn list_agent_cards_by_name(
        &self,
        namespace_id: &str,
        agent_name: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<AgentCardVersionInfo>> {
        self.list_agents(
            namespace_id,
            agent_name,
            search_mode::ACCURATE,
            page_no,
            page_size,
        )
        .await
    }

    /// Agents whose name matches `agent_name_pattern` (fuzzy)
    pub async fn search_agent_cards_by_name(
        &self,
        namespace_id: &str,
        agent_name_pattern: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<AgentCardVersionInfo>> {
        self.list_agents(
            namespace_id,
            agent_name_pattern,
            search_mode::BLUR,
            page_no,
            page_size,
        )
        .await
    }

    async fn list_agents(
        &self,
        namespace_id: &str,
        agent_name: &str,
        search: &str,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<AgentCardVersionInfo>> {
        self.scoped(async {
            let query = codec::encode_list_query(
                "agentName",
                namespace_id,
                agent_name,
                search,
                page_no,
                page_size,
            )?;
            let response = self.proxy.get(admin_api_path::AI_AGENT_LIST, &query).await?;
            let page: Option<Page<AgentCardVersionInfo>> =
                codec::decode_data(response, "agent list")?;
            Ok(page.unwrap_or_default())
        })
        .await
    }

    /// Delete an agent and all of its versions
    pub async fn delete_agent(&self, namespace_id: &str, agent_name: &str) -> Result<DeleteOutcome> {
        self.scoped(async {
            let query = codec::encode_agent_query(namespace_id, agent_name, None)?;
            let resource = agent_resource(agent_name);
            let response = self.proxy.delete(admin_api_path::AI_AGENT, &query).await?;
            let outcome = self.delete_outcome(codec::decode_ack(response, &resource), resource)?;

            if outcome == DeleteOutcome::Deleted {
                info!("Deleted agent {}/{}", namespace_id, agent_name);
            }
            Ok(outcome)
        })
        .await
    }
}

impl std::fmt::Debug for NacosAiMaintainerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NacosAiMaintainerService")
            .field("base_url", &self.proxy.base_url())
            .field("namespace_id", &self.config.namespace_id())
            .field("logger", &self.logger)
            .finish()
    }
}

fn mcp_resource(mcp_name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if !version.is_empty() => {
            format!("mcp server '{}' version '{}'", mcp_name, version)
        }
        _ => format!("mcp server '{}'", mcp_name),
    }
}

fn agent_resource(agent_name: &str) -> String {
    format!("agent '{}'", agent_name)
}
