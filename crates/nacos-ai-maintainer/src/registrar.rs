//! Register an MCP server backed by a service instance group
//!
//! The facade never upserts on its own. [`register_mcp_server`] is the
//! caller-side policy: probe the version with `get_mcp_server_detail`, then
//! update it (as latest) when present or create it otherwise.

use tracing::{info, warn};

use crate::{
    error::{MaintainerError, Result},
    model::{McpCapability, McpEndpointSpec, McpServerBasicInfo, McpToolSpecification},
    service::NacosAiMaintainerService,
    tool::{ExternalTool, SkippedTool, ToolFilterOutcome, filter_valid_tools},
};

pub const DEFAULT_PROTOCOL: &str = "mcp-sse";
pub const DEFAULT_EXPORT_PATH: &str = "/mcp";
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// What to register, built with `with_*` setters
#[derive(Clone, Debug)]
pub struct McpRegistration {
    pub namespace_id: String,
    pub service_name: String,
    pub version: String,
    pub group_name: String,
    pub protocol: String,
    pub front_protocol: String,
    pub export_path: String,
    pub description: String,
    pub tools: Vec<ExternalTool>,
}

impl McpRegistration {
    pub fn new(namespace_id: &str, service_name: &str, version: &str) -> Self {
        Self {
            namespace_id: namespace_id.to_string(),
            service_name: service_name.to_string(),
            version: version.to_string(),
            group_name: DEFAULT_GROUP.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            front_protocol: DEFAULT_PROTOCOL.to_string(),
            export_path: DEFAULT_EXPORT_PATH.to_string(),
            description: String::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_group(mut self, group_name: &str) -> Self {
        self.group_name = group_name.to_string();
        self
    }

    pub fn with_protocol(mut self, protocol: &str, front_protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self.front_protocol = front_protocol.to_string();
        self
    }

    pub fn with_export_path(mut self, export_path: &str) -> Self {
        self.export_path = export_path.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_tools(mut self, tools: Vec<ExternalTool>) -> Self {
        self.tools = tools;
        self
    }

    /// Filtered tools; skipped entries are reported, never fatal
    pub fn tools(&self) -> ToolFilterOutcome {
        filter_valid_tools(self.tools.iter().cloned())
    }

    /// Basic info for the server; TOOL is advertised only when a tool survives
    pub fn server_spec(&self, tool_spec: &McpToolSpecification) -> McpServerBasicInfo {
        let server_spec = McpServerBasicInfo::new(&self.service_name)
            .with_version(&self.version)
            .with_description(&self.description)
            .with_protocol(&self.protocol, &self.front_protocol)
            .with_remote_export_path(&self.export_path);
        if tool_spec.is_empty() {
            server_spec
        } else {
            server_spec.with_capabilities(vec![McpCapability::Tool])
        }
    }

    pub fn endpoint_spec(&self) -> McpEndpointSpec {
        McpEndpointSpec::reference(&self.namespace_id, &self.service_name, &self.group_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationAction {
    /// A new server version was created; carries the registry id
    Created(String),
    /// An existing version was replaced and marked latest
    Updated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationReport {
    pub action: RegistrationAction,
    pub skipped_tools: Vec<SkippedTool>,
}

/// Create or update the server version described by `registration`
pub async fn register_mcp_server(
    service: &NacosAiMaintainerService,
    registration: &McpRegistration,
) -> Result<RegistrationReport> {
    service
        .logger()
        .scope(async {
            let tools = registration.tools();
            tools.log_skipped();
            let skipped_tools = tools.skipped.clone();
            let tool_spec = tools.into_specification();
            let server_spec = registration.server_spec(&tool_spec);
            let endpoint_spec = registration.endpoint_spec();
            let namespace_id = registration.namespace_id.as_str();
            let name = registration.service_name.as_str();

            let exists = match service
                .get_mcp_server_detail(namespace_id, name, Some(&registration.version))
                .await
            {
                Ok(_) => true,
                Err(e) if e.is_not_found() => false,
                Err(e) => {
                    warn!("Probing mcp server {} failed, creating it: {}", name, e);
                    false
                }
            };

            let action = if exists {
                service
                    .update_mcp_server(
                        namespace_id,
                        name,
                        true,
                        &server_spec,
                        Some(&tool_spec),
                        Some(&endpoint_spec),
                    )
                    .await?;
                RegistrationAction::Updated
            } else {
                let id = service
                    .create_mcp_server(
                        namespace_id,
                        name,
                        &server_spec,
                        Some(&tool_spec),
                        Some(&endpoint_spec),
                    )
                    .await?;
                RegistrationAction::Created(id)
            };

            info!(
                "Registered mcp service {} version {} ({:?}, {} tools)",
                name,
                registration.version,
                action,
                tool_spec.tools.len()
            );
            Ok::<_, MaintainerError>(RegistrationReport {
                action,
                skipped_tools,
            })
        })
        .await
}
