//! MCP server descriptors
//!
//! A registered MCP server is identified by `(namespace_id, name, version)` and
//! carries three parts that are written together: the basic info, the tool
//! specification and the endpoint specification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MaintainerError, Result};

/// Endpoint data keys required for `McpEndpointType::Ref`
pub const REF_NAMESPACE_ID: &str = "namespaceId";
pub const REF_SERVICE_NAME: &str = "serviceName";
pub const REF_GROUP_NAME: &str = "groupName";

/// Capabilities an MCP server advertises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum McpCapability {
    Tool,
    Prompt,
    Resource,
    /// A capability this client does not know about yet
    #[serde(other)]
    Unknown,
}

/// Version information embedded in `McpServerBasicInfo`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerVersionDetail {
    pub version: String,
    #[serde(
        rename = "release_date",
        alias = "releaseDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<String>,
    #[serde(
        rename = "is_latest",
        alias = "isLatest",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_latest: Option<bool>,
}

impl ServerVersionDetail {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..Default::default()
        }
    }
}

/// Remote (non-stdio) server settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct McpServerRemoteServiceConfig {
    pub export_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_ref: Option<Value>,
}

/// MCP server basic information
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerBasicInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub front_protocol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_detail: Option<ServerVersionDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_server_config: Option<McpServerRemoteServiceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_server_config: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<McpCapability>,
}

impl McpServerBasicInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets both `versionDetail.version` and the flat `version` field
    pub fn with_version(mut self, version: &str) -> Self {
        let mut detail = self.version_detail.take().unwrap_or_default();
        detail.version = version.to_string();
        self.version_detail = Some(detail);
        self.version = Some(version.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_protocol(mut self, protocol: &str, front_protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self.front_protocol = front_protocol.to_string();
        self
    }

    pub fn with_remote_export_path(mut self, export_path: &str) -> Self {
        self.remote_server_config = Some(McpServerRemoteServiceConfig {
            export_path: export_path.to_string(),
            service_ref: None,
        });
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<McpCapability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Version from `versionDetail`, falling back to the flat field
    pub fn version(&self) -> Option<&str> {
        self.version_detail
            .as_ref()
            .map(|d| d.version.as_str())
            .filter(|v| !v.is_empty())
            .or_else(|| self.version.as_deref().filter(|v| !v.is_empty()))
    }
}

/// A single tool exposed by an MCP server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the tool input; always an object
    pub input_schema: Map<String, Value>,
}

impl McpTool {
    pub fn new(name: &str, input_schema: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            input_schema,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// MCP tool specification
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct McpToolSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification_type: Option<String>,
    pub tools: Vec<McpTool>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tools_meta: HashMap<String, Value>,
}

impl McpToolSpecification {
    pub fn from_tools(tools: Vec<McpTool>) -> Self {
        Self {
            tools,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(index) = self.tools.iter().position(|t| t.name.trim().is_empty()) {
            return Err(MaintainerError::invalid_param(format!(
                "tool at index {} has no name",
                index
            )));
        }
        Ok(())
    }
}

/// How the registry reaches the server
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum McpEndpointType {
    /// Address and port given inline
    #[default]
    Direct,
    /// Backed by a registered service instance group
    Ref,
    #[serde(other)]
    Unknown,
}

/// MCP endpoint specification
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpEndpointSpec {
    pub r#type: McpEndpointType,
    pub data: HashMap<String, String>,
}

impl McpEndpointSpec {
    pub fn direct(address: &str, port: u16) -> Self {
        let mut data = HashMap::new();
        data.insert("address".to_string(), address.to_string());
        data.insert("port".to_string(), port.to_string());
        Self {
            r#type: McpEndpointType::Direct,
            data,
        }
    }

    /// Endpoint resolved through the instances of `namespace/group/service`
    pub fn reference(namespace_id: &str, service_name: &str, group_name: &str) -> Self {
        let mut data = HashMap::new();
        data.insert(REF_NAMESPACE_ID.to_string(), namespace_id.to_string());
        data.insert(REF_SERVICE_NAME.to_string(), service_name.to_string());
        data.insert(REF_GROUP_NAME.to_string(), group_name.to_string());
        Self {
            r#type: McpEndpointType::Ref,
            data,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.r#type != McpEndpointType::Ref {
            return Ok(());
        }
        for key in [REF_NAMESPACE_ID, REF_SERVICE_NAME, REF_GROUP_NAME] {
            if self.data.get(key).is_none_or(|v| v.trim().is_empty()) {
                return Err(MaintainerError::invalid_param(format!(
                    "REF endpoint requires '{}'",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Concrete endpoint resolved by the registry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct McpEndpointInfo {
    pub protocol: String,
    pub address: String,
    pub port: u16,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Value>>,
}

/// MCP server detailed information
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerDetailInfo {
    #[serde(flatten)]
    pub basic_info: McpServerBasicInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_endpoints: Vec<McpEndpointInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frontend_endpoints: Vec<McpEndpointInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_spec: Option<McpToolSpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_versions: Vec<ServerVersionDetail>,
    #[serde(default)]
    pub namespace_id: String,
}
