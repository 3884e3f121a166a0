//! Request/response codec for the AI admin API
//!
//! Encoders turn facade arguments into the query/form parameters the registry
//! expects; descriptors travel as JSON strings inside form fields. Decoders
//! unwrap the `{code, message, data}` envelope and map registry errors onto
//! [`MaintainerError`].

use nacos_ai_transport::{HttpResponse, Params};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{MaintainerError, Result, error_code},
    model::{
        AgentCard, McpEndpointSpec, McpServerBasicInfo, McpToolSpecification, RegistrationType,
    },
};

/// Response envelope shared by all admin endpoints
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn is_ok(&self) -> bool {
        self.code == 0 || self.code == 200
    }

    fn into_error(self, status: u16, resource: &str) -> MaintainerError {
        if status == 404 || error_code::is_not_found(self.code) {
            return MaintainerError::NotFound {
                resource: resource.to_string(),
            };
        }
        MaintainerError::Nacos {
            code: self.code,
            message: self.message.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MaintainerError::invalid_param(format!(
            "'{}' is required",
            field
        )));
    }
    Ok(())
}

pub(crate) fn validate_page(page_no: u64, page_size: u64) -> Result<()> {
    if page_no < 1 {
        return Err(MaintainerError::invalid_param("pageNo must be >= 1"));
    }
    if page_size < 1 {
        return Err(MaintainerError::invalid_param("pageSize must be >= 1"));
    }
    Ok(())
}

fn validate_server_spec(mcp_name: &str, server_spec: &McpServerBasicInfo) -> Result<()> {
    if !server_spec.name.is_empty() && server_spec.name != mcp_name {
        return Err(MaintainerError::invalid_param(format!(
            "server specification name '{}' does not match '{}'",
            server_spec.name, mcp_name
        )));
    }
    if server_spec.version().is_none() {
        return Err(MaintainerError::invalid_param(
            "server specification version is required",
        ));
    }
    Ok(())
}

// ============================================================================
// Encoding
// ============================================================================

fn to_json<T: Serialize>(field: &str, value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| MaintainerError::invalid_param(format!("cannot encode {}: {}", field, e)))
}

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Form for MCP create (`latest == None`) and update (`latest == Some(..)`)
pub(crate) fn encode_mcp_write(
    namespace_id: &str,
    mcp_name: &str,
    server_spec: &McpServerBasicInfo,
    tool_spec: Option<&McpToolSpecification>,
    endpoint_spec: Option<&McpEndpointSpec>,
    latest: Option<bool>,
) -> Result<Params> {
    require_non_empty("namespaceId", namespace_id)?;
    require_non_empty("mcpName", mcp_name)?;
    validate_server_spec(mcp_name, server_spec)?;

    // The registry keys records by the server name; fill it from mcpName
    let server_spec = if server_spec.name.is_empty() {
        std::borrow::Cow::Owned(McpServerBasicInfo {
            name: mcp_name.to_string(),
            ..server_spec.clone()
        })
    } else {
        std::borrow::Cow::Borrowed(server_spec)
    };

    let mut params = vec![
        param("namespaceId", namespace_id),
        param("mcpName", mcp_name),
        param(
            "serverSpecification",
            to_json("serverSpecification", server_spec.as_ref())?,
        ),
    ];
    if let Some(latest) = latest {
        params.push(param("latest", latest.to_string()));
    }
    if let Some(tools) = tool_spec {
        tools.validate()?;
        params.push(param(
            "toolSpecification",
            to_json("toolSpecification", tools)?,
        ));
    }
    if let Some(endpoint) = endpoint_spec {
        endpoint.validate()?;
        params.push(param(
            "endpointSpecification",
            to_json("endpointSpecification", endpoint)?,
        ));
    }
    Ok(params)
}

/// Query addressing one MCP server; no version means the latest one
pub(crate) fn encode_mcp_query(
    namespace_id: &str,
    mcp_name: &str,
    version: Option<&str>,
) -> Result<Params> {
    require_non_empty("namespaceId", namespace_id)?;
    require_non_empty("mcpName", mcp_name)?;

    let mut params = vec![param("namespaceId", namespace_id), param("mcpName", mcp_name)];
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        params.push(param("version", version));
    }
    Ok(params)
}

/// Query for the paginated list endpoints
pub(crate) fn encode_list_query(
    name_key: &str,
    namespace_id: &str,
    name: &str,
    search: &str,
    page_no: u64,
    page_size: u64,
) -> Result<Params> {
    require_non_empty("namespaceId", namespace_id)?;
    validate_page(page_no, page_size)?;

    Ok(vec![
        param("namespaceId", namespace_id),
        param(name_key, name),
        param("search", search),
        param("pageNo", page_no.to_string()),
        param("pageSize", page_size.to_string()),
    ])
}

/// Form for agent register (`set_as_latest == None`) and update
pub(crate) fn encode_agent_write(
    agent_card: &AgentCard,
    namespace_id: &str,
    registration_type: RegistrationType,
    set_as_latest: Option<bool>,
) -> Result<Params> {
    require_non_empty("namespaceId", namespace_id)?;
    agent_card.validate()?;
    if registration_type == RegistrationType::Unknown {
        return Err(MaintainerError::invalid_param(
            "registrationType must be URL or SERVICE",
        ));
    }

    let mut params = vec![
        param("namespaceId", namespace_id),
        param("agentName", agent_card.name.as_str()),
        param("agentCard", to_json("agentCard", agent_card)?),
        param("registrationType", registration_type.as_str()),
    ];
    if let Some(latest) = set_as_latest {
        params.push(param("setAsLatest", latest.to_string()));
    }
    Ok(params)
}

/// Query addressing one agent
pub(crate) fn encode_agent_query(
    namespace_id: &str,
    agent_name: &str,
    registration_type: Option<RegistrationType>,
) -> Result<Params> {
    require_non_empty("namespaceId", namespace_id)?;
    require_non_empty("agentName", agent_name)?;

    let mut params = vec![
        param("namespaceId", namespace_id),
        param("agentName", agent_name),
    ];
    if let Some(registration_type) = registration_type {
        params.push(param("registrationType", registration_type.as_str()));
    }
    Ok(params)
}

// ============================================================================
// Decoding
// ============================================================================

fn parse_envelope(response: &HttpResponse) -> Option<Envelope> {
    serde_json::from_str::<Envelope>(&response.body).ok()
}

/// Unwrap the envelope; `Ok(None)` when the registry answered with no data
pub(crate) fn decode_data<T: DeserializeOwned>(
    response: HttpResponse,
    resource: &str,
) -> Result<Option<T>> {
    let envelope = match parse_envelope(&response) {
        Some(envelope) => envelope,
        None if !response.is_success() => {
            if response.status == 404 {
                return Err(MaintainerError::NotFound {
                    resource: resource.to_string(),
                });
            }
            return Err(MaintainerError::Transport {
                status: Some(response.status),
                message: response.body,
            });
        }
        None => {
            return Err(MaintainerError::Decode(format!(
                "{}: response is not a registry envelope: {}",
                resource, response.body
            )));
        }
    };

    if !response.is_success() || !envelope.is_ok() {
        debug!(
            "{} rejected: status={}, code={}",
            resource, response.status, envelope.code
        );
        return Err(envelope.into_error(response.status, resource));
    }

    if envelope.data.is_null() {
        return Ok(None);
    }
    serde_json::from_value(envelope.data)
        .map(Some)
        .map_err(|e| MaintainerError::Decode(format!("{}: {}", resource, e)))
}

/// Like [`decode_data`] but absent data means the record does not exist
pub(crate) fn decode_required<T: DeserializeOwned>(
    response: HttpResponse,
    resource: &str,
) -> Result<T> {
    decode_data(response, resource)?.ok_or_else(|| MaintainerError::NotFound {
        resource: resource.to_string(),
    })
}

/// Acknowledgement-only responses; `data` may be anything
pub(crate) fn decode_ack(response: HttpResponse, resource: &str) -> Result<Value> {
    Ok(decode_data::<Value>(response, resource)?.unwrap_or(Value::Null))
}
