// Error types for the AI maintainer client

use nacos_ai_transport::TransportError;

/// Error codes carried by `MaintainerError::Nacos`
pub mod error_code {
    pub const CLIENT_INVALID_PARAM: i32 = -400;
    pub const INVALID_PARAM: i32 = 400;
    pub const NO_RIGHT: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const SERVER_ERROR: i32 = 500;

    // Registry business codes
    pub const RESOURCE_NOT_FOUND: i32 = 20004;
    pub const RESOURCE_CONFLICT: i32 = 20005;
    pub const MCP_SERVER_NOT_FOUND: i32 = 50000;
    pub const MCP_SERVER_VERSION_NOT_FOUND: i32 = 50001;
    pub const MCP_SERVER_VERSION_EXIST: i32 = 50002;
    pub const MCP_SERVER_REF_ENDPOINT_SERVICE_NOT_FOUND: i32 = 50003;

    /// Codes that mean "the addressed record does not exist"
    pub fn is_not_found(code: i32) -> bool {
        matches!(
            code,
            NOT_FOUND | RESOURCE_NOT_FOUND | MCP_SERVER_NOT_FOUND | MCP_SERVER_VERSION_NOT_FOUND
        )
    }
}

/// Errors that can occur during maintainer client operations
#[derive(Debug, thiserror::Error)]
pub enum MaintainerError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error (status {status:?}): {message}")]
    Transport { status: Option<u16>, message: String },

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("nacos error: code={code}, message={message}")]
    Nacos { code: i32, message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl MaintainerError {
    pub fn invalid_param(message: impl Into<String>) -> Self {
        MaintainerError::Nacos {
            code: error_code::INVALID_PARAM,
            message: message.into(),
        }
    }

    /// Registry code for `Nacos` errors
    pub fn code(&self) -> Option<i32> {
        match self {
            MaintainerError::Nacos { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MaintainerError::NotFound { .. })
    }
}

impl From<TransportError> for MaintainerError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout { timeout_ms } => MaintainerError::Timeout { timeout_ms },
            other => MaintainerError::Transport {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, MaintainerError>;
