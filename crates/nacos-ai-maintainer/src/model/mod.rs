// Model types for the AI maintainer API

pub mod a2a;
pub mod common;
pub mod mcp;

pub use a2a::{
    AgentCapabilities, AgentCard, AgentCardBasicInfo, AgentCardDetailInfo, AgentCardVersionInfo,
    AgentInterface, AgentProvider, AgentSkill, AgentVersionDetail, RegistrationType,
};
pub use common::{DeleteOutcome, Page};
pub use mcp::{
    McpCapability, McpEndpointInfo, McpEndpointSpec, McpEndpointType, McpServerBasicInfo,
    McpServerDetailInfo, McpServerRemoteServiceConfig, McpTool, McpToolSpecification,
    ServerVersionDetail,
};
