//! Nacos AI Maintainer - admin SDK for MCP servers and A2A agent cards
//!
//! This crate provides:
//! - `AiMaintainerClientConfigBuilder`: connection, credential, timeout and log settings
//! - `NacosAiMaintainerService`: one async method per registry operation
//! - Typed models for MCP server descriptors and agent cards
//! - `filter_valid_tools`: best-effort conversion of external tool lists
//! - `register_mcp_server`: probe-then-create-or-update for REF-backed servers
//!
//! # Example
//!
//! ```ignore
//! use nacos_ai_maintainer::{AiMaintainerClientConfig, McpServerBasicInfo, NacosAiMaintainerService};
//!
//! let config = AiMaintainerClientConfig::builder()
//!     .server_address("localhost:8848")
//!     .username("nacos")
//!     .password("nacos")
//!     .build()?;
//! let service = NacosAiMaintainerService::create_ai_service(config).await?;
//!
//! let spec = McpServerBasicInfo::new("nacos-mcp-server").with_version("0.1.0");
//! service.create_mcp_server("public", "nacos-mcp-server", &spec, None, None).await?;
//! let detail = service.get_mcp_server_detail("public", "nacos-mcp-server", Some("0.1.0")).await?;
//! ```

mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod model;
pub mod registrar;
pub mod service;
pub mod tool;

pub use config::{AiMaintainerClientConfig, AiMaintainerClientConfigBuilder, DeleteMode, HttpTuning};
pub use error::{MaintainerError, Result, error_code};
pub use logging::ClientLogger;
pub use model::*;
pub use registrar::{McpRegistration, RegistrationAction, RegistrationReport, register_mcp_server};
pub use service::NacosAiMaintainerService;
pub use tool::{ExternalTool, SkipReason, SkippedTool, ToolFilterOutcome, filter_valid_tools};
