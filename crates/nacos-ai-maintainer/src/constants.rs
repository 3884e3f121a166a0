// Admin API path constants following Nacos AdminApiPath

pub mod admin_api_path {
    // AI MCP
    pub const AI_MCP: &str = "/v3/admin/ai/mcp";
    pub const AI_MCP_LIST: &str = "/v3/admin/ai/mcp/list";

    // AI Agent (A2A)
    pub const AI_AGENT: &str = "/v3/admin/ai/a2a";
    pub const AI_AGENT_VERSION_LIST: &str = "/v3/admin/ai/a2a/version/list";
    pub const AI_AGENT_LIST: &str = "/v3/admin/ai/a2a/list";

    // Auth
    pub const AUTH_LOGIN: &str = "/v3/auth/user/login";
}

/// `search` query values for list endpoints
pub mod search_mode {
    pub const ACCURATE: &str = "accurate";
    pub const BLUR: &str = "blur";
}

pub const DEFAULT_NAMESPACE: &str = "public";
pub const DEFAULT_CONTEXT_PATH: &str = "nacos";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_LOG_BACKUP_COUNT: usize = 7;
pub const DEFAULT_LOG_MODULE: &str = "nacos-ai-maintainer";
