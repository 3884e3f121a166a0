//! Nacos AI Transport - HTTP plumbing for the AI maintainer SDK
//!
//! This crate provides:
//! - `HttpAgent`: a pooled `reqwest` client with a hard per-call timeout
//! - `ClientHttpProxy`: base URL resolution, access-token login and verb primitives
//! - `TransportError`: network, status, timeout and auth failures
//!
//! The transport never retries. Every failure is surfaced as-is so the caller
//! can pick its own retry policy.

pub mod agent;
pub mod error;
pub mod proxy;

pub use agent::{HttpAgent, HttpAgentConfig, HttpMethod, HttpResponse, Params};
pub use error::{Result, TransportError};
pub use proxy::{ClientHttpProxy, ProxyConfig};
