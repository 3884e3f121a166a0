//! In-memory registry served through wiremock
//!
//! Implements just enough of the AI admin API to exercise the facade end to
//! end: MCP server versions, agent card versions, latest-version tracking and
//! the registry's error envelopes.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use nacos_ai_maintainer::{AiMaintainerClientConfig, DeleteMode, NacosAiMaintainerService};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate, matchers::path_regex};

const CONTEXT: &str = "/nacos";

type Params = HashMap<String, String>;

#[derive(Default)]
struct McpRecord {
    id: String,
    versions: BTreeMap<String, Value>,
    latest: String,
}

#[derive(Default)]
struct AgentRecord {
    registration_type: String,
    versions: BTreeMap<String, Value>,
    latest: String,
}

#[derive(Default)]
struct State {
    mcp: HashMap<(String, String), McpRecord>,
    agents: HashMap<(String, String), AgentRecord>,
    next_id: u64,
    requests: usize,
}

#[derive(Clone, Default)]
pub struct FakeRegistry {
    state: Arc<Mutex<State>>,
}

impl FakeRegistry {
    /// Number of admin API requests served
    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "message": "success",
        "data": data
    }))
}

fn fail(status: u16, code: i32, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "code": code,
        "message": message,
        "data": null
    }))
}

fn params(request: &Request) -> Params {
    let mut params: Params = request.url.query_pairs().into_owned().collect();
    if let Ok(form) = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&request.body) {
        params.extend(form);
    }
    params
}

fn param<'a>(params: &'a Params, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

fn key(params: &Params, name_key: &str) -> (String, String) {
    (
        param(params, "namespaceId").to_string(),
        param(params, name_key).to_string(),
    )
}

fn matches_name(name: &str, filter: &str, search: &str) -> bool {
    match search {
        "blur" => name.contains(filter),
        _ => filter.is_empty() || name == filter,
    }
}

fn page(items: Vec<Value>, params: &Params) -> Value {
    let page_no: usize = param(params, "pageNo").parse().unwrap_or(1);
    let page_size: usize = param(params, "pageSize").parse().unwrap_or(10);
    let total = items.len();
    let page_items: Vec<Value> = items
        .into_iter()
        .skip((page_no - 1) * page_size)
        .take(page_size)
        .collect();

    json!({
        "totalCount": total,
        "pageNumber": page_no,
        "pagesAvailable": total.div_ceil(page_size),
        "pageItems": page_items
    })
}

impl State {
    fn mcp_detail(params: &Params, id: &str) -> Result<(String, Value), ResponseTemplate> {
        let Ok(Value::Object(mut detail)) =
            serde_json::from_str::<Value>(param(params, "serverSpecification"))
        else {
            return Err(fail(400, 400, "serverSpecification is invalid"));
        };
        let version = detail
            .get("versionDetail")
            .and_then(|d| d.get("version"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if version.is_empty() {
            return Err(fail(400, 400, "version is required"));
        }

        let tool_spec = serde_json::from_str::<Value>(param(params, "toolSpecification"))
            .unwrap_or(Value::Null);
        detail.insert("id".to_string(), json!(id));
        detail.insert("namespaceId".to_string(), json!(param(params, "namespaceId")));
        detail.insert("toolSpec".to_string(), tool_spec);
        Ok((version, Value::Object(detail)))
    }

    fn create_mcp(&mut self, params: &Params) -> ResponseTemplate {
        let key = key(params, "mcpName");
        self.next_id += 1;
        let new_id = format!("mcp-{}", self.next_id);
        let id = self
            .mcp
            .get(&key)
            .map(|r| r.id.clone())
            .unwrap_or(new_id);

        let (version, detail) = match Self::mcp_detail(params, &id) {
            Ok(parsed) => parsed,
            Err(response) => return response,
        };
        let record = self.mcp.entry(key).or_default();
        if record.versions.contains_key(&version) {
            return fail(400, 50002, "MCP server version has existed");
        }
        record.id = id.clone();
        record.versions.insert(version.clone(), detail);
        if record.latest.is_empty() {
            record.latest = version;
        }
        ok(json!(id))
    }

    fn get_mcp(&self, params: &Params) -> ResponseTemplate {
        let Some(record) = self.mcp.get(&key(params, "mcpName")) else {
            return fail(404, 50000, "MCP server not found");
        };
        let version = params.get("version").unwrap_or(&record.latest);
        let Some(detail) = record.versions.get(version) else {
            return fail(404, 50001, "MCP server version not found");
        };

        let mut detail = detail.clone();
        detail["allVersions"] = record
            .versions
            .keys()
            .map(|v| json!({"version": v, "is_latest": *v == record.latest}))
            .collect();
        ok(detail)
    }

    fn update_mcp(&mut self, params: &Params) -> ResponseTemplate {
        let Some(record) = self.mcp.get_mut(&key(params, "mcpName")) else {
            return fail(404, 50000, "MCP server not found");
        };
        let (version, detail) = match Self::mcp_detail(params, &record.id) {
            Ok(parsed) => parsed,
            Err(response) => return response,
        };
        record.versions.insert(version.clone(), detail);
        if param(params, "latest") == "true" {
            record.latest = version;
        }
        ok(json!("ok"))
    }

    fn delete_mcp(&mut self, params: &Params) -> ResponseTemplate {
        let key = key(params, "mcpName");
        let Some(record) = self.mcp.get_mut(&key) else {
            return fail(404, 50000, "MCP server not found");
        };
        if let Some(version) = params.get("version") {
            if record.versions.remove(version).is_none() {
                return fail(404, 50001, "MCP server version not found");
            }
            if record.versions.is_empty() {
                self.mcp.remove(&key);
            } else if record.latest == *version {
                record.latest = record.versions.keys().last().cloned().unwrap_or_default();
            }
        } else {
            self.mcp.remove(&key);
        }
        ok(json!("ok"))
    }

    fn list_mcp(&self, params: &Params) -> ResponseTemplate {
        let namespace_id = param(params, "namespaceId");
        let filter = param(params, "mcpName");
        let search = param(params, "search");

        let mut items: Vec<(String, Value)> = self
            .mcp
            .iter()
            .filter(|((ns, name), _)| ns == namespace_id && matches_name(name, filter, search))
            .filter_map(|((_, name), record)| {
                record
                    .versions
                    .get(&record.latest)
                    .map(|d| (name.clone(), d.clone()))
            })
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        ok(page(items.into_iter().map(|(_, d)| d).collect(), params))
    }

    fn register_agent(&mut self, params: &Params) -> ResponseTemplate {
        let Ok(card) = serde_json::from_str::<Value>(param(params, "agentCard")) else {
            return fail(400, 400, "agentCard is invalid");
        };
        let version = card["version"].as_str().unwrap_or_default().to_string();
        let record = self.agents.entry(key(params, "agentName")).or_default();
        if record.versions.contains_key(&version) {
            return fail(409, 20005, "agent version already exists");
        }
        record.registration_type = param(params, "registrationType").to_string();
        record.versions.insert(version.clone(), card);
        if record.latest.is_empty() {
            record.latest = version;
        }
        ok(json!("ok"))
    }

    fn get_agent(&self, params: &Params) -> ResponseTemplate {
        let Some(record) = self.agents.get(&key(params, "agentName")) else {
            return fail(404, 20004, "agent not found");
        };
        let version = params.get("version").unwrap_or(&record.latest);
        let Some(card) = record.versions.get(version) else {
            return fail(404, 20004, "agent version not found");
        };

        let mut detail = card.clone();
        detail["registrationType"] = json!(record.registration_type);
        detail["latestVersion"] = json!(*version == record.latest);
        ok(detail)
    }

    fn update_agent(&mut self, params: &Params) -> ResponseTemplate {
        let Some(record) = self.agents.get_mut(&key(params, "agentName")) else {
            return fail(404, 20004, "agent not found");
        };
        let Ok(card) = serde_json::from_str::<Value>(param(params, "agentCard")) else {
            return fail(400, 400, "agentCard is invalid");
        };
        let version = card["version"].as_str().unwrap_or_default().to_string();
        record.versions.insert(version.clone(), card);
        record.registration_type = param(params, "registrationType").to_string();
        if param(params, "setAsLatest") == "true" {
            record.latest = version;
        }
        ok(json!("ok"))
    }

    fn delete_agent(&mut self, params: &Params) -> ResponseTemplate {
        match self.agents.remove(&key(params, "agentName")) {
            Some(_) => ok(json!("ok")),
            None => fail(404, 20004, "agent not found"),
        }
    }

    fn agent_versions(&self, params: &Params) -> ResponseTemplate {
        let Some(record) = self.agents.get(&key(params, "agentName")) else {
            return fail(404, 20004, "agent not found");
        };
        let versions: Vec<Value> = record
            .versions
            .keys()
            .map(|v| {
                json!({
                    "version": v,
                    "createdAt": "2025-01-01T00:00:00Z",
                    "updatedAt": "2025-01-01T00:00:00Z",
                    "isLatest": *v == record.latest
                })
            })
            .collect();
        ok(json!(versions))
    }

    fn list_agents(&self, params: &Params) -> ResponseTemplate {
        let namespace_id = param(params, "namespaceId");
        let filter = param(params, "agentName");
        let search = param(params, "search");

        let mut items: Vec<(String, Value)> = self
            .agents
            .iter()
            .filter(|((ns, name), _)| ns == namespace_id && matches_name(name, filter, search))
            .filter_map(|((_, name), record)| {
                let card = record.versions.get(&record.latest)?;
                Some((
                    name.clone(),
                    json!({
                        "name": name,
                        "description": card["description"],
                        "version": record.latest,
                        "latestPublishedVersion": record.latest,
                        "registrationType": record.registration_type,
                    }),
                ))
            })
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        ok(page(items.into_iter().map(|(_, d)| d).collect(), params))
    }
}

impl Respond for FakeRegistry {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params = params(request);
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        let path = request
            .url
            .path()
            .strip_prefix(CONTEXT)
            .unwrap_or(request.url.path());
        match (request.method.as_str(), path) {
            ("POST", "/v3/admin/ai/mcp") => state.create_mcp(&params),
            ("GET", "/v3/admin/ai/mcp") => state.get_mcp(&params),
            ("PUT", "/v3/admin/ai/mcp") => state.update_mcp(&params),
            ("DELETE", "/v3/admin/ai/mcp") => state.delete_mcp(&params),
            ("GET", "/v3/admin/ai/mcp/list") => state.list_mcp(&params),
            ("POST", "/v3/admin/ai/a2a") => state.register_agent(&params),
            ("GET", "/v3/admin/ai/a2a") => state.get_agent(&params),
            ("PUT", "/v3/admin/ai/a2a") => state.update_agent(&params),
            ("DELETE", "/v3/admin/ai/a2a") => state.delete_agent(&params),
            ("GET", "/v3/admin/ai/a2a/version/list") => state.agent_versions(&params),
            ("GET", "/v3/admin/ai/a2a/list") => state.list_agents(&params),
            _ => fail(404, 404, "no such api"),
        }
    }
}

/// A running fake registry plus a client pointed at it
pub struct TestContext {
    pub server: MockServer,
    pub registry: FakeRegistry,
    pub log_dir: TempDir,
    pub service: NacosAiMaintainerService,
}

impl TestContext {
    pub async fn start() -> Self {
        Self::start_with(DeleteMode::Lenient).await
    }

    pub async fn start_with(delete_mode: DeleteMode) -> Self {
        let server = MockServer::start().await;
        let registry = FakeRegistry::default();
        Mock::given(path_regex("^/nacos/v3/admin/ai/"))
            .respond_with(registry.clone())
            .mount(&server)
            .await;

        let log_dir = tempfile::tempdir().unwrap();
        let config = AiMaintainerClientConfig::builder()
            .server_address(&server.uri())
            .log_dir(log_dir.path())
            .timeout_ms(5000)
            .delete_mode(delete_mode)
            .build()
            .unwrap();
        let service = NacosAiMaintainerService::create_ai_service(config)
            .await
            .unwrap();

        Self {
            server,
            registry,
            log_dir,
            service,
        }
    }
}
