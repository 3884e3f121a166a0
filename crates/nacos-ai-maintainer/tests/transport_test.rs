//! Transport-level behaviour as seen through the facade: auth, timeouts and
//! malformed responses

use std::time::Duration;

use nacos_ai_maintainer::{
    AiMaintainerClientConfig, AiMaintainerClientConfigBuilder, MaintainerError,
    NacosAiMaintainerService, error_code,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

async fn service(server: &MockServer, log_dir: &TempDir, timeout_ms: i64) -> NacosAiMaintainerService {
    let config = AiMaintainerClientConfig::builder()
        .server_address(&server.uri())
        .log_dir(log_dir.path())
        .timeout_ms(timeout_ms)
        .build()
        .unwrap();
    NacosAiMaintainerService::create_ai_service(config)
        .await
        .unwrap()
}

fn empty_page() -> serde_json::Value {
    json!({
        "code": 0,
        "message": "success",
        "data": {"totalCount": 0, "pageNumber": 1, "pagesAvailable": 0, "pageItems": []}
    })
}

// ============== Configuration Tests ==============

#[test]
fn test_build_without_server_address_fails() {
    for builder in [
        AiMaintainerClientConfigBuilder::new(),
        AiMaintainerClientConfigBuilder::new().server_address(""),
        AiMaintainerClientConfigBuilder::new()
            .server_address("  ")
            .username("nacos"),
    ] {
        let result = builder.build();
        assert!(matches!(result, Err(MaintainerError::Configuration(_))));
    }
}

#[tokio::test]
async fn test_non_positive_timeout_uses_default() {
    let log_dir = tempfile::tempdir().unwrap();
    for timeout_ms in [0, -1] {
        let config = AiMaintainerClientConfig::builder()
            .server_address("localhost:8848")
            .log_dir(log_dir.path())
            .timeout_ms(timeout_ms)
            .build()
            .unwrap();
        let service = NacosAiMaintainerService::create_ai_service(config)
            .await
            .unwrap();
        assert_eq!(service.config().timeout_ms(), 10_000);
        assert_eq!(service.config().effective_timeout_ms(), 10_000);
    }
}

// ============== Auth Tests ==============

#[tokio::test]
async fn test_login_token_is_sent_with_requests() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/nacos/v3/auth/user/login"))
        .and(body_string_contains("username=nacos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "token-1",
            "tokenTtl": 18000,
            "globalAdmin": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nacos/v3/admin/ai/mcp/list"))
        .and(header("accessToken", "token-1"))
        .and(query_param("search", "accurate"))
        .and(query_param("pageNo", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(2)
        .mount(&server)
        .await;

    let config = AiMaintainerClientConfig::builder()
        .server_address(&server.uri())
        .username("nacos")
        .password("nacos")
        .log_dir(log_dir.path())
        .build()
        .unwrap();
    let service = NacosAiMaintainerService::create_ai_service(config)
        .await
        .unwrap();

    for _ in 0..2 {
        let page = service
            .list_mcp_servers("public", "", 1, 10)
            .await
            .unwrap();
        assert!(page.is_empty());
    }
}

#[tokio::test]
async fn test_failed_login_surfaces_on_first_call() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/nacos/v3/auth/user/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("unknown user"))
        .mount(&server)
        .await;

    let config = AiMaintainerClientConfig::builder()
        .server_address(&server.uri())
        .username("nobody")
        .password("wrong")
        .log_dir(log_dir.path())
        .build()
        .unwrap();
    let service = NacosAiMaintainerService::create_ai_service(config)
        .await
        .unwrap();

    let err = service
        .list_mcp_servers("public", "", 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintainerError::Transport { .. }), "{:?}", err);
}

// ============== Failure Mapping Tests ==============

#[tokio::test]
async fn test_slow_registry_times_out() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/nacos/v3/admin/ai/mcp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(empty_page())
                .set_delay(Duration::from_millis(1000)),
        )
        .mount(&server)
        .await;

    let service = service(&server, &log_dir, 100).await;
    let err = service
        .get_mcp_server_detail("public", "slow", None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, MaintainerError::Timeout { timeout_ms: 100 }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_unreachable_registry_is_transport_error() {
    let log_dir = tempfile::tempdir().unwrap();
    let config = AiMaintainerClientConfig::builder()
        .server_address("127.0.0.1:1")
        .log_dir(log_dir.path())
        .timeout_ms(2000)
        .build()
        .unwrap();
    let service = NacosAiMaintainerService::create_ai_service(config)
        .await
        .unwrap();

    let err = service
        .list_agent_cards_by_name("public", "", 1, 10)
        .await
        .unwrap_err();
    assert!(
        matches!(err, MaintainerError::Transport { status: None, .. }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_non_envelope_body_is_decode_error() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/nacos/v3/admin/ai/a2a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let service = service(&server, &log_dir, 2000).await;
    let err = service
        .get_agent_card("public", "agent", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintainerError::Decode(_)), "{:?}", err);
}

#[tokio::test]
async fn test_missing_required_field_is_decode_error() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/nacos/v3/admin/ai/a2a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {"name": "agent", "url": "http://agent"}
        })))
        .mount(&server)
        .await;

    let service = service(&server, &log_dir, 2000).await;
    let err = service
        .get_agent_card("public", "agent", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintainerError::Decode(_)), "{:?}", err);
}

#[tokio::test]
async fn test_registry_error_code_is_kept_verbatim() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("PUT"))
        .and(path("/nacos/v3/admin/ai/a2a"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": 403,
            "message": "authorization failed",
            "data": null
        })))
        .mount(&server)
        .await;

    let service = service(&server, &log_dir, 2000).await;
    let card = nacos_ai_maintainer::AgentCard::new("agent", "1.0.0", "http://agent");
    let err = service
        .update_agent_card(
            &card,
            "public",
            true,
            nacos_ai_maintainer::RegistrationType::Url,
        )
        .await
        .unwrap_err();
    match err {
        MaintainerError::Nacos { code, message } => {
            assert_eq!(code, error_code::NO_RIGHT);
            assert_eq!(message, "authorization failed");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_server_error_is_transport_error() {
    let server = MockServer::start().await;
    let log_dir = tempfile::tempdir().unwrap();

    Mock::given(method("DELETE"))
        .and(path("/nacos/v3/admin/ai/mcp"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let service = service(&server, &log_dir, 2000).await;
    let err = service
        .delete_mcp_server("public", "demo", None)
        .await
        .unwrap_err();
    match err {
        MaintainerError::Transport { status, message } => {
            assert_eq!(status, Some(503));
            assert_eq!(message, "unavailable");
        }
        other => panic!("unexpected: {:?}", other),
    }
}
