//! Tests for remote-HTTP tool bindings against a mock server

use curbench_core::tools::error::ToolError;
use curbench_core::tools::registry::{ApiMethod, ToolDefinition, ToolRegistry};
use curbench_core::tools::schema::ToolSchema;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn term_schema() -> ToolSchema {
    serde_json::from_value(json!({
        "properties": {
            "term": {"type": "string", "description": "search term"}
        },
        "required": ["term"]
    }))
    .unwrap()
}

fn api_tool(server: &MockServer, name: &str, endpoint: &str, api_method: ApiMethod) -> ToolDefinition {
    ToolDefinition::api(
        name,
        "Remote lookup",
        term_schema(),
        Url::parse(&format!("{}{}", server.uri(), endpoint)).unwrap(),
        api_method,
    )
}

#[tokio::test]
async fn post_tool_sends_arguments_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lookup"))
        .and(body_json(json!({"term": "diabetes"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"label": "diabetes mellitus"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry =
        ToolRegistry::new(vec![api_tool(&server, "lookup", "/lookup", ApiMethod::Post)]).unwrap();

    let result = registry
        .invoke("lookup", &json!({"term": "diabetes"}))
        .await
        .unwrap();
    assert_eq!(result["results"][0]["label"], "diabetes mellitus");
}

#[tokio::test]
async fn get_tool_sends_arguments_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "diabetes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let registry =
        ToolRegistry::new(vec![api_tool(&server, "search", "/search", ApiMethod::Get)]).unwrap();

    let result = registry
        .invoke("search", &json!({"term": "diabetes"}))
        .await
        .unwrap();
    assert_eq!(result["hits"], 3);
}

#[tokio::test]
async fn non_2xx_response_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let registry =
        ToolRegistry::new(vec![api_tool(&server, "lookup", "/lookup", ApiMethod::Post)]).unwrap();

    let err = registry
        .invoke("lookup", &json!({"term": "diabetes"}))
        .await
        .unwrap_err();

    match err {
        ToolError::Execution { name, status, body } => {
            assert_eq!(name, "lookup");
            assert_eq!(status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected execution error, got {:?}", other),
    }
}

#[tokio::test]
async fn plain_text_response_passed_through_as_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_string("just text"))
        .mount(&server)
        .await;

    let registry =
        ToolRegistry::new(vec![api_tool(&server, "raw", "/raw", ApiMethod::Post)]).unwrap();

    let result = registry
        .invoke("raw", &json!({"term": "x"}))
        .await
        .unwrap();
    assert_eq!(result, json!("just text"));
}

#[tokio::test]
async fn remote_tool_arguments_validated_before_any_request() {
    let server = MockServer::start().await;
    // nothing mounted: a dispatched request would fail the test below

    let registry =
        ToolRegistry::new(vec![api_tool(&server, "lookup", "/lookup", ApiMethod::Post)]).unwrap();

    let err = registry.invoke("lookup", &json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
