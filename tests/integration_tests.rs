//! Full-stack tests: shipped site and dashboard configuration, the standard
//! block utilization tools and the HTTP router, with only the model scripted.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use lumen::{DashboardCatalog, HttpChatRuntime, HttpConfig, SiteConfig, standard_registry};
use lumen_testing::{ScriptedModelClient, text_response, tool_request};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

fn shipped_app(model: &ScriptedModelClient) -> Router {
    let site = SiteConfig::load(config_dir().join("site.json")).expect("site.json parses");
    let dashboards =
        DashboardCatalog::load_dir(config_dir().join("dashboards")).expect("dashboards load");

    HttpChatRuntime::builder(Arc::new(model.clone()), standard_registry().unwrap())
        .config(HttpConfig::default())
        .site(site)
        .dashboards(dashboards)
        .build()
        .unwrap()
        .router()
}

async fn post_chat(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[test]
fn test_shipped_configuration_is_consistent() {
    let site = SiteConfig::load(config_dir().join("site.json")).unwrap();
    let dashboards = DashboardCatalog::load_dir(config_dir().join("dashboards")).unwrap();
    let registry = standard_registry().unwrap();

    for id in &site.features.enabled_dashboards {
        let manifest = dashboards
            .get(id)
            .unwrap_or_else(|| panic!("enabled dashboard {id} has no manifest"));
        for tool in &manifest.available_tools {
            assert!(registry.contains(tool), "{id} lists unknown tool {tool}");
        }
    }
}

#[tokio::test]
async fn test_dashboard_chat_runs_real_tools() {
    let range = json!({"start_date": "2024-03-01", "end_date": "2024-03-31"});
    let model = ScriptedModelClient::new()
        .then(tool_request(&[
            ("s", "block_util_summary", range.clone()),
            ("g", "block_util_by_block_group", range.clone()),
        ]))
        .then(text_response("Overall utilization was 72%; Orthopedics led at 82%."));
    let app = shipped_app(&model);

    let (status, body) = post_chat(
        &app,
        json!({"message": "How did blocks do in March?", "dashboard": "block-utilization"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dashboard"], "block-utilization");

    let calls = body["toolCalls"].as_array().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["name"], "block_util_summary");
    assert_eq!(calls[0]["result"]["utilization_rate"], 0.72);
    assert_eq!(calls[1]["name"], "block_util_by_block_group");
    assert_eq!(calls[1]["result"][0]["blockgroup"], "Orthopedics");

    // The model saw the wrapped array and the site's boundaries.
    let requests = model.requests();
    let results_turn = &requests[1].turns[2];
    let group_result = results_turn.tool_results().nth(1).unwrap();
    assert!(group_result.payload["data"].is_array());
    assert!(requests[0].system_prompt.contains("## Current Dashboard: Block Utilization"));
    assert!(requests[0].system_prompt.contains("Patient-level clinical information"));
}

#[tokio::test]
async fn test_invalid_tool_input_reaches_model_as_error_result() {
    let model = ScriptedModelClient::new()
        .then(tool_request(&[(
            "bad",
            "block_util_summary",
            json!({"start_date": "2024-03-31", "end_date": "2024-03-01"}),
        )]))
        .then(text_response("That date range is reversed."));
    let app = shipped_app(&model);

    let (status, body) = post_chat(&app, json!({"message": "Utilization?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["toolCalls"][0]["status"], "error");
    assert!(
        body["toolCalls"][0]["result"]["error"]
            .as_str()
            .unwrap()
            .contains("after end_date")
    );
}

#[tokio::test]
async fn test_history_carries_across_requests_with_shipped_site() {
    let model = ScriptedModelClient::new()
        .then(text_response("72% overall."))
        .then(text_response("Prime time was 81%."));
    let app = shipped_app(&model);

    let (_, first) = post_chat(&app, json!({"message": "Overall utilization?"})).await;
    let conversation_id = first["conversationId"].as_str().unwrap().to_string();

    let (status, _) = post_chat(
        &app,
        json!({"message": "And prime time?", "conversationId": conversation_id}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.requests()[1].turns.len(), 3);
}
