//! Integration tests for the HTTP surface: health, trigger endpoints,
//! session listing, and a real WebSocket round trip.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get, next_event, post_json, FakeAgent};
use flowstate_events::{AgentEvent, AgentStatus};
use futures::StreamExt;
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let (app, state) = build_test_app(FakeAgent::replying("ok", vec![]));
    let (_conn_id, _rx) = state.ws_manager.add("c1".to_string(), None).await;

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["connections"], 1);
    assert_eq!(json["jobs_in_flight"], 0);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight allows the configured origin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/agent/analyze")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header");
    assert_eq!(allow_origin, "http://localhost:5173");
}

#[tokio::test]
async fn cors_preflight_allows_only_content_type_header() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/agent/chat")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let allow_headers = response
        .headers()
        .get("access-control-allow-headers")
        .expect("Missing Access-Control-Allow-Headers header")
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert_eq!(allow_headers, "content-type");
}

// ---------------------------------------------------------------------------
// Test: POST /agent/analyze answers 202 and events follow on the session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_is_accepted_and_events_reach_session() {
    let (app, state) = build_test_app(FakeAgent::replying("Report drafted", vec![]));
    let (_conn_id, mut rx) = state.ws_manager.add("c1".to_string(), None).await;

    let response = post_json(
        app,
        "/api/v1/agent/analyze",
        json!({
            "client_id": "c1",
            "user_id": "me@example.com",
            "title": "Write report",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "processing");
    assert_eq!(json["data"]["client_id"], "c1");

    assert_eq!(
        next_event(&mut rx).await,
        AgentEvent::started("Agent analyzing task: Write report")
    );
    assert_eq!(
        next_event(&mut rx).await,
        AgentEvent::result("Report drafted", vec![])
    );
    assert_eq!(
        next_event(&mut rx).await,
        AgentEvent::completed("Agent analysis finished.")
    );
}

// ---------------------------------------------------------------------------
// Test: agent failures never reach the trigger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_agent_still_returns_202() {
    let (app, state) = build_test_app(FakeAgent::failing("rate limited"));
    let (_conn_id, mut rx) = state.ws_manager.add("c1".to_string(), None).await;

    let response = post_json(
        app,
        "/api/v1/agent/chat",
        json!({"client_id": "c1", "user_id": "me@example.com", "message": "hello"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        next_event(&mut rx).await,
        AgentEvent::started("Agent processing message")
    );
    assert_eq!(next_event(&mut rx).await, AgentEvent::error("rate limited"));
}

// ---------------------------------------------------------------------------
// Test: chat accepts the legacy `socket_id` field name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_accepts_socket_id_alias() {
    let (app, state) = build_test_app(FakeAgent::replying("Hi there", vec![]));
    let (_conn_id, mut rx) = state.ws_manager.add("sock-1".to_string(), None).await;

    let response = post_json(
        app,
        "/api/v1/agent/chat",
        json!({"socket_id": "sock-1", "user_id": "test_user", "message": "Hello"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_matches!(
        next_event(&mut rx).await,
        AgentEvent::Status { status: AgentStatus::Started, .. }
    );
}

// ---------------------------------------------------------------------------
// Test: unregistered client ids are still accepted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_for_unconnected_client_is_accepted() {
    let agent = FakeAgent::replying("Report drafted", vec![]);
    let (app, state) = build_test_app(agent.clone());

    let response = post_json(
        app,
        "/api/v1/agent/analyze",
        json!({"client_id": "c2", "user_id": "me@example.com", "title": "Write report"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(state.agent_jobs.shutdown(Duration::from_secs(2)).await);
    assert_eq!(agent.recorded_inputs().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: malformed trigger input is rejected with 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_client_id_returns_400() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));

    let response = post_json(
        app,
        "/api/v1/agent/analyze",
        json!({"client_id": "has space", "user_id": "me@example.com", "title": "Write report"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn blank_title_returns_400() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));

    let response = post_json(
        app,
        "/api/v1/agent/analyze",
        json!({"client_id": "c1", "user_id": "me@example.com", "title": "  "}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "title must not be empty");
}

#[tokio::test]
async fn unparseable_body_returns_bad_request_json() {
    let (app, _state) = build_test_app(FakeAgent::replying("ok", vec![]));

    let response = post_json(app, "/api/v1/agent/chat", json!({"client_id": "c1"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: shutting down the runner makes triggers answer 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_after_shutdown_returns_503() {
    let (app, state) = build_test_app(FakeAgent::replying("ok", vec![]));
    state.agent_jobs.shutdown(Duration::from_secs(1)).await;

    let response = post_json(
        app,
        "/api/v1/agent/chat",
        json!({"client_id": "c1", "user_id": "me@example.com", "message": "hello"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Test: GET /connections lists live sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connections_lists_sessions() {
    let (app, state) = build_test_app(FakeAgent::replying("ok", vec![]));
    let (_a, _rx_a) = state
        .ws_manager
        .add("c1".to_string(), Some("me@example.com".to_string()))
        .await;

    let response = get(app, "/api/v1/connections").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["sessions"][0]["client_id"], "c1");
    assert_eq!(json["data"]["sessions"][0]["user_id"], "me@example.com");
}

// ---------------------------------------------------------------------------
// Test: full round trip over a real WebSocket connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn websocket_session_receives_job_events() {
    let (app, state) = build_test_app(FakeAgent::replying("Report drafted", vec![]));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_app = app.clone();
    tokio::spawn(async move {
        axum::serve(listener, server_app).await.unwrap();
    });

    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws/c1?user_id=me%40example.com"))
            .await
            .expect("WebSocket handshake should succeed");

    // Registration happens after the upgrade completes.
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.ws_manager.lookup("c1").await.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session should register");

    let response = post_json(
        app,
        "/api/v1/agent/analyze",
        json!({"client_id": "c1", "user_id": "me@example.com", "title": "Write report"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let mut events = Vec::new();
    while events.len() < 3 {
        let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed early")
            .expect("frame error");
        if let tokio_tungstenite::tungstenite::Message::Text(text) = frame {
            events.push(serde_json::from_str::<AgentEvent>(text.as_str()).unwrap());
        }
    }

    assert_eq!(
        events,
        vec![
            AgentEvent::started("Agent analyzing task: Write report"),
            AgentEvent::result("Report drafted", vec![]),
            AgentEvent::completed("Agent analysis finished."),
        ]
    );

    // Closing the socket removes the session.
    socket.close(None).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.ws_manager.lookup("c1").await.is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session should unregister after close");
}
