//! End-to-end dispatch against mock add-on servers.

use std::time::{Duration, Instant};

use relay::{ConnectionState, ErrorKind, Relay, RelayConfig, STUB_MARKER};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unreachable_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn config(modeling_port: u16, engine_port: u16) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.modeling.host = "127.0.0.1".into();
    config.modeling.port = Some(modeling_port);
    config.engine.host = "127.0.0.1".into();
    config.engine.port = engine_port;
    config.connection.retry_backoff_ms = 50;
    config
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

async fn modeling_server(extended: bool) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let mut version = json!({"version": "1.0.0"});
    if extended {
        version["extended_version"] = json!("1.0.0");
    }
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({"type": "get_version_info"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "result": version})),
        )
        .mount(&server)
        .await;
    server
}

async fn engine_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn create_primitive_issues_create_then_color() {
    let modeling = modeling_server(false).await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({"type": "create_object", "params": {"type": "CUBE", "name": "C1"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "result": {"name": "C1", "type": "MESH"}})),
        )
        .expect(1)
        .mount(&modeling)
        .await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(
            json!({"type": "set_material", "params": {"object_name": "C1", "color": [1, 0, 0]}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&modeling)
        .await;

    let relay = Relay::from_config(&config(modeling.address().port(), unreachable_port())).unwrap();
    let envelope = relay
        .handle_tool_call(
            "mcp_blender_create_primitive",
            &args(json!({"type": "CUBE", "name": "C1", "color": [1, 0, 0]})),
        )
        .await;

    assert!(envelope.is_success(), "{envelope:?}");
    assert_eq!(envelope.get("name"), Some(&json!("C1")));
}

#[tokio::test]
async fn missing_level_name_makes_no_requests() {
    let engine = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&engine)
        .await;

    let relay = Relay::from_config(&config(unreachable_port(), engine.address().port())).unwrap();
    let envelope = relay
        .handle_tool_call("mcp_unreal_create_level", &Map::new())
        .await;

    assert_eq!(envelope.kind, Some(ErrorKind::MissingParameters));
    assert!(envelope.message.unwrap().contains("level_name"));
}

#[tokio::test]
async fn unreachable_engine_fails_within_retry_budget() {
    let relay = Relay::from_config(&config(unreachable_port(), unreachable_port())).unwrap();

    let started = Instant::now();
    let envelope = relay
        .handle_tool_call("mcp_unreal_get_engine_version", &Map::new())
        .await;
    assert_eq!(envelope.kind, Some(ErrorKind::ConnectionUnavailable));
    assert!(started.elapsed() < Duration::from_secs(2));

    let started = Instant::now();
    let again = relay
        .handle_tool_call("mcp_unreal_get_engine_version", &Map::new())
        .await;
    assert_eq!(again.kind, Some(ErrorKind::ConnectionUnavailable));
    assert!(started.elapsed() < Duration::from_millis(50));

    let status = relay.connection_status();
    assert_eq!(status.engine.state, ConnectionState::Unavailable);
    assert!(status.engine.last_error.is_some());
}

#[tokio::test]
async fn unreachable_modeling_answers_from_stub() {
    let relay = Relay::from_config(&config(unreachable_port(), unreachable_port())).unwrap();

    let envelope = relay
        .handle_tool_call("mcp_blender_get_scene_info", &Map::new())
        .await;
    assert!(envelope.is_success());
    assert_eq!(envelope.get(STUB_MARKER), Some(&json!(true)));
    assert_eq!(envelope.get("objects"), Some(&json!([])));

    let envelope = relay
        .handle_tool_call(
            "mcp_blender_transform_object",
            &args(json!({"object_name": "Cube", "location": [0, 0, 1]})),
        )
        .await;
    assert_eq!(envelope.kind, Some(ErrorKind::ConnectionUnavailable));
    assert_eq!(relay.connection_status().modeling.state, ConnectionState::Stubbed);
}

#[tokio::test]
async fn engine_version_runs_as_script() {
    let engine = engine_server().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string_contains("get_engine_version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "output": "5.3.2"})),
        )
        .expect(1)
        .mount(&engine)
        .await;

    let relay = Relay::from_config(&config(unreachable_port(), engine.address().port())).unwrap();
    let envelope = relay
        .handle_tool_call("mcp_unreal_get_engine_version", &Map::new())
        .await;

    assert!(envelope.is_success());
    assert_eq!(envelope.get("output"), Some(&json!("5.3.2")));
}

#[tokio::test]
async fn remote_failure_text_is_preserved() {
    let engine = engine_server().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(500).set_body_string("actor Rock not found"))
        .mount(&engine)
        .await;

    let relay = Relay::from_config(&config(unreachable_port(), engine.address().port())).unwrap();
    let envelope = relay
        .handle_tool_call("mcp_unreal_modify_actor", &args(json!({"actor_name": "Rock"})))
        .await;

    assert_eq!(envelope.kind, Some(ErrorKind::RemoteExecutionError));
    assert!(envelope.message.unwrap().contains("actor Rock not found"));
    assert!(relay.connection_status().engine.connected);
}

#[tokio::test]
async fn probe_is_cached_across_calls() {
    let modeling = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&modeling)
        .await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({"type": "get_version_info"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"status": "success", "result": {"version": "1.0.0", "extended_version": "1.0.0"}}),
        ))
        .expect(1)
        .mount(&modeling)
        .await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({"type": "get_scene_info"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"status": "success", "result": {"name": "Scene", "objects": []}}),
        ))
        .expect(3)
        .mount(&modeling)
        .await;

    let relay = Relay::from_config(&config(modeling.address().port(), unreachable_port())).unwrap();
    for _ in 0..3 {
        let envelope = relay
            .handle_tool_call("mcp_blender_get_scene_info", &Map::new())
            .await;
        assert!(envelope.is_success());
    }

    let status = relay.connection_status();
    assert!(status.modeling.connected);
    assert_eq!(status.modeling.extended, Some(true));
}

#[tokio::test]
async fn session_dispatch_pushes_results() {
    let modeling = modeling_server(true).await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({"type": "get_scene_info"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"status": "success", "result": {"name": "Scene", "object_count": 0}}),
        ))
        .mount(&modeling)
        .await;

    let relay = Relay::from_config(&config(modeling.address().port(), unreachable_port())).unwrap();
    let session = relay.open_session();
    let mut events = relay.sessions().take_receiver(session).unwrap();

    let envelope = relay
        .handle_tool_call_in_session(session, "mcp_blender_extended_scene_info", &Map::new())
        .await;
    assert_eq!(envelope.get("extended_info_available"), Some(&json!(true)));

    let event = events.recv().await.unwrap();
    assert_eq!(event.session_id, session);
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["kind"], "tool_result");
    assert_eq!(value["envelope"]["data"]["extended_version"], "1.0.0");

    relay.close_session(session);
    assert!(events.recv().await.is_none());
}
