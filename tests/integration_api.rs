//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use grid_dr::api::{AppState, router};
use grid_dr::config::GridConfig;
use grid_dr::sim::clock::SystemClock;

/// Builds API state from the default preset.
fn build_api_state() -> Arc<AppState> {
    let cfg = GridConfig::baseline();
    let scheduler = cfg
        .build_scheduler(SystemClock)
        .expect("baseline should build");
    Arc::new(AppState::new(
        scheduler,
        cfg.maintenance.default_duration_secs,
    ))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.expect("request should complete");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("body should be JSON")
    };
    (status, json)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn status_lists_reference_substations() {
    let (status, json) = send(router(build_api_state()), get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["substations"]
        .as_array()
        .map(|a| a.iter().filter_map(|s| s["id"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["S01", "S02", "S03"]);
    assert_eq!(json["cycles"], 0);
}

#[tokio::test]
async fn submit_balance_status_flow() {
    let state = build_api_state();

    for body in [
        r#"{"consumer_id":"C1","class":"com","megawatts":45}"#,
        r#"{"consumer_id":"C2","class":"industrial","megawatts":50}"#,
        r#"{"consumer_id":"C3","class":"res","megawatts":100}"#,
    ] {
        let (status, _) = send(router(state.clone()), post("/demands", body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(router(state.clone()), get("/status")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(router(state.clone()), post("/balance", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["allocated_count"], 2);
    assert_eq!(json["shed_count"], 1);
    assert_eq!(json["outcomes"][0]["consumer_id"], "C2");
    assert_eq!(json["outcomes"][0]["substation"], "S01");
    assert_eq!(json["outcomes"][1]["substation"], "S03");

    let (_, json) = send(router(state), get("/status")).await;
    assert_eq!(json["cycles"], 1);
    assert_eq!(json["pending"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["substations"][0]["used_mw"], 50.0);
}

#[tokio::test]
async fn immediate_maintenance_takes_substation_offline_on_balance() {
    let state = build_api_state();
    let (status, json) = send(
        router(state.clone()),
        post(
            "/maintenance",
            r#"{"substation_id":"S01","delay_secs":-10,"duration_secs":3600}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 0);

    send(
        router(state.clone()),
        post(
            "/demands",
            r#"{"consumer_id":"C1","class":"ind","megawatts":30}"#,
        ),
    )
    .await;
    let (_, json) = send(router(state.clone()), post("/balance", "")).await;
    assert_eq!(json["outcomes"][0]["substation"], "S02");

    let (_, json) = send(router(state), get("/status")).await;
    assert_eq!(json["substations"][0]["online"], false);
    assert_eq!(json["maintenance"][0]["state"], "in_progress");
}

#[tokio::test]
async fn bad_requests_return_400() {
    let state = build_api_state();
    for body in [
        r#"{"consumer_id":"C1","class":"gov","megawatts":5}"#,
        r#"{"consumer_id":"C1","class":"res","megawatts":-1}"#,
    ] {
        let (status, json) = send(router(state.clone()), post("/demands", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}
