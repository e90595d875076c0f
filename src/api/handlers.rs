//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;

use super::AppState;
use super::types::{
    BalanceResponse, DemandBody, ErrorResponse, MaintenanceBody, MaintenanceResponse,
};
use crate::grid::{DemandRequest, GridError, GridSnapshot};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(e: &GridError) -> ApiError {
    debug!(error = %e, "request rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Returns the current grid snapshot.
///
/// `GET /status` → 200 + `GridSnapshot` JSON
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<GridSnapshot> {
    Json(state.scheduler.lock().await.snapshot())
}

/// Queues a demand request stamped with the current time.
///
/// `POST /demands` → 201
/// Unknown class or non-positive MW → 400 + `ErrorResponse`
pub async fn post_demand(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DemandBody>,
) -> Result<StatusCode, ApiError> {
    let mut scheduler = state.scheduler.lock().await;
    let at = scheduler.now();
    DemandRequest::parse(body.consumer_id, &body.class, body.megawatts, at)
        .and_then(|req| scheduler.receive_demand(req))
        .map_err(|e| bad_request(&e))?;
    Ok(StatusCode::CREATED)
}

/// Schedules maintenance `delay_secs` from now.
///
/// `POST /maintenance` → 201 + `MaintenanceResponse`
/// Negative duration → 400 + `ErrorResponse`
pub async fn post_maintenance(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MaintenanceBody>,
) -> Result<(StatusCode, Json<MaintenanceResponse>), ApiError> {
    let duration = body.duration_secs.unwrap_or(state.default_maintenance_secs);
    let mut scheduler = state.scheduler.lock().await;
    let id = scheduler
        .schedule_maintenance_after(body.substation_id.clone(), body.delay_secs, duration)
        .map_err(|e| bad_request(&e))?;
    let job = &scheduler.maintenance_jobs()[id.0];
    Ok((
        StatusCode::CREATED,
        Json(MaintenanceResponse {
            id: id.0,
            substation_id: body.substation_id,
            start: job.start(),
            end: job.end(),
        }),
    ))
}

/// Runs one scheduling cycle.
///
/// `POST /balance` → 200 + `BalanceResponse`
pub async fn post_balance(State(state): State<Arc<AppState>>) -> Json<BalanceResponse> {
    let report = state.scheduler.lock().await.run_cycle();
    Json(BalanceResponse::from(&report))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::grid::Scheduler;
    use crate::sim::clock::SystemClock;

    fn make_test_state() -> Arc<AppState> {
        let mut grid = Scheduler::new(SystemClock);
        grid.add_substation("S01", 50.0).unwrap();
        grid.add_substation("S02", 40.0).unwrap();
        Arc::new(AppState::new(grid, 3600))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn status_returns_200() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/status")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["substations"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["substations"][0]["id"], "S01");
        assert!(json.get("pending").is_some());
        assert!(json.get("maintenance").is_some());
    }

    #[tokio::test]
    async fn demand_is_created_and_queued() {
        let state = make_test_state();
        let resp = router(state.clone())
            .oneshot(post_json(
                "/demands",
                r#"{"consumer_id":"C101","class":"res","megawatts":25.5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(state.scheduler.lock().await.pending_len(), 1);
    }

    #[tokio::test]
    async fn invalid_class_returns_400() {
        let state = make_test_state();
        let resp = router(state.clone())
            .oneshot(post_json(
                "/demands",
                r#"{"consumer_id":"C1","class":"gov","megawatts":5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().is_some_and(|e| e.contains("gov")));
        assert_eq!(state.scheduler.lock().await.pending_len(), 0);
    }

    #[tokio::test]
    async fn non_positive_demand_returns_400() {
        let resp = router(make_test_state())
            .oneshot(post_json(
                "/demands",
                r#"{"consumer_id":"C1","class":"ind","megawatts":0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn maintenance_uses_default_duration() {
        let resp = router(make_test_state())
            .oneshot(post_json(
                "/maintenance",
                r#"{"substation_id":"S02","delay_secs":300}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        let start = json["start"].as_i64().unwrap_or_default();
        let end = json["end"].as_i64().unwrap_or_default();
        assert_eq!(end - start, 3600);
    }

    #[tokio::test]
    async fn negative_duration_returns_400() {
        let resp = router(make_test_state())
            .oneshot(post_json(
                "/maintenance",
                r#"{"substation_id":"S02","delay_secs":0,"duration_secs":-5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn balance_allocates_by_priority() {
        let state = make_test_state();
        for body in [
            r#"{"consumer_id":"RES","class":"res","megawatts":45}"#,
            r#"{"consumer_id":"IND","class":"ind","megawatts":30}"#,
        ] {
            router(state.clone())
                .oneshot(post_json("/demands", body))
                .await
                .unwrap();
        }

        let resp = router(state.clone())
            .oneshot(post_json("/balance", ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["cycle"], 1);
        assert_eq!(json["outcomes"][0]["consumer_id"], "IND");
        assert_eq!(json["outcomes"][0]["substation"], "S01");
        assert_eq!(json["outcomes"][1]["state"], "shed");
        assert_eq!(json["shed_count"], 1);
    }
}
