//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery};
use crate::sim::types::TimestepRecord;

/// Returns simulation config, KPI report, final battery and latest record.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        config: state.config.clone(),
        controller: state.controller.clone(),
        kpi: state.kpi.clone(),
        final_battery: state.final_battery,
        latest_step: state.records.last().cloned(),
    })
}

/// Returns timestep records, optionally filtered by timestep range.
///
/// `GET /telemetry` → 200 + `Vec<TimestepRecord>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let Some((from, to)) = query.range() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "`from` ({}) must be <= `to` ({})",
                    query.from.unwrap_or(0),
                    query.to.unwrap_or(usize::MAX)
                ),
            }),
        ));
    };

    let records: Vec<TimestepRecord> = state
        .records
        .iter()
        .filter(|r| r.timestep >= from && r.timestep <= to)
        .cloned()
        .collect();

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::ScenarioConfig;
    use crate::sim::kpi::KpiReport;

    fn make_test_state() -> Arc<AppState> {
        let mut engine = ScenarioConfig::baseline()
            .build_engine()
            .expect("baseline builds");
        let out = engine.run();
        let kpi = KpiReport::from_records(&out.records, out.final_battery.capacity_kwh);
        Arc::new(AppState {
            config: engine.config().clone(),
            controller: "greedy".to_string(),
            kpi,
            records: out.records,
            final_battery: out.final_battery,
        })
    }

    #[tokio::test]
    async fn state_returns_200() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/state")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("config").is_some());
        assert!(json.get("kpi").is_some());
        assert!(json.get("final_battery").is_some());
        assert_eq!(json["latest_step"]["timestep"], 23);
        assert_eq!(json["controller"], "greedy");
    }

    #[tokio::test]
    async fn telemetry_returns_all_steps() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/telemetry")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 24);
    }

    #[tokio::test]
    async fn telemetry_range_query() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/telemetry?from=5&to=10")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 6); // timesteps 5,6,7,8,9,10
        assert_eq!(json[0]["timestep"], 5);
        assert_eq!(json[5]["timestep"], 10);
    }

    #[tokio::test]
    async fn telemetry_invalid_range_returns_400() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/telemetry?from=10&to=5")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("error").is_some());
    }
}
