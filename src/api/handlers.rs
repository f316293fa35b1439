//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, SeriesPoint, SimulateResponse, StateResponse};
use crate::config::{RunConfig, ScenarioConfig};
use crate::kpi::KpiReport;

/// Returns a summary of the loaded baseline series.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse::from(&state.baseline))
}

/// Applies a scenario to the baseline and returns KPIs plus the adjusted
/// series.
///
/// `POST /simulate` with a `{"kind": ..., ...}` body → 200 + `SimulateResponse`
/// Out-of-range or unknown scenario parameters → 400 + `ErrorResponse`
pub async fn post_simulate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScenarioConfig>,
) -> impl IntoResponse {
    let config = RunConfig {
        scenario: body,
        ..RunConfig::default()
    };
    let scenario = match config.scenario() {
        Ok(scenario) => scenario,
        Err(err) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ));
        }
    };

    let adjusted = scenario.apply(&state.baseline, &state.settings);
    let kpi = match KpiReport::compare(&state.baseline, &adjusted) {
        Ok(kpi) => kpi,
        Err(err) => {
            // unreachable when composed with the engine, but never panic a handler
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ));
        }
    };

    Ok(Json(SimulateResponse {
        kpi,
        adjusted: adjusted.iter().map(SeriesPoint::from).collect(),
    }))
}
