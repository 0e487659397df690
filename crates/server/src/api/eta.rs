use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use linetrack::eta;
use std::sync::Arc;

use crate::{
    dto::{EtaDto, ProgressDto},
    state::AppState,
};

/// Rider view: arrival estimate of a bus at one of the route's stops, based
/// on the last reported position and the smoothed speed window.
pub async fn eta(
    Path((bus_id, stop_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let position = state.feed.latest(&bus_id).ok_or(StatusCode::NOT_FOUND)?;
    let stop = state.stop(&stop_id).ok_or(StatusCode::NOT_FOUND)?;

    let history: Vec<f64> = state
        .trackers
        .lock()
        .await
        .get(&bus_id)
        .map(|tracker| tracker.history().collect())
        .unwrap_or_default();

    let result = eta::calculate(
        &position.coordinate,
        &stop.coordinate(),
        position.speed_kmh,
        &history,
        &state.route,
    );
    Ok(Json(EtaDto::from(&result)).into_response())
}

pub async fn progress(
    Path(bus_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let position = state.feed.latest(&bus_id).ok_or(StatusCode::NOT_FOUND)?;
    let progress = state.route.progress(&position.coordinate);
    Ok(Json(ProgressDto::from(&progress)).into_response())
}
