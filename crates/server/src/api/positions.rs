use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use linetrack::feed::GpsFix;
use std::sync::Arc;

use crate::state::AppState;

/// Driver clients push their GPS fixes here. The raw speed goes through the
/// tracker window, the position goes out on the feed.
pub async fn report_position(
    Path(bus_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(fix): Json<GpsFix>,
) -> Result<Response, StatusCode> {
    let speed_kmh = fix.speed_kmh();
    state
        .trackers
        .lock()
        .await
        .entry(bus_id.clone())
        .or_default()
        .add(speed_kmh);

    let position = state.feed.publish_fix(&bus_id, &fix);
    Ok(Json(position).into_response())
}

pub async fn latest_position(
    Path(bus_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let position = state.feed.latest(&bus_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(position).into_response())
}

pub async fn stops(State(state): State<Arc<AppState>>) -> Response {
    Json(&state.stops).into_response()
}
