use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use linetrack::trip::{Driver, TripManager, TripStore};
use std::sync::Arc;
use tracing::error;

use crate::{
    dto::{EndedTripDto, RestoredTripDto, StartedTripDto, TripDto},
    state::AppState,
};

/// Creates (or reuses) the driver's manager and starts a fresh trip. The
/// driver profile comes from the identity layer in front of this API; the
/// core trusts it as-is.
pub async fn start_trip(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(driver): Json<Driver>,
) -> Result<Response, StatusCode> {
    if driver.uid != uid {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut managers = state.managers.lock().await;
    let manager = managers
        .entry(uid)
        .or_insert_with(|| TripManager::new(state.store.clone(), driver));

    match manager.start_trip().await {
        Ok(trip_id) => Ok(Json(StartedTripDto { trip_id }).into_response()),
        Err(linetrack::trip::Error::NoBusAssigned) => Err(StatusCode::BAD_REQUEST),
        Err(err) => {
            error!("Failed to start trip: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn pause_trip(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let mut managers = state.managers.lock().await;
    let manager = managers.get_mut(&uid).ok_or(StatusCode::NOT_FOUND)?;
    manager.pause_trip().await.map_err(|err| {
        error!("Failed to pause trip: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(().into_response())
}

pub async fn resume_trip(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let mut managers = state.managers.lock().await;
    let manager = managers.get_mut(&uid).ok_or(StatusCode::NOT_FOUND)?;
    manager.resume_trip().await.map_err(|err| {
        error!("Failed to resume trip: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(().into_response())
}

pub async fn end_trip(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let mut managers = state.managers.lock().await;
    let manager = managers.get_mut(&uid).ok_or(StatusCode::NOT_FOUND)?;
    let ended = manager.end_trip().await.map_err(|err| {
        error!("Failed to end trip: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(EndedTripDto { trip_id: ended }).into_response())
}

/// Reload recovery: rejoin an in-progress trip if one qualifies. Always
/// answers 200; a `null` body means there was nothing to restore.
pub async fn restore_trip(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(driver): Json<Driver>,
) -> Result<Response, StatusCode> {
    if driver.uid != uid {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut managers = state.managers.lock().await;
    let manager = managers
        .entry(uid)
        .or_insert_with(|| TripManager::new(state.store.clone(), driver));

    let restored = manager
        .restore_active_trip()
        .await
        .map(|restored| RestoredTripDto::from(&restored));
    Ok(Json(restored).into_response())
}

pub async fn trips(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let records = state.store.list().await.map_err(|err| {
        error!("Failed to list trips: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let records: Vec<TripDto> = records
        .into_iter()
        .map(|(trip_id, trip)| TripDto { trip_id, trip })
        .collect();
    Ok(Json(records).into_response())
}
