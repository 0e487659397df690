mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use linetrack::route;
use std::sync::Arc;
use tracing::{error, info};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 3 {
        error!("Usage: linetrack-server <shapes.csv> <stops.csv>");
        std::process::exit(1);
    }

    info!("Loading route data...");
    let route = match route::load_shape(&args[1]) {
        Ok(route) => route,
        Err(err) => {
            error!("Failed to load route shape: {err}");
            std::process::exit(1);
        }
    };
    let stops = match route::load_stops(&args[2]) {
        Ok(stops) => stops,
        Err(err) => {
            error!("Failed to load stops: {err}");
            std::process::exit(1);
        }
    };
    info!(
        "Route loaded: {} points, {:.1} km, {} stops",
        route.points().len(),
        route.total_length().as_kilometers(),
        stops.len()
    );

    let state = Arc::new(AppState::new(route, stops));

    let app = axum::Router::new()
        .route(
            "/buses/{bus_id}/position",
            post(api::report_position).get(api::latest_position),
        )
        .route("/buses/{bus_id}/eta/{stop_id}", get(api::eta))
        .route("/buses/{bus_id}/progress", get(api::progress))
        .route("/stops", get(api::stops))
        .route("/trips", get(api::trips))
        .route("/drivers/{uid}/trip/start", post(api::start_trip))
        .route("/drivers/{uid}/trip/pause", post(api::pause_trip))
        .route("/drivers/{uid}/trip/resume", post(api::resume_trip))
        .route("/drivers/{uid}/trip/end", post(api::end_trip))
        .route("/drivers/{uid}/trip/restore", post(api::restore_trip))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT))
        .await
        .unwrap();
    info!("Listening to port {PORT}");
    axum::serve(listener, app).await.unwrap();
}
