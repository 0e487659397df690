use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{
    route::{self, Route},
    shared::geo::Coordinate,
};

/// One row of a GTFS-style `shapes.txt` file.
#[derive(Debug, Deserialize)]
struct ShapePoint {
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: u32,
}

/// A named stop along the route, as loaded from a GTFS-style `stops.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

impl Stop {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.stop_lat,
            longitude: self.stop_lon,
        }
    }
}

/// Reads a route polyline from a shape CSV. Rows are ordered by
/// `shape_pt_sequence`, not by file order.
pub fn load_shape<P: AsRef<Path>>(path: P) -> Result<Route, route::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows: Vec<ShapePoint> = Vec::new();
    for result in reader.deserialize() {
        let row: ShapePoint = result?;
        rows.push(row);
    }
    rows.sort_by_key(|row| row.shape_pt_sequence);

    debug!("Loaded {} shape points", rows.len());
    Route::new(
        rows.into_iter()
            .map(|row| Coordinate {
                latitude: row.shape_pt_lat,
                longitude: row.shape_pt_lon,
            })
            .collect(),
    )
}

/// Reads the stop list from a stops CSV, in file order.
pub fn load_stops<P: AsRef<Path>>(path: P) -> Result<Vec<Stop>, route::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut stops: Vec<Stop> = Vec::new();
    for result in reader.deserialize() {
        let stop: Stop = result?;
        stops.push(stop);
    }

    debug!("Loaded {} stops", stops.len());
    Ok(stops)
}
