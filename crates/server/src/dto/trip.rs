use linetrack::trip::{RestoredTrip, Trip};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StartedTripDto {
    pub trip_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndedTripDto {
    pub trip_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripDto {
    pub trip_id: String,
    pub trip: Trip,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoredTripDto {
    pub trip_id: String,
    pub trip: Trip,
    pub resume_gps: bool,
}

impl RestoredTripDto {
    pub fn from(restored: &RestoredTrip) -> Self {
        Self {
            trip_id: restored.trip_id.clone(),
            trip: restored.trip.clone(),
            resume_gps: restored.resume_gps,
        }
    }
}
