use linetrack::{
    eta::{self, Eta, StopStatus},
    route::Progress,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EtaDto {
    pub eta_minutes: Option<i64>,
    pub eta_min: Option<i64>,
    pub eta_max: Option<i64>,
    pub distance_meters: i64,
    pub status: StopStatus,
    pub speed_kmh: f64,
    pub is_next: bool,
}

impl EtaDto {
    pub fn from(result: &Eta) -> Self {
        let eta_minutes = result.rounded_minutes();
        let range = eta_minutes.map(|minutes| eta::eta_range(minutes as f64));
        Self {
            eta_minutes,
            eta_min: range.map(|(min, _)| min as i64),
            eta_max: range.map(|(_, max)| max as i64),
            distance_meters: result.distance.as_meters().round() as i64,
            status: result.status,
            speed_kmh: result.speed_kmh,
            is_next: result.is_next,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressDto {
    pub percentage: f64,
    pub covered_km: f64,
    pub remaining_km: f64,
}

impl ProgressDto {
    pub fn from(progress: &Progress) -> Self {
        Self {
            percentage: progress.percentage,
            covered_km: progress.covered.as_kilometers(),
            remaining_km: progress.remaining.as_kilometers(),
        }
    }
}
