use serde::{Deserialize, Serialize};

use crate::{
    route::Route,
    shared::geo::{Coordinate, Distance},
};

/// Speed assumed when neither the current fix nor the history holds a
/// usable sample, km/h.
const DEFAULT_SPEED_KMH: f64 = 25.0;

/// Floor applied to the smoothed speed before dividing, so a bus idling at
/// a red light produces a long ETA instead of an unbounded one.
const MIN_EFFECTIVE_KMH: f64 = 5.0;

/// Samples at or above this are GPS glitches and get dropped. Wider than
/// the tracker's 100 km/h bound on purpose: the two windows are independent
/// policies.
const GLITCH_KMH: f64 = 150.0;

/// How many trailing history samples feed the smoothed average.
const SMOOTHING_WINDOW: usize = 5;

/// A bus at or past the stop counts as arriving within this radius.
const ARRIVAL_RADIUS: Distance = Distance::from_meters(50.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopStatus {
    /// At or past the stop, within the arrival radius.
    Arriving,
    /// Less than two minutes out.
    ArrivingSoon,
    /// Less than five minutes out.
    Nearby,
    /// On the way.
    EnRoute,
    /// Already beyond the stop.
    Passed,
}

/// Arrival estimate for one stop. `minutes` stays unrounded; display code
/// goes through [`Eta::rounded_minutes`]. `None` minutes means the bus has
/// passed the stop and no estimate applies.
#[derive(Debug, Clone, Copy)]
pub struct Eta {
    pub minutes: Option<f64>,
    pub distance: Distance,
    pub status: StopStatus,
    pub speed_kmh: f64,
    pub is_next: bool,
}

impl Eta {
    pub fn rounded_minutes(&self) -> Option<i64> {
        self.minutes.map(|minutes| minutes.round() as i64)
    }
}

/// Estimates the arrival of `bus` at `stop` along `route`.
///
/// Both coordinates are snapped onto the route first; comparing their
/// segment indices tells us whether the stop is still ahead. Only then is
/// the along-route distance worth computing. Pure function of its inputs,
/// never fails: bad speed data degrades to defaults instead.
pub fn calculate(
    bus: &Coordinate,
    stop: &Coordinate,
    current_speed_kmh: f64,
    speed_history: &[f64],
    route: &Route,
) -> Eta {
    let bus_position = route.project(bus);
    let stop_position = route.project(stop);

    // At or beyond the stop's segment: the along-route distance is
    // meaningless, fall back to the direct distance.
    if bus_position.segment >= stop_position.segment {
        let distance = bus.distance(stop);
        let status = if distance < ARRIVAL_RADIUS {
            StopStatus::Arriving
        } else {
            StopStatus::Passed
        };
        return Eta {
            minutes: (status == StopStatus::Arriving).then_some(0.0),
            distance,
            status,
            speed_kmh: current_speed_kmh,
            is_next: false,
        };
    }

    let distance = route.distance_between(&bus_position, &stop_position);
    let speed_kmh = smoothed_speed(current_speed_kmh, speed_history);
    let effective_kmh = speed_kmh.max(MIN_EFFECTIVE_KMH);
    let speed_mps = effective_kmh * 1000.0 / 3600.0;
    let minutes = distance.as_meters() / speed_mps / 60.0;

    let status = if minutes < 2.0 {
        StopStatus::ArrivingSoon
    } else if minutes < 5.0 {
        StopStatus::Nearby
    } else {
        StopStatus::EnRoute
    };
    let is_next = status != StopStatus::Passed && distance.as_meters() > 0.0;

    Eta {
        minutes: Some(minutes),
        distance,
        status,
        speed_kmh,
        is_next,
    }
}

/// Rolling average over the last [`SMOOTHING_WINDOW`] samples, the current
/// one included. Glitches (negative or >= 150 km/h) are dropped, zero is
/// kept since "stopped" is real data. With no history at all the current
/// speed wins, unless it is zero, in which case the default applies.
pub fn smoothed_speed(current_kmh: f64, history: &[f64]) -> f64 {
    if history.is_empty() {
        return if current_kmh == 0.0 {
            DEFAULT_SPEED_KMH
        } else {
            current_kmh
        };
    }

    let combined: Vec<f64> = history.iter().copied().chain([current_kmh]).collect();
    let start = combined.len().saturating_sub(SMOOTHING_WINDOW);
    let valid: Vec<f64> = combined[start..]
        .iter()
        .filter(|speed| **speed >= 0.0 && **speed < GLITCH_KMH)
        .copied()
        .collect();

    if valid.is_empty() {
        return DEFAULT_SPEED_KMH;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

/// ±20% display range around a rounded estimate, floored at zero.
pub fn eta_range(minutes: f64) -> (f64, f64) {
    let variance = (minutes * 0.2).ceil();
    ((minutes - variance).max(0.0), minutes + variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_route() -> Route {
        Route::new(vec![
            Coordinate::from((0.0, 0.0)),
            Coordinate::from((0.0, 1.0)),
            Coordinate::from((0.0, 2.0)),
        ])
        .unwrap()
    }

    #[test]
    fn arriving_within_radius() {
        let route = straight_route();
        // Both project onto the last segment, ~11m apart.
        let stop = Coordinate::from((0.0, 1.9));
        let bus = Coordinate::from((0.0001, 1.9));
        let eta = calculate(&bus, &stop, 20.0, &[], &route);
        assert_eq!(eta.status, StopStatus::Arriving);
        assert_eq!(eta.minutes, Some(0.0));
        assert!(!eta.is_next);
    }

    #[test]
    fn passed_beyond_radius() {
        let route = straight_route();
        let stop = Coordinate::from((0.0, 1.2));
        let bus = Coordinate::from((0.0, 1.8));
        let eta = calculate(&bus, &stop, 20.0, &[], &route);
        assert_eq!(eta.status, StopStatus::Passed);
        assert_eq!(eta.minutes, None);
        assert!(!eta.is_next);
    }

    #[test]
    fn faster_bus_means_smaller_eta() {
        let route = straight_route();
        let bus = Coordinate::from((0.0, 0.2));
        let stop = Coordinate::from((0.0, 1.8));
        let slow = calculate(&bus, &stop, 20.0, &[], &route);
        let fast = calculate(&bus, &stop, 60.0, &[], &route);
        assert!(fast.minutes.unwrap() < slow.minutes.unwrap());
        assert_eq!(slow.distance, fast.distance);
    }

    #[test]
    fn stopped_bus_gets_floored_speed_not_infinity() {
        let route = straight_route();
        let bus = Coordinate::from((0.0, 0.2));
        let stop = Coordinate::from((0.0, 1.8));
        let eta = calculate(&bus, &stop, 0.0, &[0.0, 0.0, 0.0], &route);
        // Smoothed speed is genuinely 0, but the ETA divides by the floor.
        assert_eq!(eta.speed_kmh, 0.0);
        let minutes = eta.minutes.unwrap();
        assert!(minutes.is_finite());
        let floored_mps = 5.0 * 1000.0 / 3600.0;
        let expected = eta.distance.as_meters() / floored_mps / 60.0;
        assert!((minutes - expected).abs() < 1e-9);
    }

    #[test]
    fn smoothing_keeps_zero_but_defaults_on_empty() {
        // All-zero history with a zero current speed averages to zero.
        assert_eq!(smoothed_speed(0.0, &[0.0, 0.0, 0.0]), 0.0);
        // No history at all falls back to the default for a zero current.
        assert_eq!(smoothed_speed(0.0, &[]), DEFAULT_SPEED_KMH);
        // No history with a real current speed uses it as-is.
        assert_eq!(smoothed_speed(31.0, &[]), 31.0);
    }

    #[test]
    fn smoothing_windows_last_five_and_drops_glitches() {
        // Only the five newest samples count: the leading 90s fall outside
        // the window once the current fix is appended.
        let history = [90.0, 90.0, 20.0, 22.0, 21.0, 23.0, 20.0];
        let smoothed = smoothed_speed(24.0, &history);
        assert!((smoothed - 22.0).abs() < 1e-9);

        // A 200 km/h glitch in the window is dropped, not averaged.
        let smoothed = smoothed_speed(20.0, &[20.0, 200.0, 20.0]);
        assert_eq!(smoothed, 20.0);

        // Nothing valid at all in window or current: default.
        let smoothed = smoothed_speed(-1.0, &[200.0, 180.0]);
        assert_eq!(smoothed, DEFAULT_SPEED_KMH);
    }

    #[test]
    fn status_thresholds_use_unrounded_minutes() {
        let (min, max) = eta_range(10.0);
        assert_eq!((min, max), (8.0, 12.0));
        let (min, max) = eta_range(1.0);
        assert_eq!((min, max), (0.0, 2.0));

        let route = straight_route();
        let bus = Coordinate::from((0.0, 0.2));
        let stop = Coordinate::from((0.0, 1.8));
        // ~178km at 60 km/h is about 178 minutes: clearly en-route.
        let eta = calculate(&bus, &stop, 60.0, &[], &route);
        assert_eq!(eta.status, StopStatus::EnRoute);
        assert!(eta.is_next);
        assert_eq!(eta.rounded_minutes(), Some(eta.minutes.unwrap().round() as i64));
    }
}
