use std::collections::VecDeque;

/// Default speed assumed for a bus when GPS gives us nothing usable, km/h.
pub const DEFAULT_SPEED_KMH: f64 = 20.0;

/// Speed a tracker reports before it has collected any samples, km/h.
pub const FALLBACK_AVERAGE_KMH: f64 = 25.0;

const MAX_PLAUSIBLE_KMH: f64 = 100.0;
const DEFAULT_CAPACITY: usize = 10;

/// Converts a raw GPS speed (m/s) into km/h for display and tracking.
///
/// GPS units on phones regularly report missing, negative, or absurd speeds
/// while the vehicle sits at a stop or loses fix. Anything outside
/// `(0, 100]` km/h falls back to [`DEFAULT_SPEED_KMH`].
pub fn normalize_speed(speed_mps: Option<f64>) -> f64 {
    let Some(speed_mps) = speed_mps else {
        return DEFAULT_SPEED_KMH;
    };
    let speed_kmh = speed_mps * 3.6;
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 || speed_kmh > MAX_PLAUSIBLE_KMH {
        return DEFAULT_SPEED_KMH;
    }
    speed_kmh.round()
}

/// Bounded FIFO of recent speed samples backing the dashboard speed readout.
///
/// This window is intentionally separate from the ETA smoothing window: the
/// tracker keeps up to 10 samples and rejects anything outside the open
/// interval (0, 100) km/h, while ETA smoothing looks at the last 5 samples
/// and tolerates up to 150 km/h with zero retained.
#[derive(Debug, Clone)]
pub struct SpeedTracker {
    history: VecDeque<f64>,
    capacity: usize,
}

impl Default for SpeedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a sample, evicting the oldest one beyond capacity. Samples
    /// outside (0, 100) km/h are dropped.
    pub fn add(&mut self, speed_kmh: f64) {
        if speed_kmh > 0.0 && speed_kmh < MAX_PLAUSIBLE_KMH {
            self.history.push_back(speed_kmh);
            if self.history.len() > self.capacity {
                self.history.pop_front();
            }
        }
    }

    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Mean of the retained samples, or [`FALLBACK_AVERAGE_KMH`] when empty.
    pub fn average(&self) -> f64 {
        if self.history.is_empty() {
            return FALLBACK_AVERAGE_KMH;
        }
        let sum: f64 = self.history.iter().sum();
        sum / self.history.len() as f64
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_speed_converts_and_rounds() {
        // 10 m/s = 36 km/h
        assert_eq!(normalize_speed(Some(10.0)), 36.0);
        assert_eq!(normalize_speed(Some(6.94)), 25.0);
    }

    #[test]
    fn normalize_speed_falls_back_on_bad_input() {
        assert_eq!(normalize_speed(None), DEFAULT_SPEED_KMH);
        assert_eq!(normalize_speed(Some(0.0)), DEFAULT_SPEED_KMH);
        assert_eq!(normalize_speed(Some(-3.0)), DEFAULT_SPEED_KMH);
        // 40 m/s = 144 km/h, past anything a city bus does
        assert_eq!(normalize_speed(Some(40.0)), DEFAULT_SPEED_KMH);
        assert_eq!(normalize_speed(Some(f64::NAN)), DEFAULT_SPEED_KMH);
    }

    #[test]
    fn tracker_rejects_out_of_range_samples() {
        let mut tracker = SpeedTracker::new();
        tracker.add(0.0);
        tracker.add(-5.0);
        tracker.add(100.0);
        tracker.add(120.0);
        assert_eq!(tracker.history().count(), 0);
        assert_eq!(tracker.average(), FALLBACK_AVERAGE_KMH);
    }

    #[test]
    fn tracker_evicts_oldest_beyond_capacity() {
        let mut tracker = SpeedTracker::with_capacity(3);
        for speed in [10.0, 20.0, 30.0, 40.0] {
            tracker.add(speed);
        }
        let kept: Vec<f64> = tracker.history().collect();
        assert_eq!(kept, vec![20.0, 30.0, 40.0]);
        assert_eq!(tracker.average(), 30.0);
    }

    #[test]
    fn tracker_clear_resets_average() {
        let mut tracker = SpeedTracker::new();
        tracker.add(50.0);
        tracker.clear();
        assert_eq!(tracker.average(), FALLBACK_AVERAGE_KMH);
    }
}
