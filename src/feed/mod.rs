use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use serde::{Deserialize, Serialize};

use crate::shared::{
    geo::Coordinate,
    speed::normalize_speed,
};

/// A raw fix from the GPS source. Speed arrives in m/s and may well be
/// missing or garbage; [`GpsFix::speed_kmh`] normalizes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_mps: Option<f64>,
    pub timestamp: i64,
}

impl GpsFix {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn speed_kmh(&self) -> f64 {
        normalize_speed(self.speed_mps)
    }
}

/// Latest published position of one bus, as riders see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePosition {
    pub coordinate: Coordinate,
    pub speed_kmh: f64,
    pub bearing: Option<f64>,
    pub recorded_at: i64,
}

type Callback = Box<dyn Fn(&str, &VehiclePosition) + Send + Sync>;

#[derive(Default)]
struct Inner {
    latest: HashMap<String, VehiclePosition>,
    watchers: HashMap<u64, Callback>,
    next_watcher: u64,
}

/// Push-based change notification for bus positions, the in-process
/// equivalent of a realtime store's value subscriptions.
///
/// Each publish retains the latest position per bus and notifies every
/// subscriber. Consumers are expected to react with an idempotent
/// recomputation (re-run projection and ETA against the new position), not
/// with stateful diffing, so a dropped or repeated notification is
/// harmless.
#[derive(Default, Clone)]
pub struct PositionFeed {
    inner: Arc<Mutex<Inner>>,
}

/// Handle returned by [`PositionFeed::subscribe`]. The callback stays
/// attached for the lifetime of the handle; dropping or cancelling it
/// detaches the callback.
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).watchers.remove(&self.id);
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl PositionFeed {
    pub fn new() -> Self {
        Default::default()
    }

    /// Publishes a raw fix for a bus, deriving the travel bearing from the
    /// previously retained position when the bus has actually moved.
    pub fn publish_fix(&self, bus_id: &str, fix: &GpsFix) -> VehiclePosition {
        let coordinate = fix.coordinate();
        let bearing = self
            .latest(bus_id)
            .filter(|previous| previous.coordinate != coordinate)
            .map(|previous| previous.coordinate.bearing(&coordinate));

        let position = VehiclePosition {
            coordinate,
            speed_kmh: fix.speed_kmh(),
            bearing,
            recorded_at: fix.timestamp,
        };
        self.publish(bus_id, position.clone());
        position
    }

    /// Retains `position` as the latest for `bus_id` and notifies every
    /// subscriber. Callbacks run on the publishing thread and must not call
    /// back into the feed.
    pub fn publish(&self, bus_id: &str, position: VehiclePosition) {
        let mut inner = lock(&self.inner);
        inner.latest.insert(bus_id.to_string(), position.clone());
        for watcher in inner.watchers.values() {
            watcher(bus_id, &position);
        }
    }

    pub fn latest(&self, bus_id: &str) -> Option<VehiclePosition> {
        lock(&self.inner).latest.get(bus_id).cloned()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &VehiclePosition) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.next_watcher;
        inner.next_watcher += 1;
        inner.watchers.insert(id, Box::new(callback));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}
