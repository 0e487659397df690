use linetrack::{
    feed::PositionFeed,
    route::{Route, Stop},
    shared::speed::SpeedTracker,
    trip::{MemoryStore, TripManager},
};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub struct AppState {
    pub route: Route,
    pub stops: Vec<Stop>,
    pub feed: PositionFeed,
    pub store: MemoryStore,
    /// Per-bus rolling speed window feeding the ETA history.
    pub trackers: Mutex<HashMap<String, SpeedTracker>>,
    /// One lifecycle manager per driver uid.
    pub managers: Mutex<HashMap<String, TripManager<MemoryStore>>>,
}

impl AppState {
    pub fn new(route: Route, stops: Vec<Stop>) -> Self {
        Self {
            route,
            stops,
            feed: PositionFeed::new(),
            store: MemoryStore::new(),
            trackers: Mutex::new(HashMap::new()),
            managers: Mutex::new(HashMap::new()),
        }
    }

    pub fn stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.stop_id == stop_id)
    }
}
