use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::trip::{
    Trip,
    store::{self, TripStore},
};

/// Map-backed trip store. Serves as the default backend for the server
/// binary and as the store used throughout the tests. Cloning shares the
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trips: Arc<Mutex<HashMap<String, Trip>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Trip>> {
        // Lock poisoning only happens after a panic mid-write; the map holds
        // plain owned data, so continuing with it is sound.
        match self.trips.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TripStore for MemoryStore {
    async fn load(&self, trip_id: &str) -> Result<Option<Trip>, store::Error> {
        Ok(self.lock().get(trip_id).cloned())
    }

    async fn save(&self, trip_id: &str, trip: &Trip) -> Result<(), store::Error> {
        self.lock().insert(trip_id.to_string(), trip.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, Trip)>, store::Error> {
        Ok(self
            .lock()
            .iter()
            .map(|(id, trip)| (id.clone(), trip.clone()))
            .collect())
    }
}
