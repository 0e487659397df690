use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::TripStore;

/// Trips older than this are never restored, no matter what their status
/// claims. A shift never spans this long.
const RESTORE_WINDOW_MS: i64 = 12 * 60 * 60 * 1000;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Driver has no assigned bus")]
    NoBusAssigned,
    #[error(transparent)]
    Store(#[from] store::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Active,
    Paused,
    Completed,
}

/// One operational run of a bus along its route. Stored as a whole record
/// under a timestamp-derived id; `end_time` is only ever set on completion,
/// which makes it the reliable "this trip is over" marker during restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub bus_id: String,
    pub driver_id: String,
    pub driver_name: String,
    pub start_time: i64,
    pub status: TripStatus,
    pub last_update: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// Driver profile as handed over by the identity collaborator. Passed in
/// explicitly; the manager never reads ambient session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Driver {
    pub uid: String,
    pub role: String,
    pub assigned_bus: Option<String>,
    pub display_name: Option<String>,
}

/// Outcome of a successful trip restore. `resume_gps` tells the caller
/// whether position reporting should pick up again right away: it does for
/// a trip that was active, not for one the driver had paused.
#[derive(Debug, Clone)]
pub struct RestoredTrip {
    pub trip_id: String,
    pub trip: Trip,
    pub resume_gps: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TripStats {
    pub duration_ms: i64,
    pub start_time: i64,
    pub status: TripStatus,
}

impl TripStats {
    pub fn duration_display(&self) -> String {
        let minutes = self.duration_ms / 60_000;
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// State machine over a driver's persisted trip record:
/// `none → active ⇄ paused → completed`, with completed terminal.
///
/// One manager per driver client. Status changes go through a
/// read-modify-write of the whole record; that is not atomic against
/// concurrent writers, and deliberately so: each trip has exactly one
/// legitimate writer. Multi-writer support would need a revision field and
/// conditional updates at the store.
pub struct TripManager<S: TripStore> {
    store: S,
    driver: Driver,
    current_trip_id: Option<String>,
    tracking: bool,
}

impl<S: TripStore> TripManager<S> {
    pub fn new(store: S, driver: Driver) -> Self {
        Self {
            store,
            driver,
            current_trip_id: None,
            tracking: false,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn current_trip_id(&self) -> Option<&str> {
        self.current_trip_id.as_deref()
    }

    /// Creates a fresh active trip for this driver and starts tracking.
    /// Fails up front without an assigned bus, leaving no current trip
    /// behind.
    pub async fn start_trip(&mut self) -> Result<String, self::Error> {
        let Some(bus_id) = self.driver.assigned_bus.clone() else {
            return Err(self::Error::NoBusAssigned);
        };

        let now = Utc::now().timestamp_millis();
        let trip_id = format!("trip_{now}");
        let trip = Trip {
            bus_id,
            driver_id: self.driver.uid.clone(),
            driver_name: self
                .driver
                .display_name
                .clone()
                .unwrap_or_else(|| "Driver".to_string()),
            start_time: now,
            status: TripStatus::Active,
            last_update: now,
            paused_at: None,
            resumed_at: None,
            end_time: None,
        };
        self.store.save(&trip_id, &trip).await?;

        self.current_trip_id = Some(trip_id.clone());
        self.tracking = true;
        debug!("Started trip {trip_id}");
        Ok(trip_id)
    }

    /// Merges a new status into the stored record. No-op without a current
    /// trip or when the record has vanished from the store.
    pub async fn update_status(&mut self, status: TripStatus) -> Result<(), self::Error> {
        let Some(trip_id) = self.current_trip_id.clone() else {
            return Ok(());
        };

        let Some(mut trip) = self.store.load(&trip_id).await? else {
            return Ok(());
        };

        let now = Utc::now().timestamp_millis();
        trip.status = status;
        trip.last_update = now;
        match status {
            TripStatus::Completed => trip.end_time = Some(now),
            TripStatus::Paused => trip.paused_at = Some(now),
            TripStatus::Active => {
                // Only a resume after a pause gets stamped; the initial
                // activation happens in start_trip.
                if trip.paused_at.is_some() {
                    trip.resumed_at = Some(now);
                }
            }
        }

        self.store.save(&trip_id, &trip).await?;
        Ok(())
    }

    pub async fn pause_trip(&mut self) -> Result<(), self::Error> {
        if self.current_trip_id.is_none() {
            return Ok(());
        }
        self.update_status(TripStatus::Paused).await?;
        self.tracking = false;
        Ok(())
    }

    pub async fn resume_trip(&mut self) -> Result<(), self::Error> {
        if self.current_trip_id.is_none() {
            return Ok(());
        }
        self.update_status(TripStatus::Active).await?;
        self.tracking = true;
        Ok(())
    }

    /// Completes the current trip and forgets its id; a completed trip is
    /// terminal and can never be re-entered through this manager.
    pub async fn end_trip(&mut self) -> Result<Option<String>, self::Error> {
        if self.current_trip_id.is_none() {
            return Ok(None);
        }
        self.update_status(TripStatus::Completed).await?;
        self.tracking = false;
        Ok(self.current_trip_id.take())
    }

    /// Rejoins an in-progress trip after a reload or crash.
    ///
    /// Only trips owned by this driver, still active or paused, started
    /// within the last 12 hours and without an `end_time` qualify; among
    /// those the newest `start_time` wins. Store failures are logged and
    /// treated as "nothing to restore" rather than bubbled up: coming back
    /// in a clean empty state beats crashing the client mid-shift.
    pub async fn restore_active_trip(&mut self) -> Option<RestoredTrip> {
        if self.driver.assigned_bus.is_none() {
            debug!("No bus assigned to driver, nothing to restore");
            return None;
        }

        let trips = match self.store.list().await {
            Ok(trips) => trips,
            Err(err) => {
                warn!("Could not restore trip state: {err}");
                return None;
            }
        };

        let now = Utc::now().timestamp_millis();
        let cutoff = now - RESTORE_WINDOW_MS;

        let mut best: Option<(String, Trip)> = None;
        for (trip_id, trip) in trips {
            let mine = trip.driver_id == self.driver.uid;
            let restorable = matches!(trip.status, TripStatus::Active | TripStatus::Paused);
            let recent = trip.start_time > cutoff;
            let unfinished = trip.end_time.is_none();
            let newer = best
                .as_ref()
                .is_none_or(|(_, current)| trip.start_time > current.start_time);

            if mine && restorable && recent && unfinished && newer {
                best = Some((trip_id, trip));
            }
        }

        let Some((trip_id, trip)) = best else {
            debug!("No recent active trips found to restore");
            return None;
        };

        self.current_trip_id = Some(trip_id.clone());
        self.tracking = trip.status == TripStatus::Active;

        let age_minutes = (now - trip.start_time) / 60_000;
        debug!(
            "Restored trip {trip_id} from {age_minutes} minutes ago, status {:?}",
            trip.status
        );

        let resume_gps = trip.status == TripStatus::Active;
        Some(RestoredTrip {
            trip_id,
            trip,
            resume_gps,
        })
    }

    pub async fn current_trip(&self) -> Result<Option<Trip>, self::Error> {
        let Some(trip_id) = &self.current_trip_id else {
            return Ok(None);
        };
        Ok(self.store.load(trip_id).await?)
    }

    pub async fn stats(&self) -> Result<Option<TripStats>, self::Error> {
        let Some(trip) = self.current_trip().await? else {
            return Ok(None);
        };
        let now = Utc::now().timestamp_millis();
        Ok(Some(TripStats {
            duration_ms: now - trip.start_time,
            start_time: trip.start_time,
            status: trip.status,
        }))
    }
}
