use std::future::Future;

use thiserror::Error;

use crate::trip::Trip;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Trip store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for trip records.
///
/// Records are written whole, never patched field by field, which is why the
/// manager does a read-modify-write on every status change. That is safe
/// under the single-writer convention: only the assigned driver's client
/// ever writes a given trip.
pub trait TripStore: Send + Sync {
    /// Reads one trip record, `None` when the id is unknown.
    fn load(&self, trip_id: &str) -> impl Future<Output = Result<Option<Trip>, Error>> + Send;

    /// Replaces the record stored under `trip_id`.
    fn save(&self, trip_id: &str, trip: &Trip) -> impl Future<Output = Result<(), Error>> + Send;

    /// All trip records with their ids, in no particular order.
    fn list(&self) -> impl Future<Output = Result<Vec<(String, Trip)>, Error>> + Send;
}
