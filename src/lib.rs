pub mod eta;
pub mod feed;
pub mod route;
pub mod shared;
pub mod trip;

pub mod prelude {
    pub use crate::eta::{Eta, StopStatus};
    pub use crate::feed::{GpsFix, PositionFeed, VehiclePosition};
    pub use crate::route::{Progress, Route, RoutePosition, Stop};
    pub use crate::shared::geo::{Coordinate, Distance};
    pub use crate::shared::speed::SpeedTracker;
    pub use crate::trip::{Driver, MemoryStore, Trip, TripManager, TripStatus, TripStore};
}
