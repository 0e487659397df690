mod eta;
mod positions;
mod trips;

pub use eta::*;
pub use positions::*;
pub use trips::*;
