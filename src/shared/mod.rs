pub mod geo;
pub mod speed;

pub use geo::*;
pub use speed::*;
