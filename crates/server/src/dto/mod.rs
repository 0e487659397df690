mod eta;
mod trip;

pub use eta::*;
pub use trip::*;
