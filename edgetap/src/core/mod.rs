mod geometry;
mod orientation;
mod surface;

pub use geometry::*;
pub use orientation::*;
pub use surface::*;
