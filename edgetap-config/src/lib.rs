pub mod gesture;
pub mod overlay;

pub use gesture::{ActionKind, GestureKind};
pub use overlay::{OverlayConfig, SegmentConfig};
