use std::rc::Rc;

use edgetap_config::SegmentConfig;

use super::{Color, Rect};
use crate::gesture::GestureRecognizer;
use crate::platform::SurfaceId;

/// The on-screen representative of one configured segment.
pub struct LiveSurface {
    pub id: SurfaceId,
    /// Position of the bound segment in the config's segment list.
    pub index: usize,
    pub frame: Rect,
    pub color: Color,
    pub segment: Rc<SegmentConfig>,
    pub recognizer: GestureRecognizer,
    /// Deadline of the recognizer timer currently scheduled, if any.
    pub timer_armed_at: Option<u64>,
}

impl LiveSurface {
    /// Swap in a new segment binding with fresh gesture state.
    pub fn rebind(&mut self, segment: Rc<SegmentConfig>, recognizer: GestureRecognizer) {
        self.segment = segment;
        self.recognizer = recognizer;
        self.timer_armed_at = None;
    }
}

impl std::fmt::Debug for LiveSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSurface")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("frame", &self.frame)
            .field("color", &self.color)
            .finish()
    }
}
