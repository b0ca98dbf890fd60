mod press;
mod recognizer;
mod swipe;

pub use press::{PressDetector, PressGesture};
pub use recognizer::GestureRecognizer;
pub use swipe::{classify_swipe, SwipeDirection};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw touch sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
    pub time_ms: u64,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f32, y: f32, time_ms: u64) -> Self {
        Self {
            phase,
            x,
            y,
            time_ms,
        }
    }

    pub fn down(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Down, x, y, time_ms)
    }

    pub fn moved(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Move, x, y, time_ms)
    }

    pub fn up(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Up, x, y, time_ms)
    }

    pub fn cancel(time_ms: u64) -> Self {
        Self::new(TouchPhase::Cancel, 0.0, 0.0, time_ms)
    }

    fn distance_sq(&self, other: &TouchEvent) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognizerTuning {
    /// Max gap between consecutive touch-downs counted toward a triple tap.
    pub triple_tap_window_ms: u64,
    pub double_tap_timeout_ms: u64,
    pub double_tap_min_time_ms: u64,
    pub long_press_timeout_ms: u64,
    pub touch_slop_px: f32,
    pub double_tap_slop_px: f32,
    pub horizontal_swipe_px: f32,
    pub vertical_swipe_px: f32,
    pub swipe_velocity_px_s: f32,
}

impl Default for RecognizerTuning {
    fn default() -> Self {
        Self {
            triple_tap_window_ms: 400,
            double_tap_timeout_ms: 300,
            double_tap_min_time_ms: 40,
            long_press_timeout_ms: 400,
            touch_slop_px: 24.0,
            double_tap_slop_px: 300.0,
            horizontal_swipe_px: 100.0,
            // Lower than horizontal so short strips still register swipes.
            vertical_swipe_px: 50.0,
            swipe_velocity_px_s: 100.0,
        }
    }
}
