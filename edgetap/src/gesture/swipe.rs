use edgetap_config::GestureKind;

use super::{RecognizerTuning, TouchEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn gesture(self) -> GestureKind {
        match self {
            SwipeDirection::Up => GestureKind::SwipeUp,
            SwipeDirection::Down => GestureKind::SwipeDown,
            SwipeDirection::Left => GestureKind::SwipeLeft,
            SwipeDirection::Right => GestureKind::SwipeRight,
        }
    }
}

/// Classify the motion between touch-down and lift.
///
/// The dominant axis is picked first (ties go vertical), then that axis
/// alone must clear its distance and velocity thresholds.
pub fn classify_swipe(
    down: &TouchEvent,
    up: &TouchEvent,
    tuning: &RecognizerTuning,
) -> Option<SwipeDirection> {
    let dx = up.x - down.x;
    let dy = up.y - down.y;
    let elapsed_ms = up.time_ms.saturating_sub(down.time_ms).max(1) as f32;
    let vx = dx / elapsed_ms * 1000.0;
    let vy = dy / elapsed_ms * 1000.0;

    if dx.abs() > dy.abs() {
        if dx.abs() > tuning.horizontal_swipe_px && vx.abs() > tuning.swipe_velocity_px_s {
            return Some(if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            });
        }
    } else if dy.abs() > tuning.vertical_swipe_px && vy.abs() > tuning.swipe_velocity_px_s {
        return Some(if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        });
    }
    None
}
