use std::rc::Rc;

use edgetap_config::{ActionKind, GestureKind, SegmentConfig};

use super::{classify_swipe, PressDetector, PressGesture, RecognizerTuning, SwipeDirection};
use super::{TouchEvent, TouchPhase};
use crate::effect::Effect;
use crate::platform::GlobalAction;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TrackState {
    Idle,
    Tracking,
    /// Current touch sequence was consumed by a triple tap.
    Consumed,
}

/// Per-surface gesture state machine.
///
/// Triple taps are counted on raw touch-downs ahead of the press detector,
/// so a third quick tap preempts double/single tap resolution.
#[derive(Debug)]
pub struct GestureRecognizer {
    segment: Rc<SegmentConfig>,
    index: usize,
    screen_width: u32,
    tuning: RecognizerTuning,
    press: PressDetector,
    state: TrackState,
    tap_count: u32,
    last_down_ms: Option<u64>,
}

impl GestureRecognizer {
    pub fn new(
        segment: Rc<SegmentConfig>,
        index: usize,
        screen_width: u32,
        tuning: RecognizerTuning,
    ) -> Self {
        Self {
            segment,
            index,
            screen_width,
            tuning,
            press: PressDetector::new(tuning),
            state: TrackState::Idle,
            tap_count: 0,
            last_down_ms: None,
        }
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    #[cfg(test)]
    pub fn is_tracking(&self) -> bool {
        self.state != TrackState::Idle
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.press.next_deadline()
    }

    pub fn on_touch(&mut self, event: &TouchEvent) -> Vec<Effect> {
        if event.phase == TouchPhase::Down {
            if let Some(effect) = self.count_tap(event.time_ms) {
                self.press.cancel();
                self.state = TrackState::Consumed;
                return vec![effect];
            }
            self.state = TrackState::Tracking;
        }

        if self.state == TrackState::Consumed {
            if matches!(event.phase, TouchPhase::Up | TouchPhase::Cancel) {
                self.state = TrackState::Idle;
            }
            return Vec::new();
        }

        let gestures = self.press.on_event(event);
        if matches!(event.phase, TouchPhase::Up | TouchPhase::Cancel) {
            self.state = TrackState::Idle;
        }
        self.resolve_all(gestures)
    }

    pub fn on_tick(&mut self, now_ms: u64) -> Vec<Effect> {
        let gestures = self.press.on_tick(now_ms);
        self.resolve_all(gestures)
    }

    fn count_tap(&mut self, now_ms: u64) -> Option<Effect> {
        let within_window = self
            .last_down_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.tuning.triple_tap_window_ms);
        self.tap_count = if within_window { self.tap_count.saturating_add(1) } else { 1 };
        self.last_down_ms = Some(now_ms);

        if self.tap_count == 3 {
            let action = self.segment.action_for(GestureKind::TripleTap);
            if !action.is_none() {
                tracing::debug!("Triple tap on segment {}", self.index);
                self.tap_count = 0;
                return Some(Effect::RunAction {
                    gesture: GestureKind::TripleTap,
                    action,
                });
            }
        }
        None
    }

    fn resolve_all(&self, gestures: Vec<PressGesture>) -> Vec<Effect> {
        gestures
            .into_iter()
            .filter_map(|g| self.resolve(g))
            .collect()
    }

    fn resolve(&self, gesture: PressGesture) -> Option<Effect> {
        match gesture {
            PressGesture::SingleTapConfirmed { x, y } => Some(Effect::PassThrough { x, y }),
            PressGesture::DoubleTap { .. } => self.bound(GestureKind::DoubleTap),
            PressGesture::LongPress { .. } => self.bound(GestureKind::LongPress),
            PressGesture::Fling { down, up } => {
                let direction = classify_swipe(&down, &up, &self.tuning)?;
                tracing::debug!("Swipe {:?} on segment {}", direction, self.index);
                match direction {
                    SwipeDirection::Down => self
                        .bound(GestureKind::SwipeDown)
                        .or_else(|| Some(self.swipe_down_fallback(down.x))),
                    other => self.bound(other.gesture()),
                }
            }
        }
    }

    fn bound(&self, gesture: GestureKind) -> Option<Effect> {
        let action = self.segment.action_for(gesture);
        (action != ActionKind::None).then_some(Effect::RunAction { gesture, action })
    }

    /// A full-width first strip behaves like the status bar: left half pulls
    /// notifications, right half quick settings.
    fn swipe_down_fallback(&self, touch_x: f32) -> Effect {
        let is_first = self.index == 0;
        let is_full_width = self.segment.width >= self.screen_width;
        let half = (self.screen_width / 2) as f32;

        let action = if is_first && is_full_width && touch_x >= half {
            GlobalAction::QuickSettings
        } else {
            GlobalAction::Notifications
        };
        tracing::debug!(
            "Swipe-down fallback: first={}, full_width={}, x={} -> {:?}",
            is_first,
            is_full_width,
            touch_x,
            action
        );
        Effect::GlobalFallback(action)
    }
}
