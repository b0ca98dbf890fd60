use super::{RecognizerTuning, TouchEvent, TouchPhase};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressGesture {
    /// A tap that was not followed by a second one in time.
    SingleTapConfirmed { x: f32, y: f32 },
    DoubleTap { x: f32, y: f32 },
    LongPress { x: f32, y: f32 },
    /// The pointer left the tap region and lifted.
    Fling { down: TouchEvent, up: TouchEvent },
}

/// Press-gesture detector: single tap confirmation, double tap, long press
/// and fling, driven by touch events plus `on_tick` for its two timeouts.
#[derive(Debug)]
pub struct PressDetector {
    tuning: RecognizerTuning,
    current_down: Option<TouchEvent>,
    previous_down: Option<TouchEvent>,
    previous_up: Option<TouchEvent>,
    still_down: bool,
    in_long_press: bool,
    is_double_tapping: bool,
    always_in_tap_region: bool,
    defer_confirm_single_tap: bool,
    tap_deadline: Option<u64>,
    long_press_deadline: Option<u64>,
}

impl PressDetector {
    pub fn new(tuning: RecognizerTuning) -> Self {
        Self {
            tuning,
            current_down: None,
            previous_down: None,
            previous_up: None,
            still_down: false,
            in_long_press: false,
            is_double_tapping: false,
            always_in_tap_region: false,
            defer_confirm_single_tap: false,
            tap_deadline: None,
            long_press_deadline: None,
        }
    }

    pub fn on_event(&mut self, event: &TouchEvent) -> Vec<PressGesture> {
        match event.phase {
            TouchPhase::Down => self.on_down(event),
            TouchPhase::Move => {
                self.on_move(event);
                Vec::new()
            }
            TouchPhase::Up => self.on_up(event),
            TouchPhase::Cancel => {
                self.cancel();
                Vec::new()
            }
        }
    }

    /// Earliest pending timeout.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.tap_deadline, self.long_press_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every timeout that is due at `now_ms`, earliest first.
    pub fn on_tick(&mut self, now_ms: u64) -> Vec<PressGesture> {
        let mut out = Vec::new();
        loop {
            let tap_due = self.tap_deadline.filter(|d| *d <= now_ms);
            let long_due = self.long_press_deadline.filter(|d| *d <= now_ms);
            match (tap_due, long_due) {
                (Some(tap), Some(long)) if tap <= long => self.fire_tap_timeout(&mut out),
                (_, Some(_)) => self.fire_long_press(&mut out),
                (Some(_), None) => self.fire_tap_timeout(&mut out),
                (None, None) => break,
            }
        }
        out
    }

    /// Drop the in-progress sequence. No gesture fires for it afterwards.
    pub fn cancel(&mut self) {
        self.tap_deadline = None;
        self.long_press_deadline = None;
        self.still_down = false;
        self.is_double_tapping = false;
        self.in_long_press = false;
        self.always_in_tap_region = false;
        self.defer_confirm_single_tap = false;
    }

    fn on_down(&mut self, event: &TouchEvent) -> Vec<PressGesture> {
        let mut out = Vec::new();
        let had_tap_pending = self.tap_deadline.take().is_some();

        let is_double = had_tap_pending
            && match (&self.current_down, &self.previous_up) {
                (Some(first_down), Some(first_up)) => {
                    self.is_considered_double_tap(first_down, first_up, event)
                }
                _ => false,
            };

        if is_double {
            self.is_double_tapping = true;
            out.push(PressGesture::DoubleTap {
                x: event.x,
                y: event.y,
            });
        } else {
            self.tap_deadline = Some(
                event
                    .time_ms
                    .saturating_add(self.tuning.double_tap_timeout_ms),
            );
        }

        self.previous_down = self.current_down.take();
        self.current_down = Some(*event);
        self.always_in_tap_region = true;
        self.still_down = true;
        self.in_long_press = false;
        self.defer_confirm_single_tap = false;
        self.long_press_deadline = Some(
            event
                .time_ms
                .saturating_add(self.tuning.long_press_timeout_ms),
        );

        out
    }

    fn on_move(&mut self, event: &TouchEvent) {
        if self.in_long_press || self.is_double_tapping || !self.always_in_tap_region {
            return;
        }
        let Some(down) = &self.current_down else {
            return;
        };
        let slop = self.tuning.touch_slop_px;
        if event.distance_sq(down) > slop * slop {
            self.always_in_tap_region = false;
            self.tap_deadline = None;
            self.long_press_deadline = None;
        }
    }

    fn on_up(&mut self, event: &TouchEvent) -> Vec<PressGesture> {
        let mut out = Vec::new();
        self.still_down = false;

        // A lift past the slop counts even without intermediate moves.
        if self.always_in_tap_region && !self.is_double_tapping && !self.in_long_press {
            self.on_move(event);
        }

        if self.is_double_tapping {
            // Consumed by the double tap on touch-down.
        } else if self.in_long_press {
            self.tap_deadline = None;
            self.in_long_press = false;
        } else if self.always_in_tap_region {
            if self.defer_confirm_single_tap {
                if let Some(down) = &self.current_down {
                    out.push(PressGesture::SingleTapConfirmed {
                        x: down.x,
                        y: down.y,
                    });
                }
            }
        } else if let Some(down) = self.current_down {
            out.push(PressGesture::Fling { down, up: *event });
        }

        self.previous_up = Some(*event);
        self.is_double_tapping = false;
        self.defer_confirm_single_tap = false;
        self.long_press_deadline = None;
        out
    }

    fn is_considered_double_tap(
        &self,
        first_down: &TouchEvent,
        first_up: &TouchEvent,
        second_down: &TouchEvent,
    ) -> bool {
        // The first tap must itself have stayed a tap.
        if !self.always_in_tap_region {
            return false;
        }
        let delta = second_down.time_ms.saturating_sub(first_up.time_ms);
        if delta > self.tuning.double_tap_timeout_ms || delta < self.tuning.double_tap_min_time_ms {
            return false;
        }
        let slop = self.tuning.double_tap_slop_px;
        first_down.distance_sq(second_down) < slop * slop
    }

    fn fire_tap_timeout(&mut self, out: &mut Vec<PressGesture>) {
        self.tap_deadline = None;
        if self.still_down {
            self.defer_confirm_single_tap = true;
        } else if let Some(down) = &self.current_down {
            out.push(PressGesture::SingleTapConfirmed {
                x: down.x,
                y: down.y,
            });
        }
    }

    fn fire_long_press(&mut self, out: &mut Vec<PressGesture>) {
        self.long_press_deadline = None;
        self.tap_deadline = None;
        self.defer_confirm_single_tap = false;
        self.in_long_press = true;
        if let Some(down) = &self.current_down {
            out.push(PressGesture::LongPress {
                x: down.x,
                y: down.y,
            });
        }
    }
}
