mod actions;
mod bubble;
mod pass_through;
mod reconcile;

pub use actions::{ActionExecutor, MIN_LOCK_SCREEN_VERSION};
pub use bubble::{Bubble, BUBBLE_ORIGIN, BUBBLE_SIZE};
pub use pass_through::{PassThroughDispatcher, SETTLE_DELAY_MS, TAP_DURATION_MS};
pub use reconcile::{destroy_all, reconcile, ReconcileContext};

use std::cell::RefCell;
use std::rc::Rc;

use edgetap_config::{OverlayConfig, SegmentConfig};

use crate::core::{LiveSurface, ScreenMetrics};
use crate::effect::Effect;
use crate::gesture::{RecognizerTuning, TouchEvent};
use crate::platform::{Platform, SurfaceId};
use crate::scheduler::Scheduler;
use crate::store::Preferences;

struct EngineState {
    /// Last applied config. `None` until the first `apply_config`.
    config: Option<OverlayConfig>,
    screen: ScreenMetrics,
    surfaces: Vec<LiveSurface>,
    bubble: Option<Bubble>,
}

struct EngineInner {
    platform: Platform,
    preferences: Preferences,
    tuning: RecognizerTuning,
    pass_through: PassThroughDispatcher,
    actions: ActionExecutor,
    state: RefCell<EngineState>,
}

/// The overlay engine. Owns the live surfaces and routes their touches.
///
/// Single-threaded: every method must be called on the thread that drives
/// the platform's scheduler.
pub struct OverlayEngine {
    inner: Rc<EngineInner>,
}

impl OverlayEngine {
    pub fn new(
        platform: Platform,
        preferences: Preferences,
        screen: ScreenMetrics,
        tuning: RecognizerTuning,
    ) -> Self {
        let pass_through = PassThroughDispatcher::new(
            platform.surfaces.clone(),
            platform.input.clone(),
            platform.scheduler.clone(),
        );
        let actions = ActionExecutor::new(
            platform.system.clone(),
            platform.input.clone(),
            platform.scheduler.clone(),
            preferences.clone(),
            screen,
        );
        let engine = Self {
            inner: Rc::new(EngineInner {
                platform,
                preferences,
                tuning,
                pass_through,
                actions,
                state: RefCell::new(EngineState {
                    config: None,
                    screen,
                    surfaces: Vec::new(),
                    bubble: None,
                }),
            }),
        };
        let bubble_enabled = engine.inner.preferences.bubble_enabled();
        engine.inner.sync_bubble(bubble_enabled);
        engine
    }

    /// Converge the overlay onto a new configuration.
    pub fn apply_config(&self, config: OverlayConfig) {
        tracing::info!(
            "Applying config: enabled={}, landscape={}, visible={}, {} segments",
            config.is_enabled,
            config.is_enabled_in_landscape,
            config.is_visible,
            config.segments.len()
        );
        let mut state = self.inner.state.borrow_mut();
        state.config = Some(config);
        self.inner.reconcile(&mut state);
    }

    pub fn on_orientation_changed(&self, screen: ScreenMetrics) {
        tracing::info!(
            "Screen now {}x{} ({:?})",
            screen.width,
            screen.height,
            screen.orientation()
        );
        self.inner.actions.set_screen(screen);
        let mut state = self.inner.state.borrow_mut();
        state.screen = screen;
        self.inner.reconcile(&mut state);
    }

    /// Deliver a touch event to the surface it landed on. Returns false if
    /// no live surface has that id.
    pub fn on_touch(&self, id: SurfaceId, event: &TouchEvent) -> bool {
        let inner = &self.inner;

        let bubble_tap = {
            let mut state = inner.state.borrow_mut();
            let tapped = match state.bubble.as_mut() {
                Some(bubble) if bubble.id() == id => {
                    Some(bubble.on_touch(inner.platform.surfaces.as_ref(), event))
                }
                _ => None,
            };
            tapped
        };
        if let Some(tapped) = bubble_tap {
            if tapped {
                tracing::info!("Bubble tapped");
                inner.actions.trigger_capture();
            }
            return true;
        }

        let (effects, segment) = {
            let mut state = inner.state.borrow_mut();
            let Some(surface) = state.surfaces.iter_mut().find(|s| s.id == id) else {
                tracing::debug!("Touch for unknown surface {}", id);
                return false;
            };
            let effects = surface.recognizer.on_touch(event);
            inner.arm_timer(surface);
            (effects, surface.segment.clone())
        };
        inner.run_effects(id, &segment, effects);
        true
    }

    pub fn set_bubble_enabled(&self, enabled: bool) {
        if let Err(e) = self.inner.preferences.set_bubble_enabled(enabled) {
            tracing::warn!("Failed to store bubble preference: {:#}", e);
        }
        self.inner.sync_bubble(enabled);
    }

    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.inner
            .state
            .borrow()
            .surfaces
            .iter()
            .map(|s| s.id)
            .collect()
    }

    pub fn bubble_id(&self) -> Option<SurfaceId> {
        self.inner.state.borrow().bubble.as_ref().map(Bubble::id)
    }

    #[cfg(test)]
    fn screen(&self) -> ScreenMetrics {
        self.inner.state.borrow().screen
    }

    /// Remove every surface. Pending pass-through restores and scroll swipes
    /// still run and find their surfaces gone.
    pub fn shutdown(&self) {
        let (surfaces, bubble) = {
            let mut state = self.inner.state.borrow_mut();
            (std::mem::take(&mut state.surfaces), state.bubble.take())
        };
        tracing::info!("Shutting down overlay ({} surfaces)", surfaces.len());
        let manager = self.inner.platform.surfaces.as_ref();
        destroy_all(surfaces, manager);
        if let Some(bubble) = bubble {
            bubble.hide(manager);
        }
    }
}

impl EngineInner {
    fn reconcile(&self, state: &mut EngineState) {
        let Some(config) = &state.config else {
            return;
        };
        let ctx = ReconcileContext {
            surfaces: self.platform.surfaces.as_ref(),
            screen: state.screen,
            tuning: self.tuning,
        };
        let previous = std::mem::take(&mut state.surfaces);
        state.surfaces = reconcile(previous, config, &ctx);
        tracing::debug!("{} surfaces live", state.surfaces.len());
    }

    fn sync_bubble(&self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        let manager = self.platform.surfaces.as_ref();
        match (enabled, state.bubble.is_some()) {
            (true, false) => match Bubble::show(manager) {
                Ok(bubble) => state.bubble = Some(bubble),
                Err(e) => tracing::warn!("Failed to show bubble: {}", e),
            },
            (false, true) => {
                if let Some(bubble) = state.bubble.take() {
                    bubble.hide(manager);
                }
            }
            _ => {}
        }
    }

    /// Schedule the recognizer's next timeout unless that exact deadline is
    /// already scheduled. Superseded timers find a different deadline armed
    /// and do nothing.
    fn arm_timer(self: &Rc<Self>, surface: &mut LiveSurface) {
        let Some(deadline) = surface.recognizer.next_deadline() else {
            return;
        };
        if surface.timer_armed_at == Some(deadline) {
            return;
        }
        surface.timer_armed_at = Some(deadline);

        let scheduler = &self.platform.scheduler;
        let delay = deadline.saturating_sub(scheduler.now_ms());
        let weak = Rc::downgrade(self);
        let id = surface.id;
        scheduler.post_delayed(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_timer(id, deadline);
                }
            }),
        );
    }

    fn on_timer(self: &Rc<Self>, id: SurfaceId, deadline: u64) {
        let now = self.platform.scheduler.now_ms().max(deadline);
        let (effects, segment) = {
            let mut state = self.state.borrow_mut();
            let Some(surface) = state.surfaces.iter_mut().find(|s| s.id == id) else {
                return;
            };
            if surface.timer_armed_at != Some(deadline) {
                return;
            }
            surface.timer_armed_at = None;
            let effects = surface.recognizer.on_tick(now);
            self.arm_timer(surface);
            (effects, surface.segment.clone())
        };
        self.run_effects(id, &segment, effects);
    }

    fn run_effects(&self, id: SurfaceId, segment: &SegmentConfig, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PassThrough { x, y } => self.pass_through.forward_tap(id, x, y),
                Effect::RunAction { gesture, action } => {
                    tracing::info!("{} on surface {} -> {}", gesture, id, action);
                    self.actions.execute(action, segment);
                }
                Effect::GlobalFallback(action) => self.actions.fallback(action),
            }
        }
    }
}
