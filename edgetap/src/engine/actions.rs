use std::cell::Cell;
use std::rc::Rc;

use edgetap_config::{ActionKind, SegmentConfig};

use crate::core::ScreenMetrics;
use crate::platform::{
    GlobalAction, HapticKind, InputInjector, KeyAction, MediaKey, SystemEffector,
};
use crate::scheduler::Scheduler;
use crate::store::{CaptureMode, Preferences};

/// Lock screen and screen off need this platform version or newer.
pub const MIN_LOCK_SCREEN_VERSION: u32 = 28;

const SCROLL_SWIPES: u64 = 3;
const SCROLL_SWIPE_MS: u64 = 200;
const SCROLL_INTERVAL_MS: u64 = 250;
const SCROLL_NEAR: f32 = 0.3;
const SCROLL_FAR: f32 = 0.7;

/// Runs resolved actions through the system effectors.
pub struct ActionExecutor {
    system: Rc<dyn SystemEffector>,
    input: Rc<dyn InputInjector>,
    scheduler: Rc<dyn Scheduler>,
    preferences: Preferences,
    screen: Cell<ScreenMetrics>,
    /// Last torch state this executor set. Cannot be queried back from the
    /// platform, so it drifts if something else toggles the torch.
    torch_on: Cell<bool>,
}

impl ActionExecutor {
    pub fn new(
        system: Rc<dyn SystemEffector>,
        input: Rc<dyn InputInjector>,
        scheduler: Rc<dyn Scheduler>,
        preferences: Preferences,
        screen: ScreenMetrics,
    ) -> Self {
        Self {
            system,
            input,
            scheduler,
            preferences,
            screen: Cell::new(screen),
            torch_on: Cell::new(false),
        }
    }

    pub fn set_screen(&self, screen: ScreenMetrics) {
        self.screen.set(screen);
    }

    pub fn torch_on(&self) -> bool {
        self.torch_on.get()
    }

    pub fn execute(&self, action: ActionKind, segment: &SegmentConfig) {
        if action.is_none() {
            return;
        }
        self.system.pulse(HapticKind::Click);
        tracing::info!("Executing {}", action.as_str());

        match action {
            ActionKind::None => {}
            ActionKind::Screenshot => self.global(GlobalAction::TakeScreenshot),
            ActionKind::Home => self.global(GlobalAction::Home),
            ActionKind::Back => self.global(GlobalAction::Back),
            ActionKind::Recents => self.global(GlobalAction::Recents),
            ActionKind::OpenNotifications => self.global(GlobalAction::Notifications),
            ActionKind::OpenQuickSettings => self.global(GlobalAction::QuickSettings),
            ActionKind::LockScreen => self.lock_screen("Lock Screen"),
            ActionKind::ScreenOff => self.lock_screen("Screen Off"),
            ActionKind::SplitScreen => {
                if !self
                    .system
                    .perform_global_action(GlobalAction::ToggleSplitScreen)
                {
                    self.system
                        .show_notice("Split Screen not supported or failed");
                }
            }
            ActionKind::Flashlight => self.toggle_torch(),
            ActionKind::OpenApp => self.open_app(segment),
            ActionKind::CtsLens => self.capture(CaptureMode::LensOnly),
            ActionKind::CtsMulti => self.capture(CaptureMode::MultiEngine),
            ActionKind::ScrollTop => self.scroll(true),
            ActionKind::ScrollBottom => self.scroll(false),
            ActionKind::ToggleAutoRotate => self.toggle_auto_rotate(),
            ActionKind::MediaPlayPause => self.media_key(MediaKey::PlayPause),
            ActionKind::MediaNext => self.media_key(MediaKey::Next),
            ActionKind::MediaPrevious => self.media_key(MediaKey::Previous),
        }
    }

    /// Fallback global action for an unbound gesture. No haptic.
    pub fn fallback(&self, action: GlobalAction) {
        tracing::info!("Fallback {:?}", action);
        self.global(action);
    }

    /// Capture with whatever mode is currently stored.
    pub fn trigger_capture(&self) {
        self.system.trigger_capture();
    }

    fn global(&self, action: GlobalAction) {
        if !self.system.perform_global_action(action) {
            tracing::warn!("Global action {:?} failed", action);
        }
    }

    fn lock_screen(&self, label: &str) {
        let version = self.system.platform_version();
        if version >= MIN_LOCK_SCREEN_VERSION {
            self.global(GlobalAction::LockScreen);
        } else {
            tracing::info!("{} unavailable on platform version {}", label, version);
            self.system
                .show_notice(&format!("{} requires Android 9+", label));
        }
    }

    fn toggle_torch(&self) {
        let next = !self.torch_on.get();
        match self.system.set_torch(next) {
            Ok(()) => self.torch_on.set(next),
            Err(e) => tracing::warn!("Failed to switch torch {}: {}", on_off(next), e),
        }
    }

    fn open_app(&self, segment: &SegmentConfig) {
        let app_id = segment
            .gesture_for_action(ActionKind::OpenApp)
            .and_then(|gesture| segment.gesture_data.get(&gesture))
            .filter(|id| !id.is_empty());
        let Some(app_id) = app_id else {
            tracing::debug!("OPEN_APP bound without an app id");
            return;
        };
        if !self.system.launch_app(app_id) {
            tracing::warn!("App {} is not launchable", app_id);
        }
    }

    fn capture(&self, mode: CaptureMode) {
        if let Err(e) = self.preferences.set_capture_mode(mode) {
            tracing::warn!("Failed to store capture mode {:?}: {:#}", mode, e);
        }
        self.system.trigger_capture();
    }

    /// Three short swipes instead of one long fling, spaced out on the
    /// scheduler. They are not cancelled by later config changes.
    fn scroll(&self, to_top: bool) {
        let screen = self.screen.get();
        let x = screen.width as f32 / 2.0;
        let near = screen.height as f32 * SCROLL_NEAR;
        let far = screen.height as f32 * SCROLL_FAR;
        // Scrolling to the top drags content down.
        let path = if to_top {
            vec![(x, near), (x, far)]
        } else {
            vec![(x, far), (x, near)]
        };

        for i in 0..SCROLL_SWIPES {
            let input = self.input.clone();
            let path = path.clone();
            self.scheduler.post_delayed(
                i * SCROLL_INTERVAL_MS,
                Box::new(move || {
                    input.dispatch_swipe(
                        &path,
                        SCROLL_SWIPE_MS,
                        Box::new(move |outcome| {
                            tracing::debug!("Scroll swipe #{} finished: {:?}", i + 1, outcome)
                        }),
                    );
                }),
            );
        }
    }

    fn toggle_auto_rotate(&self) {
        if !self.system.can_write_system_settings() {
            self.system.show_notice("Permission required for Auto Rotate");
            self.system.request_write_settings_permission();
            return;
        }
        let result = self
            .system
            .auto_rotate_enabled()
            .and_then(|current| self.system.set_auto_rotate(!current).map(|()| !current));
        match result {
            Ok(enabled) => self
                .system
                .show_notice(&format!("Auto Rotate: {}", on_off(enabled).to_uppercase())),
            Err(e) => tracing::warn!("Failed to toggle auto-rotate: {}", e),
        }
    }

    fn media_key(&self, key: MediaKey) {
        self.system.dispatch_media_key(key, KeyAction::Down);
        self.system.dispatch_media_key(key, KeyAction::Up);
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{InputCall, MockRig, SystemCall};
    use crate::store::MemoryStore;
    use edgetap_config::GestureKind;

    struct Fixture {
        rig: MockRig,
        prefs: Preferences,
        executor: ActionExecutor,
    }

    fn fixture() -> Fixture {
        let rig = MockRig::new();
        let prefs = Preferences::new(Rc::new(MemoryStore::new()));
        let executor = ActionExecutor::new(
            rig.system.clone(),
            rig.input.clone(),
            rig.scheduler.clone(),
            prefs.clone(),
            ScreenMetrics::new(1000, 2000),
        );
        Fixture {
            rig,
            prefs,
            executor,
        }
    }

    fn plain_segment() -> SegmentConfig {
        SegmentConfig::default()
    }

    #[test]
    fn test_none_is_a_no_op() {
        let f = fixture();
        f.executor.execute(ActionKind::None, &plain_segment());
        assert!(f.rig.system.calls().is_empty());
    }

    #[test]
    fn test_every_action_pulses_first() {
        let f = fixture();
        for action in ActionKind::ALL.into_iter().filter(|a| !a.is_none()) {
            f.rig.system.clear_calls();
            f.executor.execute(action, &plain_segment());
            assert_eq!(
                f.rig.system.calls().first(),
                Some(&SystemCall::Pulse(HapticKind::Click)),
                "{} did not pulse first",
                action
            );
        }
    }

    #[test]
    fn test_global_actions() {
        let f = fixture();
        let cases = [
            (ActionKind::Screenshot, GlobalAction::TakeScreenshot),
            (ActionKind::Home, GlobalAction::Home),
            (ActionKind::Back, GlobalAction::Back),
            (ActionKind::Recents, GlobalAction::Recents),
            (ActionKind::OpenNotifications, GlobalAction::Notifications),
            (ActionKind::OpenQuickSettings, GlobalAction::QuickSettings),
            (ActionKind::LockScreen, GlobalAction::LockScreen),
            (ActionKind::ScreenOff, GlobalAction::LockScreen),
        ];
        for (action, expected) in cases {
            f.rig.system.clear_calls();
            f.executor.execute(action, &plain_segment());
            assert_eq!(f.rig.system.effects(), vec![SystemCall::Global(expected)]);
        }
    }

    #[test]
    fn test_lock_screen_on_old_platform_shows_notice() {
        let f = fixture();
        f.rig.system.platform_version.set(27);
        f.executor.execute(ActionKind::LockScreen, &plain_segment());
        f.executor.execute(ActionKind::ScreenOff, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![
                SystemCall::Notice("Lock Screen requires Android 9+".into()),
                SystemCall::Notice("Screen Off requires Android 9+".into()),
            ]
        );
    }

    #[test]
    fn test_split_screen_failure_shows_notice() {
        let f = fixture();
        f.executor.execute(ActionKind::SplitScreen, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![SystemCall::Global(GlobalAction::ToggleSplitScreen)]
        );

        f.rig.system.clear_calls();
        f.rig.system.global_result.set(false);
        f.executor.execute(ActionKind::SplitScreen, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![
                SystemCall::Global(GlobalAction::ToggleSplitScreen),
                SystemCall::Notice("Split Screen not supported or failed".into()),
            ]
        );
    }

    #[test]
    fn test_flashlight_toggles_tracked_state() {
        let f = fixture();
        f.executor.execute(ActionKind::Flashlight, &plain_segment());
        assert!(f.executor.torch_on());
        f.executor.execute(ActionKind::Flashlight, &plain_segment());
        assert!(!f.executor.torch_on());
        assert_eq!(
            f.rig.system.effects(),
            vec![SystemCall::Torch(true), SystemCall::Torch(false)]
        );
    }

    #[test]
    fn test_flashlight_failure_keeps_state() {
        let f = fixture();
        f.rig.system.torch_fails.set(true);
        f.executor.execute(ActionKind::Flashlight, &plain_segment());
        assert!(!f.executor.torch_on());
        f.executor.execute(ActionKind::Flashlight, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![SystemCall::Torch(true), SystemCall::Torch(true)]
        );
    }

    #[test]
    fn test_open_app_uses_data_of_bound_gesture() {
        let f = fixture();
        let segment = plain_segment()
            .with_binding(GestureKind::LongPress, ActionKind::OpenApp)
            .with_data(GestureKind::LongPress, "com.example.app")
            .with_data(GestureKind::DoubleTap, "com.example.other");
        f.executor.execute(ActionKind::OpenApp, &segment);
        assert_eq!(
            f.rig.system.effects(),
            vec![SystemCall::Launch("com.example.app".into())]
        );
    }

    #[test]
    fn test_open_app_without_data_is_a_no_op() {
        let f = fixture();
        let segment = plain_segment().with_binding(GestureKind::LongPress, ActionKind::OpenApp);
        f.executor.execute(ActionKind::OpenApp, &segment);

        let segment = segment.with_data(GestureKind::LongPress, "");
        f.executor.execute(ActionKind::OpenApp, &segment);
        assert!(f.rig.system.effects().is_empty());
    }

    #[test]
    fn test_capture_modes_set_preference_then_capture() {
        let f = fixture();
        f.executor.execute(ActionKind::CtsLens, &plain_segment());
        assert_eq!(f.prefs.capture_mode(), CaptureMode::LensOnly);
        assert_eq!(f.rig.system.effects(), vec![SystemCall::Capture]);

        f.executor.execute(ActionKind::CtsMulti, &plain_segment());
        assert_eq!(f.prefs.capture_mode(), CaptureMode::MultiEngine);
        assert_eq!(f.rig.system.count(&SystemCall::Capture), 2);
    }

    #[test]
    fn test_scroll_top_dispatches_three_spaced_swipes() {
        let f = fixture();
        f.executor.execute(ActionKind::ScrollTop, &plain_segment());

        // First swipe goes out on the next scheduler turn.
        assert!(f.rig.input.calls().is_empty());
        f.rig.scheduler.advance(0);
        assert_eq!(f.rig.input.calls().len(), 1);
        f.rig.scheduler.advance(249);
        assert_eq!(f.rig.input.calls().len(), 1);
        f.rig.scheduler.advance(1);
        assert_eq!(f.rig.input.calls().len(), 2);
        f.rig.scheduler.advance(250);

        let expected = InputCall::Swipe {
            path: vec![(500.0, 600.0), (500.0, 1400.0)],
            duration_ms: 200,
        };
        assert_eq!(f.rig.input.calls(), vec![expected; 3]);
    }

    #[test]
    fn test_scroll_bottom_swipes_upward() {
        let f = fixture();
        f.executor.set_screen(ScreenMetrics::new(2000, 1000));
        f.executor.execute(ActionKind::ScrollBottom, &plain_segment());
        f.rig.scheduler.advance(1000);

        let calls = f.rig.input.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            InputCall::Swipe {
                path: vec![(1000.0, 700.0), (1000.0, 300.0)],
                duration_ms: 200,
            }
        );
    }

    #[test]
    fn test_auto_rotate_flips_setting() {
        let f = fixture();
        f.executor.execute(ActionKind::ToggleAutoRotate, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![
                SystemCall::SetAutoRotate(false),
                SystemCall::Notice("Auto Rotate: OFF".into()),
            ]
        );
        assert!(!f.rig.system.auto_rotate.get());
    }

    #[test]
    fn test_auto_rotate_without_permission_requests_it() {
        let f = fixture();
        f.rig.system.can_write_settings.set(false);
        f.executor.execute(ActionKind::ToggleAutoRotate, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![
                SystemCall::Notice("Permission required for Auto Rotate".into()),
                SystemCall::RequestWritePermission,
            ]
        );
        assert!(f.rig.system.auto_rotate.get());
    }

    #[test]
    fn test_media_keys_send_down_then_up() {
        let f = fixture();
        f.executor.execute(ActionKind::MediaNext, &plain_segment());
        assert_eq!(
            f.rig.system.effects(),
            vec![
                SystemCall::MediaKey(MediaKey::Next, KeyAction::Down),
                SystemCall::MediaKey(MediaKey::Next, KeyAction::Up),
            ]
        );
    }

    #[test]
    fn test_fallback_has_no_haptic() {
        let f = fixture();
        f.executor.fallback(GlobalAction::QuickSettings);
        assert_eq!(
            f.rig.system.calls(),
            vec![SystemCall::Global(GlobalAction::QuickSettings)]
        );
    }
}
