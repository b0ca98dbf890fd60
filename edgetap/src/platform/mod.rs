use std::rc::Rc;

use crate::core::{Color, GeometryChange, Rect};
use crate::scheduler::Scheduler;

mod headless;
#[cfg(test)]
pub mod mock;

pub use headless::{HeadlessInput, HeadlessSurfaces, HeadlessSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("surface {0} no longer exists")]
    SurfaceGone(SurfaceId),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub frame: Rect,
    pub color: Color,
    pub interactive: bool,
}

/// Trait for the always-on-top overlay windows.
/// All calls must be made from the UI thread.
pub trait SurfaceManager {
    fn create(&self, spec: &SurfaceSpec) -> PlatformResult<SurfaceId>;
    /// Move/resize. `change` carries only the fields that differ.
    fn update_geometry(&self, id: SurfaceId, change: &GeometryChange) -> PlatformResult<()>;
    fn set_color(&self, id: SurfaceId, color: Color) -> PlatformResult<()>;
    fn is_interactive(&self, id: SurfaceId) -> PlatformResult<bool>;
    /// Toggle touch capture. A non-interactive surface lets input fall
    /// through to the windows beneath it.
    fn set_interactive(&self, id: SurfaceId, interactive: bool) -> PlatformResult<()>;
    fn destroy(&self, id: SurfaceId) -> PlatformResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    Cancelled,
    /// The system refused the gesture before dispatching it.
    Rejected,
}

/// Invoked exactly once per synthetic gesture.
pub type DispatchCallback = Box<dyn FnOnce(DispatchOutcome)>;

/// Trait for system-level synthetic input.
pub trait InputInjector {
    fn dispatch_tap(&self, x: f32, y: f32, duration_ms: u64, done: DispatchCallback);
    fn dispatch_swipe(&self, path: &[(f32, f32)], duration_ms: u64, done: DispatchCallback);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    TakeScreenshot,
    Home,
    Back,
    Recents,
    LockScreen,
    Notifications,
    QuickSettings,
    ToggleSplitScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    PlayPause,
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Click,
}

/// Trait for the system effectors actions are executed through.
pub trait SystemEffector {
    fn perform_global_action(&self, action: GlobalAction) -> bool;
    fn launch_app(&self, app_id: &str) -> bool;
    fn pulse(&self, kind: HapticKind);
    /// Short user-visible notice.
    fn show_notice(&self, message: &str);
    /// Entry point into the screenshot/search pipeline.
    fn trigger_capture(&self);
    fn set_torch(&self, on: bool) -> PlatformResult<()>;
    fn dispatch_media_key(&self, key: MediaKey, action: KeyAction);
    fn platform_version(&self) -> u32;
    fn can_write_system_settings(&self) -> bool;
    fn request_write_settings_permission(&self);
    fn auto_rotate_enabled(&self) -> PlatformResult<bool>;
    fn set_auto_rotate(&self, enabled: bool) -> PlatformResult<()>;
}

/// Every platform seam the engine talks to.
#[derive(Clone)]
pub struct Platform {
    pub surfaces: Rc<dyn SurfaceManager>,
    pub input: Rc<dyn InputInjector>,
    pub system: Rc<dyn SystemEffector>,
    pub scheduler: Rc<dyn Scheduler>,
}
