use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{
    DispatchCallback, DispatchOutcome, GlobalAction, HapticKind, InputInjector, KeyAction,
    MediaKey, PlatformError, PlatformResult, SurfaceId, SurfaceManager, SurfaceSpec,
    SystemEffector,
};
use crate::core::{Color, GeometryChange, Rect};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy)]
struct HeadlessSurface {
    frame: Rect,
    color: Color,
    interactive: bool,
}

/// In-process surface table standing in for a window server.
#[derive(Default)]
pub struct HeadlessSurfaces {
    next_id: Cell<u64>,
    surfaces: RefCell<BTreeMap<SurfaceId, HeadlessSurface>>,
}

impl HeadlessSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.surfaces.borrow().len()
    }

    /// Topmost interactive surface under the point. Later surfaces stack
    /// above earlier ones.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<SurfaceId> {
        self.surfaces
            .borrow()
            .iter()
            .rev()
            .find(|(_, s)| s.interactive && s.frame.contains(x, y))
            .map(|(id, _)| *id)
    }

    fn with_surface<T>(
        &self,
        id: SurfaceId,
        f: impl FnOnce(&mut HeadlessSurface) -> T,
    ) -> PlatformResult<T> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&id).ok_or(PlatformError::SurfaceGone(id))?;
        Ok(f(surface))
    }
}

impl SurfaceManager for HeadlessSurfaces {
    fn create(&self, spec: &SurfaceSpec) -> PlatformResult<SurfaceId> {
        let id = SurfaceId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.surfaces.borrow_mut().insert(
            id,
            HeadlessSurface {
                frame: spec.frame,
                color: spec.color,
                interactive: spec.interactive,
            },
        );
        tracing::info!(
            "Created surface {} at ({}, {}) {}x{} color {}",
            id,
            spec.frame.x,
            spec.frame.y,
            spec.frame.width,
            spec.frame.height,
            spec.color
        );
        Ok(id)
    }

    fn update_geometry(&self, id: SurfaceId, change: &GeometryChange) -> PlatformResult<()> {
        let frame = self.with_surface(id, |s| {
            s.frame.apply(change);
            s.frame
        })?;
        tracing::debug!(
            "Surface {} geometry -> ({}, {}) {}x{}",
            id,
            frame.x,
            frame.y,
            frame.width,
            frame.height
        );
        Ok(())
    }

    fn set_color(&self, id: SurfaceId, color: Color) -> PlatformResult<()> {
        self.with_surface(id, |s| s.color = color)?;
        tracing::debug!("Surface {} color -> {}", id, color);
        Ok(())
    }

    fn is_interactive(&self, id: SurfaceId) -> PlatformResult<bool> {
        self.with_surface(id, |s| s.interactive)
    }

    fn set_interactive(&self, id: SurfaceId, interactive: bool) -> PlatformResult<()> {
        self.with_surface(id, |s| s.interactive = interactive)?;
        tracing::debug!("Surface {} interactive -> {}", id, interactive);
        Ok(())
    }

    fn destroy(&self, id: SurfaceId) -> PlatformResult<()> {
        self.surfaces
            .borrow_mut()
            .remove(&id)
            .ok_or(PlatformError::SurfaceGone(id))?;
        tracing::info!("Destroyed surface {}", id);
        Ok(())
    }
}

/// Synthetic input that completes after the gesture duration and reports
/// what it landed on.
pub struct HeadlessInput {
    surfaces: Rc<HeadlessSurfaces>,
    scheduler: Rc<dyn Scheduler>,
}

impl HeadlessInput {
    pub fn new(surfaces: Rc<HeadlessSurfaces>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            surfaces,
            scheduler,
        }
    }
}

impl InputInjector for HeadlessInput {
    fn dispatch_tap(&self, x: f32, y: f32, duration_ms: u64, done: DispatchCallback) {
        match self.surfaces.hit_test(x, y) {
            Some(id) => tracing::warn!(
                "Synthetic tap at ({}, {}) was captured by overlay surface {}",
                x,
                y,
                id
            ),
            None => tracing::info!("Synthetic tap delivered beneath overlay at ({}, {})", x, y),
        }
        self.scheduler
            .post_delayed(duration_ms, Box::new(move || done(DispatchOutcome::Completed)));
    }

    fn dispatch_swipe(&self, path: &[(f32, f32)], duration_ms: u64, done: DispatchCallback) {
        let (Some(start), Some(end)) = (path.first(), path.last()) else {
            done(DispatchOutcome::Rejected);
            return;
        };
        tracing::info!(
            "Synthetic swipe ({}, {}) -> ({}, {}) over {}ms",
            start.0,
            start.1,
            end.0,
            end.1,
            duration_ms
        );
        self.scheduler
            .post_delayed(duration_ms, Box::new(move || done(DispatchOutcome::Completed)));
    }
}

/// System effector that logs every request.
pub struct HeadlessSystem {
    platform_version: u32,
    can_write_settings: Cell<bool>,
    auto_rotate: Cell<bool>,
    torch: Cell<bool>,
}

impl HeadlessSystem {
    pub fn new(platform_version: u32) -> Self {
        Self {
            platform_version,
            can_write_settings: Cell::new(false),
            auto_rotate: Cell::new(true),
            torch: Cell::new(false),
        }
    }

    pub fn torch_on(&self) -> bool {
        self.torch.get()
    }
}

impl SystemEffector for HeadlessSystem {
    fn perform_global_action(&self, action: GlobalAction) -> bool {
        // Split screen needs a foreground app that supports it.
        let accepted = action != GlobalAction::ToggleSplitScreen;
        tracing::info!("Global action {:?} (accepted: {})", action, accepted);
        accepted
    }

    fn launch_app(&self, app_id: &str) -> bool {
        if app_id.is_empty() {
            tracing::warn!("Refusing to launch empty app id");
            return false;
        }
        tracing::info!("Launching {}", app_id);
        true
    }

    fn pulse(&self, kind: HapticKind) {
        tracing::debug!("Haptic {:?}", kind);
    }

    fn show_notice(&self, message: &str) {
        tracing::info!("Notice: {}", message);
    }

    fn trigger_capture(&self) {
        tracing::info!("Capture triggered");
    }

    fn set_torch(&self, on: bool) -> PlatformResult<()> {
        self.torch.set(on);
        tracing::info!("Torch {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn dispatch_media_key(&self, key: MediaKey, action: KeyAction) {
        tracing::info!("Media key {:?} {:?}", key, action);
    }

    fn platform_version(&self) -> u32 {
        self.platform_version
    }

    fn can_write_system_settings(&self) -> bool {
        self.can_write_settings.get()
    }

    fn request_write_settings_permission(&self) {
        // The grant flow is interactive elsewhere; headless grants on request.
        tracing::info!("Write-settings permission requested; granting");
        self.can_write_settings.set(true);
    }

    fn auto_rotate_enabled(&self) -> PlatformResult<bool> {
        Ok(self.auto_rotate.get())
    }

    fn set_auto_rotate(&self, enabled: bool) -> PlatformResult<()> {
        self.auto_rotate.set(enabled);
        tracing::info!("Auto-rotate {}", if enabled { "on" } else { "off" });
        Ok(())
    }
}
