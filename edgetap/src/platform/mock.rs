use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use super::*;
use crate::scheduler::ManualScheduler;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Create(SurfaceId, SurfaceSpec),
    UpdateGeometry(SurfaceId, GeometryChange),
    SetColor(SurfaceId, Color),
    SetInteractive(SurfaceId, bool),
    Destroy(SurfaceId),
}

#[derive(Default)]
pub struct MockSurfaces {
    next_id: Cell<u64>,
    live: RefCell<BTreeMap<SurfaceId, bool>>,
    calls: RefCell<Vec<SurfaceCall>>,
    pub fail_creates: Cell<bool>,
    pub fail_updates: Cell<bool>,
}

impl MockSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn live_ids(&self) -> Vec<SurfaceId> {
        self.live.borrow().keys().copied().collect()
    }

    pub fn interactive(&self, id: SurfaceId) -> Option<bool> {
        self.live.borrow().get(&id).copied()
    }

    /// Drop a surface behind the engine's back, as a dying window would.
    pub fn vanish(&self, id: SurfaceId) {
        self.live.borrow_mut().remove(&id);
    }

    pub fn count_calls(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn check_live(&self, id: SurfaceId) -> PlatformResult<()> {
        if self.live.borrow().contains_key(&id) {
            Ok(())
        } else {
            Err(PlatformError::SurfaceGone(id))
        }
    }
}

impl SurfaceManager for MockSurfaces {
    fn create(&self, spec: &SurfaceSpec) -> PlatformResult<SurfaceId> {
        if self.fail_creates.get() {
            return Err(PlatformError::Rejected("create".into()));
        }
        let id = SurfaceId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.live.borrow_mut().insert(id, spec.interactive);
        self.calls.borrow_mut().push(SurfaceCall::Create(id, *spec));
        Ok(id)
    }

    fn update_geometry(&self, id: SurfaceId, change: &GeometryChange) -> PlatformResult<()> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::UpdateGeometry(id, *change));
        if self.fail_updates.get() {
            return Err(PlatformError::Rejected("update".into()));
        }
        self.check_live(id)
    }

    fn set_color(&self, id: SurfaceId, color: Color) -> PlatformResult<()> {
        self.calls.borrow_mut().push(SurfaceCall::SetColor(id, color));
        self.check_live(id)
    }

    fn is_interactive(&self, id: SurfaceId) -> PlatformResult<bool> {
        self.interactive(id).ok_or(PlatformError::SurfaceGone(id))
    }

    fn set_interactive(&self, id: SurfaceId, interactive: bool) -> PlatformResult<()> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::SetInteractive(id, interactive));
        match self.live.borrow_mut().get_mut(&id) {
            Some(flag) => {
                *flag = interactive;
                Ok(())
            }
            None => Err(PlatformError::SurfaceGone(id)),
        }
    }

    fn destroy(&self, id: SurfaceId) -> PlatformResult<()> {
        self.calls.borrow_mut().push(SurfaceCall::Destroy(id));
        self.live
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or(PlatformError::SurfaceGone(id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputCall {
    Tap { x: f32, y: f32, duration_ms: u64 },
    Swipe { path: Vec<(f32, f32)>, duration_ms: u64 },
}

/// Records synthetic input. Completes immediately unless `hold` is set, in
/// which case callbacks queue until `complete_next`.
#[derive(Default)]
pub struct MockInput {
    pub hold: Cell<bool>,
    calls: RefCell<Vec<InputCall>>,
    pending: RefCell<VecDeque<DispatchCallback>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<InputCall> {
        self.calls.borrow().clone()
    }

    pub fn taps(&self) -> Vec<(f32, f32)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                InputCall::Tap { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Finish the oldest held gesture. Returns false if none was held.
    pub fn complete_next(&self, outcome: DispatchOutcome) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        match next {
            Some(done) => {
                done(outcome);
                true
            }
            None => false,
        }
    }

    fn finish(&self, done: DispatchCallback) {
        if self.hold.get() {
            self.pending.borrow_mut().push_back(done);
        } else {
            done(DispatchOutcome::Completed);
        }
    }
}

impl InputInjector for MockInput {
    fn dispatch_tap(&self, x: f32, y: f32, duration_ms: u64, done: DispatchCallback) {
        self.calls.borrow_mut().push(InputCall::Tap { x, y, duration_ms });
        self.finish(done);
    }

    fn dispatch_swipe(&self, path: &[(f32, f32)], duration_ms: u64, done: DispatchCallback) {
        self.calls.borrow_mut().push(InputCall::Swipe {
            path: path.to_vec(),
            duration_ms,
        });
        self.finish(done);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemCall {
    Global(GlobalAction),
    Launch(String),
    Pulse(HapticKind),
    Notice(String),
    Capture,
    Torch(bool),
    MediaKey(MediaKey, KeyAction),
    RequestWritePermission,
    SetAutoRotate(bool),
}

pub struct MockSystem {
    pub platform_version: Cell<u32>,
    pub can_write_settings: Cell<bool>,
    pub auto_rotate: Cell<bool>,
    pub global_result: Cell<bool>,
    pub launch_result: Cell<bool>,
    pub torch_fails: Cell<bool>,
    calls: RefCell<Vec<SystemCall>>,
}

impl Default for MockSystem {
    fn default() -> Self {
        Self {
            platform_version: Cell::new(33),
            can_write_settings: Cell::new(true),
            auto_rotate: Cell::new(true),
            global_result: Cell::new(true),
            launch_result: Cell::new(true),
            torch_fails: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MockSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SystemCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Calls other than haptic pulses.
    pub fn effects(&self) -> Vec<SystemCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, SystemCall::Pulse(_)))
            .cloned()
            .collect()
    }

    pub fn count(&self, call: &SystemCall) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: SystemCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl SystemEffector for MockSystem {
    fn perform_global_action(&self, action: GlobalAction) -> bool {
        self.record(SystemCall::Global(action));
        self.global_result.get()
    }

    fn launch_app(&self, app_id: &str) -> bool {
        self.record(SystemCall::Launch(app_id.to_string()));
        self.launch_result.get()
    }

    fn pulse(&self, kind: HapticKind) {
        self.record(SystemCall::Pulse(kind));
    }

    fn show_notice(&self, message: &str) {
        self.record(SystemCall::Notice(message.to_string()));
    }

    fn trigger_capture(&self) {
        self.record(SystemCall::Capture);
    }

    fn set_torch(&self, on: bool) -> PlatformResult<()> {
        self.record(SystemCall::Torch(on));
        if self.torch_fails.get() {
            return Err(PlatformError::Unavailable("camera in use".into()));
        }
        Ok(())
    }

    fn dispatch_media_key(&self, key: MediaKey, action: KeyAction) {
        self.record(SystemCall::MediaKey(key, action));
    }

    fn platform_version(&self) -> u32 {
        self.platform_version.get()
    }

    fn can_write_system_settings(&self) -> bool {
        self.can_write_settings.get()
    }

    fn request_write_settings_permission(&self) {
        self.record(SystemCall::RequestWritePermission);
    }

    fn auto_rotate_enabled(&self) -> PlatformResult<bool> {
        Ok(self.auto_rotate.get())
    }

    fn set_auto_rotate(&self, enabled: bool) -> PlatformResult<()> {
        self.record(SystemCall::SetAutoRotate(enabled));
        self.auto_rotate.set(enabled);
        Ok(())
    }
}

/// A `Platform` wired to recording mocks, with handles kept for assertions.
pub struct MockRig {
    pub surfaces: Rc<MockSurfaces>,
    pub input: Rc<MockInput>,
    pub system: Rc<MockSystem>,
    pub scheduler: Rc<ManualScheduler>,
}

impl MockRig {
    pub fn new() -> Self {
        Self {
            surfaces: Rc::new(MockSurfaces::new()),
            input: Rc::new(MockInput::new()),
            system: Rc::new(MockSystem::new()),
            scheduler: Rc::new(ManualScheduler::new()),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            surfaces: self.surfaces.clone(),
            input: self.input.clone(),
            system: self.system.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}
