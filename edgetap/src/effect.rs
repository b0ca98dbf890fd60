use edgetap_config::{ActionKind, GestureKind};

use crate::platform::GlobalAction;

/// What a recognized gesture asks the engine to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Forward a tap to whatever lies beneath the surface.
    PassThrough { x: f32, y: f32 },
    /// Run the action bound to `gesture` on the surface's segment.
    RunAction {
        gesture: GestureKind,
        action: ActionKind,
    },
    /// Unbound swipe-down fallback, issued straight to the system.
    GlobalFallback(GlobalAction),
}
