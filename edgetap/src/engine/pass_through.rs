use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::platform::{InputInjector, PlatformError, SurfaceId, SurfaceManager};
use crate::scheduler::Scheduler;

/// Time for the window system to retarget input after a surface stops
/// capturing touches.
pub const SETTLE_DELAY_MS: u64 = 100;
pub const TAP_DURATION_MS: u64 = 50;

#[derive(Debug, Clone, Copy)]
struct InFlight {
    original: bool,
    pending: u32,
}

/// Forwards a tap to whatever lies beneath a surface by briefly making the
/// surface non-interactive around a synthetic tap.
///
/// Sequences on the same surface may overlap; the flag recorded by the
/// first one is restored once, when the last one finishes.
#[derive(Clone)]
pub struct PassThroughDispatcher {
    surfaces: Rc<dyn SurfaceManager>,
    input: Rc<dyn InputInjector>,
    scheduler: Rc<dyn Scheduler>,
    in_flight: Rc<RefCell<HashMap<SurfaceId, InFlight>>>,
}

impl PassThroughDispatcher {
    pub fn new(
        surfaces: Rc<dyn SurfaceManager>,
        input: Rc<dyn InputInjector>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            surfaces,
            input,
            scheduler,
            in_flight: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn in_flight(&self, id: SurfaceId) -> bool {
        self.in_flight.borrow().contains_key(&id)
    }

    pub fn forward_tap(&self, id: SurfaceId, x: f32, y: f32) {
        let existing = self.in_flight.borrow().get(&id).map(|f| f.original);
        let original = match existing {
            Some(original) => original,
            None => match self.surfaces.is_interactive(id) {
                Ok(flag) => flag,
                Err(e) => {
                    tracing::warn!("Cannot forward tap through surface {}: {}", id, e);
                    return;
                }
            },
        };

        if let Err(e) = self.surfaces.set_interactive(id, false) {
            tracing::warn!("Failed to release input on surface {}: {}", id, e);
            return;
        }
        self.in_flight
            .borrow_mut()
            .entry(id)
            .or_insert(InFlight {
                original,
                pending: 0,
            })
            .pending += 1;
        tracing::debug!("Forwarding tap at ({}, {}) through surface {}", x, y, id);

        let this = self.clone();
        self.scheduler.post_delayed(
            SETTLE_DELAY_MS,
            Box::new(move || {
                let restorer = this.clone();
                this.input.dispatch_tap(
                    x,
                    y,
                    TAP_DURATION_MS,
                    Box::new(move |outcome| {
                        tracing::debug!("Forwarded tap on surface {} finished: {:?}", id, outcome);
                        let scheduler = restorer.scheduler.clone();
                        scheduler.post(Box::new(move || restorer.finish(id)));
                    }),
                );
            }),
        );
    }

    fn finish(&self, id: SurfaceId) {
        let restore = {
            let mut in_flight = self.in_flight.borrow_mut();
            let Some(entry) = in_flight.get_mut(&id) else {
                return;
            };
            entry.pending = entry.pending.saturating_sub(1);
            if entry.pending > 0 {
                return;
            }
            let original = entry.original;
            in_flight.remove(&id);
            original
        };

        match self.surfaces.set_interactive(id, restore) {
            Ok(()) => {}
            Err(PlatformError::SurfaceGone(_)) => {
                tracing::debug!("Surface {} gone before input could be restored", id)
            }
            Err(e) => tracing::warn!("Failed to restore input on surface {}: {}", id, e),
        }
    }
}
