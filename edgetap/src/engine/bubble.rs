use crate::core::{Color, Rect};
use crate::gesture::{TouchEvent, TouchPhase};
use crate::platform::{PlatformResult, SurfaceId, SurfaceManager, SurfaceSpec};

pub const BUBBLE_SIZE: u32 = 100;
pub const BUBBLE_ORIGIN: (i32, i32) = (0, 200);
/// A lift within this distance of the touch-down counts as a tap.
pub const TAP_TOLERANCE_PX: f32 = 10.0;
const BUBBLE_COLOR: Color = Color(0xCC42_85F4);

#[derive(Debug, Clone, Copy)]
struct Drag {
    touch_x: f32,
    touch_y: f32,
    origin: (i32, i32),
}

/// Draggable capture button, independent of the configured segments.
#[derive(Debug)]
pub struct Bubble {
    id: SurfaceId,
    frame: Rect,
    drag: Option<Drag>,
}

impl Bubble {
    pub fn show(surfaces: &dyn SurfaceManager) -> PlatformResult<Self> {
        let frame = Rect::new(BUBBLE_ORIGIN.0, BUBBLE_ORIGIN.1, BUBBLE_SIZE, BUBBLE_SIZE);
        let id = surfaces.create(&SurfaceSpec {
            frame,
            color: BUBBLE_COLOR,
            interactive: true,
        })?;
        tracing::info!("Bubble shown as surface {}", id);
        Ok(Self {
            id,
            frame,
            drag: None,
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    #[cfg(test)]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn hide(self, surfaces: &dyn SurfaceManager) {
        if let Err(e) = surfaces.destroy(self.id) {
            tracing::debug!("Bubble surface {} already gone: {}", self.id, e);
        }
    }

    /// Returns true when the touch sequence ended as a tap.
    pub fn on_touch(&mut self, surfaces: &dyn SurfaceManager, event: &TouchEvent) -> bool {
        match event.phase {
            TouchPhase::Down => {
                self.drag = Some(Drag {
                    touch_x: event.x,
                    touch_y: event.y,
                    origin: (self.frame.x, self.frame.y),
                });
                false
            }
            TouchPhase::Move => {
                if let Some(drag) = self.drag {
                    let target = Rect {
                        x: drag.origin.0.saturating_add((event.x - drag.touch_x) as i32),
                        y: drag.origin.1.saturating_add((event.y - drag.touch_y) as i32),
                        ..self.frame
                    };
                    let change = self.frame.diff(&target);
                    if !change.is_empty() {
                        match surfaces.update_geometry(self.id, &change) {
                            Ok(()) => self.frame = target,
                            Err(e) => tracing::warn!("Failed to move bubble: {}", e),
                        }
                    }
                }
                false
            }
            TouchPhase::Up => match self.drag.take() {
                Some(drag) => {
                    (event.x - drag.touch_x).abs() < TAP_TOLERANCE_PX
                        && (event.y - drag.touch_y).abs() < TAP_TOLERANCE_PX
                }
                None => false,
            },
            TouchPhase::Cancel => {
                self.drag = None;
                false
            }
        }
    }
}
