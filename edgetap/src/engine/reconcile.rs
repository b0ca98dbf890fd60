use std::rc::Rc;

use edgetap_config::{OverlayConfig, SegmentConfig};

use crate::core::{overlay_visibility, segment_color, LiveSurface, Rect, ScreenMetrics};
use crate::gesture::{GestureRecognizer, RecognizerTuning};
use crate::platform::{SurfaceManager, SurfaceSpec};

pub struct ReconcileContext<'a> {
    pub surfaces: &'a dyn SurfaceManager,
    pub screen: ScreenMetrics,
    pub tuning: RecognizerTuning,
}

/// Converge the live surfaces onto `config`.
///
/// With an unchanged segment count, surfaces are paired with segments by
/// position and only touched where something differs. Any other count
/// rebuilds the whole set. Surfaces whose platform calls fail are dropped;
/// the next pass rebuilds them.
pub fn reconcile(
    previous: Vec<LiveSurface>,
    config: &OverlayConfig,
    ctx: &ReconcileContext<'_>,
) -> Vec<LiveSurface> {
    let visibility = overlay_visibility(config, ctx.screen.orientation());
    if !visibility.is_shown() {
        tracing::info!(
            "Overlay hidden ({:?}), removing {} surfaces",
            visibility,
            previous.len()
        );
        destroy_all(previous, ctx.surfaces);
        return Vec::new();
    }

    if previous.len() == config.segments.len() {
        update_in_place(previous, config, ctx)
    } else {
        tracing::info!(
            "Segment count changed ({} -> {}), rebuilding surfaces",
            previous.len(),
            config.segments.len()
        );
        destroy_all(previous, ctx.surfaces);
        create_all(config, ctx)
    }
}

pub fn destroy_all(surfaces: Vec<LiveSurface>, manager: &dyn SurfaceManager) {
    for surface in surfaces {
        if let Err(e) = manager.destroy(surface.id) {
            tracing::debug!("Destroy of surface {} failed: {}", surface.id, e);
        }
    }
}

fn update_in_place(
    previous: Vec<LiveSurface>,
    config: &OverlayConfig,
    ctx: &ReconcileContext<'_>,
) -> Vec<LiveSurface> {
    let mut live = Vec::with_capacity(previous.len());

    for ((index, segment), mut surface) in config.segments.iter().enumerate().zip(previous) {
        let target = Rect::from_segment(segment);
        let change = surface.frame.diff(&target);
        if !change.is_empty() {
            if let Err(e) = ctx.surfaces.update_geometry(surface.id, &change) {
                tracing::warn!("Failed to update surface {}: {}", surface.id, e);
                destroy_all(vec![surface], ctx.surfaces);
                continue;
            }
            tracing::debug!(
                "Surface {} moved/resized ({} fields)",
                surface.id,
                change.field_count()
            );
            surface.frame = target;
        }

        let color = segment_color(index, config.is_visible);
        if color != surface.color {
            if let Err(e) = ctx.surfaces.set_color(surface.id, color) {
                tracing::warn!("Failed to recolor surface {}: {}", surface.id, e);
                destroy_all(vec![surface], ctx.surfaces);
                continue;
            }
            surface.color = color;
        }

        let segment = Rc::new(segment.clone());
        let recognizer = recognizer_for(&segment, index, ctx);
        surface.index = index;
        surface.rebind(segment, recognizer);
        live.push(surface);
    }
    live
}

fn create_all(config: &OverlayConfig, ctx: &ReconcileContext<'_>) -> Vec<LiveSurface> {
    let mut live = Vec::with_capacity(config.segments.len());

    for (index, segment) in config.segments.iter().enumerate() {
        let frame = Rect::from_segment(segment);
        let color = segment_color(index, config.is_visible);
        let spec = SurfaceSpec {
            frame,
            color,
            interactive: true,
        };
        let id = match ctx.surfaces.create(&spec) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to create surface for segment {}: {}", index, e);
                continue;
            }
        };

        let segment = Rc::new(segment.clone());
        live.push(LiveSurface {
            id,
            index,
            frame,
            color,
            recognizer: recognizer_for(&segment, index, ctx),
            segment,
            timer_armed_at: None,
        });
    }
    live
}

fn recognizer_for(
    segment: &Rc<SegmentConfig>,
    index: usize,
    ctx: &ReconcileContext<'_>,
) -> GestureRecognizer {
    GestureRecognizer::new(segment.clone(), index, ctx.screen.width, ctx.tuning)
}
