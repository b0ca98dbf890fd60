use std::fmt::Write as _;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};

use edgetap_config::OverlayConfig;

use crate::core::ScreenMetrics;
use crate::engine::OverlayEngine;
use crate::gesture::{RecognizerTuning, TouchEvent, TouchPhase};
use crate::platform::{HeadlessInput, HeadlessSurfaces, HeadlessSystem, Platform, SurfaceId};
use crate::scenario::{Scenario, StepAction};
use crate::scheduler::TokioScheduler;
use crate::store::{ConfigStore, JsonFileStore, KeyValueStore, Preferences};

/// Quiet period after the last step so pending timers, pass-through
/// restores and scroll swipes can finish.
const DRAIN_MS: u64 = 1500;

pub struct RunOptions {
    pub screen: ScreenMetrics,
    pub platform_version: u32,
    pub store_path: PathBuf,
}

/// Delivers each touch sequence to the surface that received its down,
/// like a window server does.
#[derive(Default)]
struct TouchRouter {
    target: Option<SurfaceId>,
}

impl TouchRouter {
    fn route(&mut self, surfaces: &HeadlessSurfaces, event: &TouchEvent) -> Option<SurfaceId> {
        if event.phase == TouchPhase::Down {
            self.target = surfaces.hit_test(event.x, event.y);
        }
        let target = self.target;
        if matches!(event.phase, TouchPhase::Up | TouchPhase::Cancel) {
            self.target = None;
        }
        target
    }
}

pub struct App {}

impl App {
    pub fn run(scenario: Scenario, options: RunOptions) -> Result<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build tokio runtime")?;
        let local = tokio::task::LocalSet::new();
        local.block_on(&rt, Self::replay(scenario, options))
    }

    async fn replay(scenario: Scenario, options: RunOptions) -> Result<()> {
        let store: Rc<dyn KeyValueStore> = Rc::new(JsonFileStore::open(&options.store_path)?);
        let configs = ConfigStore::new(store.clone());
        let preferences = Preferences::new(store);

        let scheduler = Rc::new(TokioScheduler::new());
        let surfaces = Rc::new(HeadlessSurfaces::new());
        let platform = Platform {
            surfaces: surfaces.clone(),
            input: Rc::new(HeadlessInput::new(surfaces.clone(), scheduler.clone())),
            system: Rc::new(HeadlessSystem::new(options.platform_version)),
            scheduler: scheduler.clone(),
        };

        let engine = OverlayEngine::new(
            platform,
            preferences,
            options.screen,
            RecognizerTuning::default(),
        );
        engine.apply_config(configs.load_or_default());
        tracing::info!(
            "Replaying {} steps over {}ms",
            scenario.steps.len(),
            scenario.duration_ms()
        );

        let mut router = TouchRouter::default();
        for step in scenario.steps {
            tokio::time::sleep_until(scheduler.start() + Duration::from_millis(step.at)).await;

            match step.action {
                StepAction::Touch { phase, x, y } => {
                    let event = TouchEvent::new(phase, x, y, step.at);
                    match router.route(&surfaces, &event) {
                        Some(id) => {
                            engine.on_touch(id, &event);
                        }
                        None if phase == TouchPhase::Down => {
                            tracing::info!("Touch at ({}, {}) reached the app beneath", x, y)
                        }
                        None => {}
                    }
                }
                StepAction::Tap { x, y } => {
                    // Only reachable for scenarios built in code; parsing expands taps.
                    for phase in [TouchPhase::Down, TouchPhase::Up] {
                        let event = TouchEvent::new(phase, x, y, step.at);
                        if let Some(id) = router.route(&surfaces, &event) {
                            engine.on_touch(id, &event);
                        }
                    }
                }
                StepAction::Rotate { width, height } => {
                    engine.on_orientation_changed(ScreenMetrics::new(width, height));
                }
                StepAction::ReloadConfig => engine.apply_config(configs.load_or_default()),
                StepAction::ApplyConfig { config } => {
                    if let Err(e) = configs.save(&config) {
                        tracing::warn!("Failed to store config: {:#}", e);
                    }
                    engine.apply_config(config);
                }
                StepAction::Bubble { enabled } => engine.set_bubble_enabled(enabled),
            }
        }

        tokio::time::sleep(Duration::from_millis(DRAIN_MS)).await;
        engine.shutdown();
        tracing::info!("Replay finished, {} surfaces left", surfaces.count());
        Ok(())
    }
}

/// Human-readable summary of a config.
pub fn describe_config(config: &OverlayConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "enabled:           {}", config.is_enabled);
    let _ = writeln!(out, "enabled landscape: {}", config.is_enabled_in_landscape);
    let _ = writeln!(out, "debug colors:      {}", config.is_visible);
    if config.segments.is_empty() {
        let _ = writeln!(out, "segments:          none");
        return out;
    }
    let _ = writeln!(out, "segments:");
    for (index, segment) in config.segments.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {}x{} at ({}, {})",
            index, segment.width, segment.height, segment.x_offset, segment.y_offset
        );
        for (gesture, action) in &segment.gestures {
            match segment.gesture_data.get(gesture) {
                Some(data) => {
                    let _ = writeln!(out, "      {} -> {} ({})", gesture, action, data);
                }
                None => {
                    let _ = writeln!(out, "      {} -> {}", gesture, action);
                }
            }
        }
    }
    out
}
