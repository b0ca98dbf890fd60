use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use edgetap_config::OverlayConfig;

use crate::gesture::TouchPhase;

/// Gap between the down and up of a `tap` step.
pub const TAP_HOLD_MS: u64 = 40;

/// A timed script of inputs replayed against the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the replay.
    pub at: u64,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    Touch { phase: TouchPhase, x: f32, y: f32 },
    /// Down and up at the same point, `TAP_HOLD_MS` apart.
    Tap { x: f32, y: f32 },
    Rotate { width: u32, height: u32 },
    /// Re-read the stored config and apply it.
    ReloadConfig,
    /// Store a new config and apply it.
    ApplyConfig { config: OverlayConfig },
    Bubble { enabled: bool },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        Ok(scenario.normalized())
    }

    /// Expand `tap` steps into touch pairs and order everything by time.
    /// Steps at the same time keep their written order.
    fn normalized(self) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in self.steps {
            match step.action {
                StepAction::Tap { x, y } => {
                    steps.push(Step {
                        at: step.at,
                        action: StepAction::Touch {
                            phase: TouchPhase::Down,
                            x,
                            y,
                        },
                    });
                    steps.push(Step {
                        at: step.at.saturating_add(TAP_HOLD_MS),
                        action: StepAction::Touch {
                            phase: TouchPhase::Up,
                            x,
                            y,
                        },
                    });
                }
                _ => steps.push(step),
            }
        }
        steps.sort_by_key(|s| s.at);
        Self { steps }
    }

    /// Time of the last step.
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map(|s| s.at).unwrap_or(0)
    }
}
