use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gesture::{ActionKind, GestureKind};

const DEFAULT_SEGMENT_WIDTH: u32 = 150;
const DEFAULT_SEGMENT_HEIGHT: u32 = 60;
const DEFAULT_STRIP_WIDTH: u32 = 1080;

/// Root overlay configuration, persisted as a single JSON blob.
///
/// Decoding is lenient: unknown gesture or action names are dropped per
/// entry and segments with non-positive geometry are discarded, so a stale
/// blob still yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawOverlayConfig")]
pub struct OverlayConfig {
    pub is_enabled: bool,
    pub is_enabled_in_landscape: bool,
    /// Debug flag: paint segments with translucent colors.
    pub is_visible: bool,
    pub segments: Vec<SegmentConfig>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            is_enabled: true,
            is_enabled_in_landscape: false,
            is_visible: false,
            segments: vec![SegmentConfig {
                width: DEFAULT_STRIP_WIDTH,
                ..SegmentConfig::default()
            }],
        }
    }
}

impl OverlayConfig {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a persisted blob. Only a structurally broken document is an
    /// error; drifted entries inside it are dropped.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One configured capture rectangle and its gesture bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConfig {
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub gestures: BTreeMap<GestureKind, ActionKind>,
    /// Extra parameter per gesture, e.g. an app identifier for `OPEN_APP`.
    pub gesture_data: BTreeMap<GestureKind, String>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SEGMENT_WIDTH,
            height: DEFAULT_SEGMENT_HEIGHT,
            x_offset: 0,
            y_offset: 0,
            gestures: default_gestures(),
            gesture_data: BTreeMap::new(),
        }
    }
}

impl SegmentConfig {
    /// Action bound to `gesture`, `NONE` when unmapped.
    pub fn action_for(&self, gesture: GestureKind) -> ActionKind {
        self.gestures.get(&gesture).copied().unwrap_or_default()
    }

    /// First gesture (in `GestureKind` order) bound to `action`.
    pub fn gesture_for_action(&self, action: ActionKind) -> Option<GestureKind> {
        self.gestures
            .iter()
            .find(|(_, a)| **a == action)
            .map(|(g, _)| *g)
    }

    pub fn with_binding(mut self, gesture: GestureKind, action: ActionKind) -> Self {
        self.gestures.insert(gesture, action);
        self
    }

    pub fn with_data(mut self, gesture: GestureKind, data: impl Into<String>) -> Self {
        self.gesture_data.insert(gesture, data.into());
        self
    }
}

fn default_gestures() -> BTreeMap<GestureKind, ActionKind> {
    BTreeMap::from([(GestureKind::DoubleTap, ActionKind::CtsMulti)])
}

fn default_true() -> bool {
    true
}

fn default_segments() -> Vec<Value> {
    vec![serde_json::json!({ "width": DEFAULT_STRIP_WIDTH })]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverlayConfig {
    #[serde(default = "default_true")]
    is_enabled: bool,
    #[serde(default)]
    is_enabled_in_landscape: bool,
    #[serde(default)]
    is_visible: bool,
    #[serde(default = "default_segments")]
    segments: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    #[serde(default)]
    width: Option<i64>,
    #[serde(default)]
    height: Option<i64>,
    #[serde(default)]
    x_offset: i64,
    #[serde(default)]
    y_offset: i64,
    #[serde(default)]
    gestures: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    gesture_data: BTreeMap<String, Value>,
}

impl From<RawOverlayConfig> for OverlayConfig {
    fn from(raw: RawOverlayConfig) -> Self {
        let segments = raw
            .segments
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawSegment>(value).ok())
            .filter_map(RawSegment::into_segment)
            .collect();

        Self {
            is_enabled: raw.is_enabled,
            is_enabled_in_landscape: raw.is_enabled_in_landscape,
            is_visible: raw.is_visible,
            segments,
        }
    }
}

impl RawSegment {
    fn into_segment(self) -> Option<SegmentConfig> {
        let width = positive_u32(self.width.unwrap_or(DEFAULT_SEGMENT_WIDTH as i64))?;
        let height = positive_u32(self.height.unwrap_or(DEFAULT_SEGMENT_HEIGHT as i64))?;

        let gestures = match self.gestures {
            None => default_gestures(),
            Some(map) => map
                .into_iter()
                .filter_map(|(key, value)| {
                    let gesture = GestureKind::parse(&key)?;
                    let action = ActionKind::parse(value.as_str()?)?;
                    Some((gesture, action))
                })
                .collect(),
        };

        let gesture_data = self
            .gesture_data
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((GestureKind::parse(&key)?, s)),
                _ => None,
            })
            .collect();

        Some(SegmentConfig {
            width,
            height,
            x_offset: clamp_i32(self.x_offset),
            y_offset: clamp_i32(self.y_offset),
            gestures,
            gesture_data,
        })
    }
}

fn positive_u32(value: i64) -> Option<u32> {
    if value <= 0 {
        return None;
    }
    u32::try_from(value).ok()
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
