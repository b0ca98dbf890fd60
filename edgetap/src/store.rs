use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::Value;

use edgetap_config::OverlayConfig;

const CONFIG_KEY: &str = "overlay_config";
const USE_LENS_ONLY_KEY: &str = "use_lens_only";
const BUBBLE_ENABLED_KEY: &str = "bubble_enabled";

/// Flat key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// All keys in one JSON object on disk, rewritten atomically on every change.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// `$XDG_CONFIG_HOME/edgetap/prefs.json` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("edgetap").join("prefs.json"))
    }

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        tracing::debug!("Opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// Write `entries` to disk. The in-memory map is only replaced by the
    /// caller once this succeeds.
    fn flush(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut next = self.entries.borrow().clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        *self.entries.borrow_mut() = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut next = self.entries.borrow().clone();
        if next.remove(key).is_some() {
            self.flush(&next)?;
            *self.entries.borrow_mut() = next;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Persists the overlay configuration as a single JSON blob.
#[derive(Clone)]
pub struct ConfigStore {
    store: Rc<dyn KeyValueStore>,
}

impl ConfigStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored config, or `None` when nothing usable is stored.
    pub fn load(&self) -> Option<OverlayConfig> {
        let value = self.store.get(CONFIG_KEY)?;
        let parsed = match value {
            Value::String(blob) => OverlayConfig::from_json(&blob),
            other => serde_json::from_value(other),
        };
        match parsed {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Stored overlay config is unreadable, ignoring: {}", e);
                None
            }
        }
    }

    pub fn load_or_default(&self) -> OverlayConfig {
        self.load().unwrap_or_default()
    }

    pub fn save(&self, config: &OverlayConfig) -> Result<()> {
        let blob = config.to_json().context("Failed to encode overlay config")?;
        self.store.put(CONFIG_KEY, Value::String(blob))?;
        tracing::info!("Saved overlay config ({} segments)", config.segments.len());
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        self.store.remove(CONFIG_KEY)?;
        tracing::info!("Reset overlay config");
        Ok(())
    }
}

/// Which search flow the capture pipeline opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    LensOnly,
    MultiEngine,
}

/// Small user preferences shared with the capture pipeline.
#[derive(Clone)]
pub struct Preferences {
    store: Rc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn capture_mode(&self) -> CaptureMode {
        if self.flag(USE_LENS_ONLY_KEY, false) {
            CaptureMode::LensOnly
        } else {
            CaptureMode::MultiEngine
        }
    }

    pub fn set_capture_mode(&self, mode: CaptureMode) -> Result<()> {
        self.store
            .put(USE_LENS_ONLY_KEY, Value::Bool(mode == CaptureMode::LensOnly))
    }

    pub fn bubble_enabled(&self) -> bool {
        self.flag(BUBBLE_ENABLED_KEY, false)
    }

    pub fn set_bubble_enabled(&self, enabled: bool) -> Result<()> {
        self.store.put(BUBBLE_ENABLED_KEY, Value::Bool(enabled))
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.store
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }
}
