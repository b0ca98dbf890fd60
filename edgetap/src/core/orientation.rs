use edgetap_config::OverlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
}

impl ScreenMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 2400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Disabled,
    SuppressedInLandscape,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        self == Visibility::Shown
    }
}

/// Whether overlays may be displayed at all for this config and orientation.
pub fn overlay_visibility(config: &OverlayConfig, orientation: Orientation) -> Visibility {
    if !config.is_enabled {
        return Visibility::Disabled;
    }
    if orientation == Orientation::Landscape && !config.is_enabled_in_landscape {
        return Visibility::SuppressedInLandscape;
    }
    Visibility::Shown
}
