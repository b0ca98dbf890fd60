use serde::{Deserialize, Serialize};

/// Gestures that can be bound to an action on a segment.
///
/// A single tap is deliberately absent: an unbound single tap always
/// passes through to whatever lies beneath the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureKind {
    DoubleTap,
    LongPress,
    TripleTap,
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
}

impl GestureKind {
    pub const ALL: [GestureKind; 7] = [
        GestureKind::DoubleTap,
        GestureKind::LongPress,
        GestureKind::TripleTap,
        GestureKind::SwipeUp,
        GestureKind::SwipeDown,
        GestureKind::SwipeLeft,
        GestureKind::SwipeRight,
    ];

    /// Persisted key for this gesture.
    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::DoubleTap => "DOUBLE_TAP",
            GestureKind::LongPress => "LONG_PRESS",
            GestureKind::TripleTap => "TRIPLE_TAP",
            GestureKind::SwipeUp => "SWIPE_UP",
            GestureKind::SwipeDown => "SWIPE_DOWN",
            GestureKind::SwipeLeft => "SWIPE_LEFT",
            GestureKind::SwipeRight => "SWIPE_RIGHT",
        }
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            GestureKind::DoubleTap => "Double Tap",
            GestureKind::LongPress => "Long Press",
            GestureKind::TripleTap => "Triple Tap",
            GestureKind::SwipeUp => "Swipe Up",
            GestureKind::SwipeDown => "Swipe Down",
            GestureKind::SwipeLeft => "Swipe Left",
            GestureKind::SwipeRight => "Swipe Right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.friendly_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    #[default]
    None,
    Screenshot,
    Flashlight,
    Home,
    Back,
    Recents,
    LockScreen,
    OpenNotifications,
    OpenQuickSettings,
    CtsLens,
    CtsMulti,
    SplitScreen,
    OpenApp,
    ScrollTop,
    ScrollBottom,
    ScreenOff,
    ToggleAutoRotate,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
}

impl ActionKind {
    pub const ALL: [ActionKind; 20] = [
        ActionKind::None,
        ActionKind::Screenshot,
        ActionKind::Flashlight,
        ActionKind::Home,
        ActionKind::Back,
        ActionKind::Recents,
        ActionKind::LockScreen,
        ActionKind::OpenNotifications,
        ActionKind::OpenQuickSettings,
        ActionKind::CtsLens,
        ActionKind::CtsMulti,
        ActionKind::SplitScreen,
        ActionKind::OpenApp,
        ActionKind::ScrollTop,
        ActionKind::ScrollBottom,
        ActionKind::ScreenOff,
        ActionKind::ToggleAutoRotate,
        ActionKind::MediaPlayPause,
        ActionKind::MediaNext,
        ActionKind::MediaPrevious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::None => "NONE",
            ActionKind::Screenshot => "SCREENSHOT",
            ActionKind::Flashlight => "FLASHLIGHT",
            ActionKind::Home => "HOME",
            ActionKind::Back => "BACK",
            ActionKind::Recents => "RECENTS",
            ActionKind::LockScreen => "LOCK_SCREEN",
            ActionKind::OpenNotifications => "OPEN_NOTIFICATIONS",
            ActionKind::OpenQuickSettings => "OPEN_QUICK_SETTINGS",
            ActionKind::CtsLens => "CTS_LENS",
            ActionKind::CtsMulti => "CTS_MULTI",
            ActionKind::SplitScreen => "SPLIT_SCREEN",
            ActionKind::OpenApp => "OPEN_APP",
            ActionKind::ScrollTop => "SCROLL_TOP",
            ActionKind::ScrollBottom => "SCROLL_BOTTOM",
            ActionKind::ScreenOff => "SCREEN_OFF",
            ActionKind::ToggleAutoRotate => "TOGGLE_AUTO_ROTATE",
            ActionKind::MediaPlayPause => "MEDIA_PLAY_PAUSE",
            ActionKind::MediaNext => "MEDIA_NEXT",
            ActionKind::MediaPrevious => "MEDIA_PREVIOUS",
        }
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            ActionKind::None => "No Action",
            ActionKind::Screenshot => "Take Screenshot",
            ActionKind::Flashlight => "Flashlight",
            ActionKind::Home => "Go Home",
            ActionKind::Back => "Go Back",
            ActionKind::Recents => "Recent Apps",
            ActionKind::LockScreen => "Lock Screen",
            ActionKind::OpenNotifications => "Open Notifications",
            ActionKind::OpenQuickSettings => "Quick Settings",
            ActionKind::CtsLens => "Google Lens Search",
            ActionKind::CtsMulti => "Multi-Search (All Engines)",
            ActionKind::SplitScreen => "Split Screen",
            ActionKind::OpenApp => "Open Application",
            ActionKind::ScrollTop => "Scroll to Top",
            ActionKind::ScrollBottom => "Scroll to Bottom",
            ActionKind::ScreenOff => "Turn Off Screen",
            ActionKind::ToggleAutoRotate => "Toggle Auto Rotate",
            ActionKind::MediaPlayPause => "Media Play/Pause",
            ActionKind::MediaNext => "Media Next",
            ActionKind::MediaPrevious => "Media Previous",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    pub fn is_none(self) -> bool {
        self == ActionKind::None
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.friendly_name())
    }
}
