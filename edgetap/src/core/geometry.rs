use edgetap_config::SegmentConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_segment(segment: &SegmentConfig) -> Self {
        Self {
            x: segment.x_offset,
            y: segment.y_offset,
            width: segment.width,
            height: segment.height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let left = self.x as f32;
        let top = self.y as f32;
        x >= left && x < left + self.width as f32 && y >= top && y < top + self.height as f32
    }

    /// Fields of `target` that differ from `self`.
    pub fn diff(&self, target: &Rect) -> GeometryChange {
        GeometryChange {
            x: (self.x != target.x).then_some(target.x),
            y: (self.y != target.y).then_some(target.y),
            width: (self.width != target.width).then_some(target.width),
            height: (self.height != target.height).then_some(target.height),
        }
    }

    pub fn apply(&mut self, change: &GeometryChange) {
        if let Some(x) = change.x {
            self.x = x;
        }
        if let Some(y) = change.y {
            self.y = y;
        }
        if let Some(width) = change.width {
            self.width = width;
        }
        if let Some(height) = change.height {
            self.height = height;
        }
    }
}

/// A partial move/resize. Only the fields that actually change are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryChange {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl GeometryChange {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [
            self.x.is_some(),
            self.y.is_some(),
            self.width.is_some(),
            self.height.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Red, green, blue, yellow, magenta at 50% alpha.
pub const DEBUG_PALETTE: [Color; 5] = [
    Color(0x80FF_0000),
    Color(0x8000_FF00),
    Color(0x8000_00FF),
    Color(0x80FF_FF00),
    Color(0x80FF_00FF),
];

/// Color for the segment at `index`: a palette entry in debug mode,
/// fully transparent otherwise.
pub fn segment_color(index: usize, debug_visible: bool) -> Color {
    if debug_visible {
        DEBUG_PALETTE[index % DEBUG_PALETTE.len()]
    } else {
        Color::TRANSPARENT
    }
}
