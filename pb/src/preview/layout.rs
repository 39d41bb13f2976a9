//! Layout choices and output shape resolution

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Aspect ratio used by grid layouts unless overridden
pub const DEFAULT_GRID_ASPECT: &str = "3:4";

/// Aspect ratio used by vertical layouts unless overridden
pub const DEFAULT_VERTICAL_ASPECT: &str = "9:16";

/// Quality hint passed to the backend for every layout
pub const QUALITY_HINT: &str = "4K";

/// Layout family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    Vertical,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::Vertical => "vertical",
        }
    }

    /// Parse a mode word; anything other than "vertical" is a grid
    pub fn parse_or_default(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("vertical") {
            LayoutMode::Vertical
        } else {
            LayoutMode::Grid
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid presets, columns by rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridPreset {
    #[serde(rename = "1x1")]
    OneByOne,
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[serde(rename = "3x2")]
    ThreeByTwo,
    #[default]
    #[serde(rename = "3x3")]
    ThreeByThree,
}

impl GridPreset {
    pub const ALL: [GridPreset; 4] = [
        GridPreset::OneByOne,
        GridPreset::TwoByTwo,
        GridPreset::ThreeByTwo,
        GridPreset::ThreeByThree,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            GridPreset::OneByOne => "1x1",
            GridPreset::TwoByTwo => "2x2",
            GridPreset::ThreeByTwo => "3x2",
            GridPreset::ThreeByThree => "3x3",
        }
    }

    pub fn columns(&self) -> usize {
        match self {
            GridPreset::OneByOne => 1,
            GridPreset::TwoByTwo => 2,
            GridPreset::ThreeByTwo | GridPreset::ThreeByThree => 3,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            GridPreset::OneByOne => 1,
            GridPreset::TwoByTwo | GridPreset::ThreeByTwo => 2,
            GridPreset::ThreeByThree => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.key() == value)
    }

    /// Parse a preset key, falling back to 3x3
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

/// Number of stacked images in a vertical layout, 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VerticalCount(u8);

impl VerticalCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(count: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = VerticalCount> {
        (Self::MIN..=Self::MAX).map(VerticalCount)
    }

    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().and_then(Self::new)
    }

    /// Parse a count, falling back to 4
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl Default for VerticalCount {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for VerticalCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("vertical count must be 1-4, got {}", value))
    }
}

impl From<VerticalCount> for u8 {
    fn from(value: VerticalCount) -> Self {
        value.0
    }
}

impl fmt::Display for VerticalCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concrete layout choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Grid(GridPreset),
    Vertical(VerticalCount),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Grid(GridPreset::default())
    }
}

impl Layout {
    /// Build a layout from loose string keys, substituting defaults for unknown ones
    pub fn from_keys(mode: &str, grid_preset: &str, vertical_count: &str) -> Self {
        match LayoutMode::parse_or_default(mode) {
            LayoutMode::Vertical => Layout::Vertical(VerticalCount::parse_or_default(vertical_count)),
            LayoutMode::Grid => Layout::Grid(GridPreset::parse_or_default(grid_preset)),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        match self {
            Layout::Grid(_) => LayoutMode::Grid,
            Layout::Vertical(_) => LayoutMode::Vertical,
        }
    }

    /// Short label used by menus, e.g. "3x3" or "v2"
    pub fn label(&self) -> String {
        match self {
            Layout::Grid(p) => p.key().to_string(),
            Layout::Vertical(c) => format!("v{}", c),
        }
    }
}

/// Concrete output geometry derived from a layout and an optional aspect override
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputShape {
    pub mode: LayoutMode,
    pub columns: usize,
    pub rows: usize,
    pub count: usize,
    pub aspect_ratio: String,
    pub quality_hint: String,
    pub layout_key: String,
}

/// Resolve the output shape for a layout
///
/// A valid aspect override replaces the layout's default ratio; an invalid one
/// is ignored.
pub fn resolve_shape(layout: Layout, aspect_override: Option<&str>) -> OutputShape {
    debug!(?layout, ?aspect_override, "resolve_shape: called");
    let mut shape = match layout {
        Layout::Vertical(count) => OutputShape {
            mode: LayoutMode::Vertical,
            columns: 1,
            rows: count.get(),
            count: count.get(),
            aspect_ratio: DEFAULT_VERTICAL_ASPECT.to_string(),
            quality_hint: QUALITY_HINT.to_string(),
            layout_key: format!("{}_vertical_images", count),
        },
        Layout::Grid(preset) => OutputShape {
            mode: LayoutMode::Grid,
            columns: preset.columns(),
            rows: preset.rows(),
            count: preset.columns() * preset.rows(),
            aspect_ratio: DEFAULT_GRID_ASPECT.to_string(),
            quality_hint: QUALITY_HINT.to_string(),
            layout_key: preset.key().to_string(),
        },
    };

    if let Some(ratio) = aspect_override.and_then(normalize_aspect_ratio) {
        debug!(%ratio, "resolve_shape: applying aspect override");
        shape.aspect_ratio = ratio;
    }
    shape
}

/// Normalize an aspect ratio like " 04:5 " into "4:5"
///
/// Returns None unless both sides are positive integers.
pub fn normalize_aspect_ratio(value: &str) -> Option<String> {
    let value = value.trim();
    let (w, h) = value.split_once(':')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some(format!("{}:{}", w, h))
}
