//! Per-user preview configuration

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::layout::{GridPreset, Layout, LayoutMode, OutputShape, VerticalCount, resolve_shape};
use super::options::PromptOptions;
use super::selection::{FRAME_SLOTS, FrameSelection};
use crate::catalog::Catalog;

/// Which facet of the wizard is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Submenu {
    #[default]
    Main,
    Category,
    Style,
    Frames,
}

impl Submenu {
    pub fn as_str(&self) -> &'static str {
        match self {
            Submenu::Main => "main",
            Submenu::Category => "category",
            Submenu::Style => "style",
            Submenu::Frames => "frames",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "category" | "cat" => Submenu::Category,
            "style" => Submenu::Style,
            "frames" => Submenu::Frames,
            _ => Submenu::Main,
        }
    }
}

/// Mutable preview configuration for one (chat, user) pair
///
/// The frame selection is private: it is only changed through
/// [`PreviewState::toggle_frame`], [`PreviewState::reset_frames`] and
/// [`PreviewState::reconcile`], so its size always tracks the layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewState {
    pub mode: LayoutMode,
    pub grid_preset: GridPreset,
    pub vertical_count: VerticalCount,
    pub aspect_override: Option<String>,

    pub category: Option<String>,
    pub style: Option<String>,
    pub human_usage: bool,
    pub note: String,

    frames: FrameSelection,

    /// Transport reference of the last photo fed to the wizard
    pub photo_ref: Option<String>,
    /// Message id of the wizard panel, once sent
    pub message_id: Option<i64>,

    pub awaiting_photo: bool,
    pub awaiting_note: bool,
    pub menu: Submenu,

    pub updated_at: DateTime<Utc>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self::with_slots(FRAME_SLOTS)
    }
}

impl PreviewState {
    /// Fresh state over a frame universe of `slots`
    pub fn with_slots(slots: usize) -> Self {
        Self {
            mode: LayoutMode::Grid,
            grid_preset: GridPreset::ThreeByThree,
            vertical_count: VerticalCount::default(),
            aspect_override: None,
            category: None,
            style: None,
            human_usage: false,
            note: String::new(),
            frames: FrameSelection::full(slots),
            photo_ref: None,
            message_id: None,
            awaiting_photo: false,
            awaiting_note: false,
            menu: Submenu::Main,
            updated_at: Utc::now(),
        }
    }

    /// Seed a state from parsed options, keeping the frame universe
    pub fn apply_options(&mut self, opts: &PromptOptions) {
        debug!(?opts, "apply_options: called");
        self.mode = opts.mode;
        self.grid_preset = opts.grid_preset;
        self.vertical_count = opts.vertical_count;
        self.aspect_override = opts.aspect_ratio.clone();
        self.category = opts.category.clone();
        self.style = opts.style.clone();
        self.human_usage = opts.human_usage;
        self.note = opts.note.clone();
        self.reconcile();
    }

    pub fn layout(&self) -> Layout {
        match self.mode {
            LayoutMode::Grid => Layout::Grid(self.grid_preset),
            LayoutMode::Vertical => Layout::Vertical(self.vertical_count),
        }
    }

    pub fn shape(&self) -> OutputShape {
        resolve_shape(self.layout(), self.aspect_override.as_deref())
    }

    /// Output count clamped to the frame universe
    pub fn frame_count(&self) -> usize {
        self.frames.clamp_count(self.shape().count)
    }

    pub fn frames(&self) -> &FrameSelection {
        &self.frames
    }

    pub fn is_frame_selected(&self, idx: usize) -> bool {
        self.frames.contains(idx)
    }

    /// Bring the frame selection in line with the current layout
    pub fn reconcile(&mut self) {
        let n = self.frame_count();
        self.frames.reconcile(n);
    }

    pub fn toggle_frame(&mut self, idx: usize) {
        debug!(idx, "toggle_frame: called");
        let n = self.frame_count();
        self.frames.reconcile(n);
        self.frames.toggle(idx, n);
    }

    /// Select the lowest N frames again
    pub fn reset_frames(&mut self) {
        debug!("reset_frames: called");
        self.frames.reset();
        self.reconcile();
    }

    /// Slots that feed output, in use order
    pub fn selection_order_for_output(&self) -> Vec<usize> {
        let mut frames = self.frames.clone();
        let n = self.frame_count();
        frames.reconcile(n);
        frames.for_output(n)
    }

    /// Template ids for the slots that feed output
    pub fn frame_ids(&self, catalog: &Catalog) -> Vec<String> {
        self.selection_order_for_output()
            .into_iter()
            .filter_map(|idx| catalog.frame_at(idx))
            .map(|f| f.id.clone())
            .collect()
    }

    /// Snapshot for the synthesis engine
    pub fn prompt_options(&self, catalog: &Catalog) -> PromptOptions {
        PromptOptions {
            mode: self.mode,
            grid_preset: self.grid_preset,
            vertical_count: self.vertical_count,
            aspect_ratio: self.aspect_override.clone(),
            frame_ids: self.frame_ids(catalog),
            category: self.category.clone(),
            style: self.style.clone(),
            human_usage: self.human_usage,
            note: self.note.clone(),
        }
    }

    /// Back to defaults, keeping the frame universe
    pub fn reset(&mut self) {
        debug!("PreviewState::reset: called");
        *self = Self::with_slots(self.frames.slots());
    }
}
