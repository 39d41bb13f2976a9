//! Preview configuration and prompt synthesis
//!
//! - [`layout`]: layout choices and output shape resolution
//! - [`options`]: prompt options and free-text argument parsing
//! - [`selection`]: fixed-capacity frame selection with recency eviction
//! - [`state`]: per-user wizard state
//! - [`store`]: keyed store of wizard states
//! - [`prompt`]: deterministic document synthesis

pub mod layout;
pub mod options;
pub mod prompt;
pub mod selection;
pub mod state;
pub mod store;

pub use layout::{
    DEFAULT_GRID_ASPECT, DEFAULT_VERTICAL_ASPECT, GridPreset, Layout, LayoutMode, OutputShape, QUALITY_HINT,
    VerticalCount, normalize_aspect_ratio, resolve_shape,
};
pub use options::{PromptOptions, parse_args};
pub use prompt::{GenerationRequest, Section, frames_for_output, sections, synthesize};
pub use selection::{FRAME_SLOTS, FrameSelection};
pub use state::{PreviewState, Submenu};
pub use store::{PreviewStore, StateKey};
