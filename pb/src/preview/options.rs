//! Prompt options and free-text argument parsing

use serde::Serialize;
use tracing::debug;

use super::layout::{GridPreset, Layout, LayoutMode, OutputShape, VerticalCount, normalize_aspect_ratio, resolve_shape};
use crate::catalog::{Catalog, normalize_key};

/// Everything the synthesis engine needs besides the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptOptions {
    pub mode: LayoutMode,
    pub grid_preset: GridPreset,
    pub vertical_count: VerticalCount,
    pub aspect_ratio: Option<String>,
    /// Explicit frame template ids; empty means "first N templates"
    pub frame_ids: Vec<String>,
    pub category: Option<String>,
    pub style: Option<String>,
    pub human_usage: bool,
    pub note: String,
}

impl PromptOptions {
    /// Defaults used by `/preview`: a 3x3 grid, four vertical images when switched
    pub fn preview_defaults() -> Self {
        Self::default()
    }

    /// Defaults used by `/cover`: a single square high-key image
    pub fn cover_defaults() -> Self {
        Self {
            grid_preset: GridPreset::OneByOne,
            aspect_ratio: Some("1:1".to_string()),
            style: Some("high_key_clean".to_string()),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> Layout {
        match self.mode {
            LayoutMode::Grid => Layout::Grid(self.grid_preset),
            LayoutMode::Vertical => Layout::Vertical(self.vertical_count),
        }
    }

    pub fn shape(&self) -> OutputShape {
        resolve_shape(self.layout(), self.aspect_ratio.as_deref())
    }
}

/// Parse free text such as `"v3 beauty style=gold 4:5 matte finish"` on top of `defaults`
///
/// Recognized tokens adjust the layout, category, style, human toggle and
/// aspect ratio. Everything else is kept in its original casing and becomes
/// the note. Parsing never fails.
pub fn parse_args(raw: &str, defaults: PromptOptions, catalog: &Catalog) -> PromptOptions {
    debug!(%raw, "parse_args: called");
    let mut opts = defaults;
    let raw = raw.trim();
    if raw.is_empty() {
        return opts;
    }

    let mut note = Vec::new();
    for orig in raw.split_whitespace() {
        let tok = orig.to_lowercase();
        if !apply_token(&mut opts, &tok, catalog) {
            note.push(orig);
        }
    }

    opts.note = note.join(" ").trim().to_string();
    debug!(?opts, "parse_args: parsed");
    opts
}

fn apply_token(opts: &mut PromptOptions, tok: &str, catalog: &Catalog) -> bool {
    match tok {
        "grid" | "horizontal" | "h" => {
            opts.mode = LayoutMode::Grid;
            return true;
        }
        "vertical" | "portrait" | "v" => {
            opts.mode = LayoutMode::Vertical;
            return true;
        }
        "use" | "human" | "usage" | "inuse" => {
            opts.human_usage = true;
            return true;
        }
        "nohuman" | "nouse" | "no-usage" => {
            opts.human_usage = false;
            return true;
        }
        _ => {}
    }

    if let Some(preset) = GridPreset::parse(tok) {
        opts.mode = LayoutMode::Grid;
        opts.grid_preset = preset;
        return true;
    }

    if let Some(count) = tok.strip_prefix('v').filter(|rest| rest.len() == 1).and_then(VerticalCount::parse) {
        opts.mode = LayoutMode::Vertical;
        opts.vertical_count = count;
        return true;
    }

    if let Some(key) = tok.strip_prefix("style=")
        && let Some(style) = catalog.style(key)
    {
        opts.style = Some(style.key.clone());
        return true;
    }

    if let Some(key) = tok.strip_prefix("category=").or_else(|| tok.strip_prefix("cat="))
        && let Some(category) = catalog.category(key)
    {
        opts.category = Some(category.key.clone()).filter(|k| !k.is_empty());
        return true;
    }

    let key = normalize_key(tok);
    if !key.is_empty() {
        if let Some(category) = catalog.category(&key) {
            opts.category = Some(category.key.clone());
            return true;
        }
        if let Some(style) = catalog.style(&key) {
            opts.style = Some(style.key.clone());
            return true;
        }
    }

    if let Some(ratio) = tok
        .strip_prefix("aspect=")
        .or_else(|| tok.strip_prefix("ar="))
        .and_then(normalize_aspect_ratio)
    {
        opts.aspect_ratio = Some(ratio);
        return true;
    }

    if let Some(ratio) = normalize_aspect_ratio(tok) {
        opts.aspect_ratio = Some(ratio);
        return true;
    }

    false
}
