//! Static content catalog
//!
//! Read-only lookup tables for product categories, visual styles and frame
//! templates. The engine and the wizard only ever read from a [`Catalog`];
//! the built-in tables live in [`data`].

mod data;

use std::sync::{Arc, LazyLock};

use serde::Serialize;
use tracing::debug;

/// Key of the neutral "auto" category
pub const AUTO_CATEGORY: &str = "";

/// One selectable frame template
///
/// Templates are handed out by value so callers can append clauses to
/// `execution` without touching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameTemplate {
    pub id: String,
    pub title: String,
    pub concept: String,
    pub execution: Vec<String>,
}

/// Product category copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub key: String,
    pub name: String,
    /// Clauses added to the category section of every document
    pub global: Vec<String>,
    /// Clauses added to the particle/interaction frame
    pub interaction: Vec<String>,
    /// Clauses added to the ingredient/component abstraction frame
    pub abstraction: Vec<String>,
}

/// Visual style copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Style {
    pub key: String,
    pub name: String,
    pub add: Vec<String>,
    pub notes: Vec<String>,
}

/// Key and display name pair used by menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedOption {
    pub key: String,
    pub name: String,
}

/// Lookup tables for categories, styles and frame templates
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
    styles: Vec<Style>,
    frames: Vec<FrameTemplate>,
}

static BUILTIN: LazyLock<Arc<Catalog>> = LazyLock::new(|| Arc::new(data::builtin()));

impl Catalog {
    /// Build a catalog from explicit tables
    ///
    /// An auto category (key `""`) is always present; if the caller does not
    /// supply one, the built-in auto entry is put first.
    pub fn new(mut categories: Vec<Category>, styles: Vec<Style>, frames: Vec<FrameTemplate>) -> Self {
        debug!(
            categories = categories.len(),
            styles = styles.len(),
            frames = frames.len(),
            "Catalog::new: called"
        );
        if !categories.iter().any(|c| c.key == AUTO_CATEGORY) {
            debug!("Catalog::new: no auto category supplied, inserting built-in");
            categories.insert(0, data::auto_category());
        }
        Self {
            categories,
            styles,
            frames,
        }
    }

    /// Shared handle to the built-in catalog
    pub fn builtin() -> Arc<Catalog> {
        Arc::clone(&BUILTIN)
    }

    /// Categories in display order, auto first
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Styles in display order
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Frame templates in catalog order
    pub fn frames(&self) -> &[FrameTemplate] {
        &self.frames
    }

    /// Look up a category by key, exact after normalization
    pub fn category(&self, key: &str) -> Option<&Category> {
        let key = normalize_key(key);
        self.categories.iter().find(|c| c.key == key)
    }

    /// Look up a category, falling back to the auto entry
    pub fn resolve_category(&self, key: Option<&str>) -> &Category {
        debug!(?key, "resolve_category: called");
        key.and_then(|k| self.category(k))
            .or_else(|| self.category(AUTO_CATEGORY))
            .unwrap_or(&self.categories[0])
    }

    /// Look up a style by key; `""` is not a style
    pub fn style(&self, key: &str) -> Option<&Style> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }
        self.styles.iter().find(|s| s.key == key)
    }

    /// Look up a frame template by id
    pub fn frame(&self, id: &str) -> Option<&FrameTemplate> {
        let id = normalize_key(id);
        self.frames.iter().find(|f| f.id == id)
    }

    /// Frame template at a slot index
    pub fn frame_at(&self, index: usize) -> Option<&FrameTemplate> {
        self.frames.get(index)
    }

    /// First `n` templates by value, clamped to `[1, frames.len()]`
    pub fn frames_for_count(&self, n: usize) -> Vec<FrameTemplate> {
        debug!(n, "frames_for_count: called");
        let n = n.max(1).min(self.frames.len());
        self.frames.iter().take(n).cloned().collect()
    }

    /// Category menu entries, auto first
    pub fn category_options(&self) -> Vec<NamedOption> {
        self.categories
            .iter()
            .map(|c| NamedOption {
                key: c.key.clone(),
                name: c.name.clone(),
            })
            .collect()
    }

    /// Style menu entries, with a leading "Default" (no style) entry
    pub fn style_options(&self) -> Vec<NamedOption> {
        let mut out = vec![NamedOption {
            key: String::new(),
            name: "Default".to_string(),
        }];
        out.extend(self.styles.iter().map(|s| NamedOption {
            key: s.key.clone(),
            name: s.name.clone(),
        }));
        out
    }

    /// Display name for a category key
    pub fn category_name(&self, key: Option<&str>) -> &str {
        &self.resolve_category(key).name
    }

    /// Display name for a style key, "Default" when unset or unknown
    pub fn style_name(&self, key: Option<&str>) -> &str {
        key.and_then(|k| self.style(k)).map(|s| s.name.as_str()).unwrap_or("Default")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        data::builtin()
    }
}

/// Normalize a lookup key: trimmed and lowercased
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_nine_frames_in_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.frames().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "hero_still_life",
                "extreme_macro",
                "dynamic_interaction",
                "minimal_sculptural",
                "floating_elements",
                "sensory_closeup",
                "precision_feature_study",
                "ingredient_abstraction",
                "surreal_fusion",
            ]
        );
    }

    #[test]
    fn test_category_order_starts_with_auto() {
        let catalog = Catalog::builtin();
        let keys: Vec<_> = catalog.categories().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys[0], "");
        assert_eq!(keys.len(), 8);
        assert_eq!(keys[7], "luxury_object");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.category("  Beauty ").map(|c| c.key.as_str()), Some("beauty"));
        assert_eq!(catalog.style("GOLD").map(|s| s.key.as_str()), Some("gold"));
        assert!(catalog.frame("Hero_Still_Life").is_some());
    }

    #[test]
    fn test_resolve_category_falls_back_to_auto() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve_category(Some("spaceships")).key, "");
        assert_eq!(catalog.resolve_category(None).name, "Auto/General");
    }

    #[test]
    fn test_empty_style_key_is_not_a_style() {
        let catalog = Catalog::builtin();
        assert!(catalog.style("").is_none());
        assert_eq!(catalog.style_name(None), "Default");
        assert_eq!(catalog.style_name(Some("nope")), "Default");
    }

    #[test]
    fn test_style_options_lead_with_default() {
        let catalog = Catalog::builtin();
        let opts = catalog.style_options();
        assert_eq!(opts[0].key, "");
        assert_eq!(opts[0].name, "Default");
        assert_eq!(opts.len(), catalog.styles().len() + 1);
        assert_eq!(opts[1].key, "luxury_editorial");
    }

    #[test]
    fn test_frames_for_count_clamps() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.frames_for_count(0).len(), 1);
        assert_eq!(catalog.frames_for_count(4).len(), 4);
        assert_eq!(catalog.frames_for_count(40).len(), 9);
    }

    #[test]
    fn test_new_inserts_auto_category() {
        let catalog = Catalog::new(vec![], vec![], vec![]);
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.resolve_category(Some("x")).key, AUTO_CATEGORY);
    }

    #[test]
    fn test_frames_are_copied_by_value() {
        let catalog = Catalog::builtin();
        let mut frames = catalog.frames_for_count(1);
        frames[0].execution.push("extra".to_string());
        assert!(!catalog.frames()[0].execution.iter().any(|l| l == "extra"));
    }
}
