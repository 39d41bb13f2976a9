//! Prompt synthesis
//!
//! Turns a [`PromptOptions`] snapshot and a [`Catalog`] into a generation
//! request document. The document is an ordered list of named [`Section`]s,
//! each a pure function of the options, joined at the end. Identical inputs
//! give byte-identical output.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::layout::{LayoutMode, OutputShape};
use super::options::PromptOptions;
use crate::catalog::{Catalog, Category, FrameTemplate, Style, normalize_key};

const TASK: &str = "TASK: Premium marketplace-ready product preview generation.";

const IDENTITY_LOCK_HEADER: &str = "REFERENCE IMAGE (IDENTITY LOCK): The attached photo contains the real product. Treat this as an image-edit/compositing task.";

const IDENTITY_LOCK: &[&str] = &[
    "The product in every output MUST be the exact same object from the reference photo.",
    "Preserve shape, proportions, materials, colors, and all physical details exactly.",
    "Do NOT replace the product with another item (no substitutions) or invent a different product type.",
    "Branding/text rule: if the reference has text/logo/label, keep it exactly; if it has none, do NOT add any text/logo/brand/claims.",
    "If the reference photo includes a room/background, isolate the main product and replace the background with the requested studio scene.",
    "You may remove background and re-light; never redesign the product or add new parts.",
    "Do NOT add captions/watermarks/text overlays.",
];

const FULL_BLEED: &str = "FULL-BLEED REQUIRED: no borders/frames/bars/mattes/padding/margins/empty edges; if ratio mismatch, outpaint/extend background.";

const DIRECTION_HEADER: &str = "DIRECTION (Jason-style high-end commercial marketing):";

const DIRECTION: &[&str] = &[
    "Clean. Controlled. Intentional.",
    "Every element serves the product.",
    "No decoration for decoration's sake.",
    "Precision in execution.",
    "Emotion through restraint.",
    "Premium through simplicity.",
    "Cinematic without being theatrical.",
    "Commercial but never compromising artistry.",
];

const TECHNICAL: &[(&str, &[&str])] = &[
    (
        "Product integrity",
        &[
            "100% accurate shape and proportions (same object as reference)",
            "No distortion, warping, redesign, or substitution",
            "Branding/text: if present in reference, keep legible and unchanged; if absent, add none",
            "Color-matched materials and finishes",
            "Pristine condition",
        ],
    ),
    (
        "Lighting",
        &[
            "Soft, controlled studio setup",
            "Balanced key, fill, rim",
            "Subtle specular highlights",
            "Natural shadow falloff",
            "No harsh or unnatural lighting",
        ],
    ),
    (
        "Focus and detail",
        &[
            "Tack-sharp on product (except intentional bokeh areas)",
            "High-resolution rendering",
            "Fine detail visible: texture, print, surface quality",
            "Professional depth-of-field control",
        ],
    ),
    (
        "Composition",
        &[
            "Clean separation product/background",
            "Clear visual hierarchy",
            "Intentional negative space",
            "Balanced frame weight",
        ],
    ),
    (
        "Post production",
        &[
            "HDR look",
            "Subtle color grading",
            "Minimal but precise retouching",
            "Editorial polish without over-processing",
            "Medium-format camera aesthetic",
        ],
    ),
    (
        "Aesthetic",
        &[
            "Luxury brand campaign quality",
            "Sophisticated, modern, timeless",
            "Aspirational yet authentic",
        ],
    ),
];

const HUMAN_USAGE: &[&str] = &[
    "Include human interaction/usage context, but NEVER show a full face.",
    "No identifiable person: no eyes + nose + full face together; avoid portraits.",
    "Prefer hands/forearms/partial body crops; keep it editorial and premium.",
    "Human elements must not alter the product; product remains the hero and perfectly accurate.",
];

const NEGATIVE: &[&str] = &[
    "distorted product",
    "incorrect logo",
    "wrong typography",
    "misspelled label text",
    "product substitution",
    "different product than reference",
    "invented branding",
    "invented brand name",
    "extra text overlays",
    "watermark",
    "low resolution",
    "blurry",
    "overexposed highlights",
    "dirty/noisy background",
    "warped perspective",
    "deformed container",
    "unreadable branding",
    "cheap stock-photo look",
    "random readable text (except real product label)",
    "letterbox",
    "pillarbox",
    "bars",
    "black bars",
    "white bars",
    "cinematic bars",
    "border",
    "frame",
    "white border",
    "black border",
    "outline border",
    "stroke border",
    "matte border",
    "picture frame",
    "edge frame",
    "thin border",
    "thick border",
    "margin",
    "padding",
    "canvas edge",
    "blank edge",
    "empty edge",
    "solid color edge",
    "white edge",
    "black edge",
    "vignette border",
];

const MOOD_LOCK: &str = "REFERENCE MOOD LOCK: match the reference image mood, lighting, contrast, and palette; avoid off-palette backgrounds/effects.";

const INTERACTION_FRAME: &str = "dynamic_interaction";
const ABSTRACTION_FRAME: &str = "ingredient_abstraction";

/// One named block of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub body: String,
}

impl Section {
    fn new(name: &'static str, body: String) -> Self {
        Self { name, body }
    }
}

/// A synthesized document plus the shape it asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub document: String,
    pub shape: OutputShape,
}

/// Synthesize a generation request
pub fn synthesize(opts: &PromptOptions, catalog: &Catalog) -> GenerationRequest {
    debug!(frames = opts.frame_ids.len(), "synthesize: called");
    let shape = opts.shape();
    let document = render(&sections(opts, catalog));
    debug!(len = document.len(), count = shape.count, "synthesize: done");
    GenerationRequest { document, shape }
}

/// Join sections into the final document
pub fn render(sections: &[Section]) -> String {
    let joined: Vec<&str> = sections.iter().map(|s| s.body.as_str()).collect();
    joined.join("\n").trim().to_string()
}

/// Build the ordered document sections
///
/// Optional sections (style, human usage, note) are omitted entirely when
/// they do not apply.
pub fn sections(opts: &PromptOptions, catalog: &Catalog) -> Vec<Section> {
    let shape = opts.shape();
    let category = catalog.resolve_category(opts.category.as_deref());
    let style = opts.style.as_deref().and_then(|k| catalog.style(k));
    let frames = decorate_frames(
        frames_for_output(catalog, shape.count, &opts.frame_ids),
        &shape,
        category,
        style,
        opts.human_usage,
    );

    let mut out = vec![
        Section::new("task", format!("{}\n", TASK)),
        Section::new("identity_lock", bulleted(Some(IDENTITY_LOCK_HEADER), IDENTITY_LOCK.iter().copied())),
        Section::new("output_spec", output_spec(&shape)),
        Section::new("direction", bulleted(Some(DIRECTION_HEADER), DIRECTION.iter().copied())),
        Section::new("technical", technical()),
        Section::new("category", category_section(category)),
    ];
    if let Some(style) = style {
        out.push(Section::new("style", style_section(style)));
    }
    if opts.human_usage {
        out.push(Section::new(
            "human_usage",
            bulleted(Some("HUMAN USAGE SCENE (ENFORCEMENT):"), HUMAN_USAGE.iter().copied()),
        ));
    }
    let note = opts.note.trim();
    if !note.is_empty() {
        out.push(Section::new("note", bulleted(Some("ADDITIONAL NOTES:"), [note])));
    }
    out.push(Section::new("frames", frames_section(&frames)));
    out.push(Section::new(
        "negative",
        bulleted(Some("NEGATIVE PROMPT (avoid):"), NEGATIVE.iter().copied()),
    ));
    out.push(Section::new("output_rules", output_rules(&shape)));
    out
}

/// Pick `count` templates for output
///
/// Explicit ids are trimmed, lowercased and de-duplicated; unknown ids are
/// skipped. The result is padded in catalog order and truncated to `count`.
/// With no usable ids the first `count` templates are used.
pub fn frames_for_output(catalog: &Catalog, count: usize, ids: &[String]) -> Vec<FrameTemplate> {
    debug!(count, ids = ids.len(), "frames_for_output: called");
    if catalog.frames().is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut out: Vec<FrameTemplate> = Vec::new();
    for id in ids {
        let id = normalize_key(id);
        if id.is_empty() || !seen.insert(id.clone()) {
            continue;
        }
        if let Some(tpl) = catalog.frame(&id) {
            out.push(tpl.clone());
        }
    }

    if out.is_empty() {
        debug!("frames_for_output: no usable ids, using catalog order");
        return catalog.frames_for_count(count);
    }

    for tpl in catalog.frames() {
        if out.len() >= count {
            break;
        }
        if seen.insert(tpl.id.clone()) {
            out.push(tpl.clone());
        }
    }
    out.truncate(count);
    out
}

fn decorate_frames(
    mut frames: Vec<FrameTemplate>,
    shape: &OutputShape,
    category: &Category,
    style: Option<&Style>,
    human_usage: bool,
) -> Vec<FrameTemplate> {
    for frame in &mut frames {
        let exec = &mut frame.execution;
        exec.push(MOOD_LOCK.to_string());
        if frame.id == INTERACTION_FRAME {
            exec.extend(category.interaction.iter().cloned());
        }
        if frame.id == ABSTRACTION_FRAME {
            exec.extend(category.abstraction.iter().cloned());
        }
        if shape.mode == LayoutMode::Vertical {
            exec.push(format!("Portrait composition lock: {} framing.", shape.aspect_ratio));
            exec.push("Use vertical negative space (top/bottom) for premium layout; product centered, hero scale consistent.".to_string());
            exec.push("If needed, extend background vertically (outpainting) rather than changing product shape or cropping branding.".to_string());
            exec.push("Full-bleed rule: extend background to the edges; never leave empty/solid-color borders.".to_string());
        }
        if let Some(style) = style {
            exec.push(format!(
                "STYLE ENFORCEMENT: {} (follow selected visual style strictly).",
                style.name
            ));
            exec.push("Do not alter product identity.".to_string());
        }
        if human_usage {
            exec.push("Include human interaction crop (hands/partial) with NO full face; keep premium editorial.".to_string());
            exec.push("Product stays tack-sharp and dominant; skin/hand is supporting element only.".to_string());
        }
        *exec = dedupe(std::mem::take(exec));
    }
    frames
}

/// Trim, drop empties, keep the first occurrence of each clause
fn dedupe(lines: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && seen.insert(l.clone()))
        .collect()
}

fn bulleted<'a>(header: Option<&str>, lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str(header);
        out.push('\n');
    }
    for line in lines {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn output_spec(shape: &OutputShape) -> String {
    let mut out = String::from("OUTPUT SPEC:\n");
    out.push_str(&format!("- Create {} images.\n", shape.count));
    out.push_str(&format!("- Aspect ratio per image: {} ({}).\n", shape.aspect_ratio, shape.mode));
    out.push_str(&format!("- Quality: {}. Lighting: studio-grade.\n", shape.quality_hint));
    out.push_str(&format!("- {}\n", FULL_BLEED));
    out
}

fn technical() -> String {
    let mut out = String::from("UNIVERSAL TECHNICAL SPECS:\n");
    for (title, lines) in TECHNICAL {
        out.push_str(&format!("- {}:\n", title));
        for line in *lines {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

fn category_section(category: &Category) -> String {
    let lines = std::iter::once(category.name.as_str()).chain(category.global.iter().map(String::as_str));
    bulleted(Some("CATEGORY:"), lines)
}

fn style_section(style: &Style) -> String {
    let mut out = bulleted(
        Some("VISUAL STYLE (STRICT):"),
        std::iter::once(style.name.as_str()).chain(style.add.iter().map(String::as_str)),
    );
    for note in &style.notes {
        out.push_str(&format!("- NOTE: {}\n", note));
    }
    out
}

fn frames_section(frames: &[FrameTemplate]) -> String {
    let mut out = String::from("FRAMES (generate one image per frame):\n");
    for (i, frame) in frames.iter().enumerate() {
        out.push_str(&format!("\nFrame {}: {}\n", i + 1, frame.title));
        out.push_str(&format!("- Template ID: {}\n", frame.id));
        out.push_str(&format!("- Concept: {}\n", frame.concept));
        out.push_str("- Execution:\n");
        for line in &frame.execution {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

fn output_rules(shape: &OutputShape) -> String {
    format!(
        "OUTPUT RULES:\n- Return exactly {} images.\n- Images only. No text, no JSON.\n",
        shape.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::layout::{GridPreset, VerticalCount};

    fn opts() -> PromptOptions {
        PromptOptions::preview_defaults()
    }

    fn frame_blocks(doc: &str) -> usize {
        doc.matches("\nFrame ").count()
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let catalog = Catalog::builtin();
        let mut o = opts();
        o.category = Some("beauty".to_string());
        o.style = Some("gold".to_string());
        o.human_usage = true;
        assert_eq!(synthesize(&o, &catalog), synthesize(&o, &catalog));
    }

    #[test]
    fn test_note_change_only_touches_note_section() {
        let catalog = Catalog::builtin();
        let mut a = opts();
        a.note = "matte finish".to_string();
        let mut b = a.clone();
        b.note = "glossy finish".to_string();

        let sa = sections(&a, &catalog);
        let sb = sections(&b, &catalog);
        assert_eq!(sa.len(), sb.len());
        for (x, y) in sa.iter().zip(&sb) {
            assert_eq!(x.name, y.name);
            if x.name == "note" {
                assert_ne!(x.body, y.body);
            } else {
                assert_eq!(x.body, y.body);
            }
        }
    }

    #[test]
    fn test_section_order() {
        let catalog = Catalog::builtin();
        let mut o = opts();
        o.style = Some("gold".to_string());
        o.human_usage = true;
        o.note = "x".to_string();
        let names: Vec<_> = sections(&o, &catalog).iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "task",
                "identity_lock",
                "output_spec",
                "direction",
                "technical",
                "category",
                "style",
                "human_usage",
                "note",
                "frames",
                "negative",
                "output_rules",
            ]
        );
    }

    #[test]
    fn test_optional_sections_omitted() {
        let catalog = Catalog::builtin();
        let names: Vec<_> = sections(&opts(), &catalog).iter().map(|s| s.name).collect();
        assert!(!names.contains(&"style"));
        assert!(!names.contains(&"human_usage"));
        assert!(!names.contains(&"note"));
    }

    #[test]
    fn test_unknown_keys_fall_back() {
        let catalog = Catalog::builtin();
        let mut o = opts();
        o.category = Some("spaceship".to_string());
        o.style = Some("neon".to_string());
        let req = synthesize(&o, &catalog);
        assert!(req.document.contains("CATEGORY:\n- Auto/General"));
        assert!(!req.document.contains("VISUAL STYLE"));
    }

    #[test]
    fn test_output_spec_lines() {
        let catalog = Catalog::builtin();
        let mut o = opts();
        o.grid_preset = GridPreset::TwoByTwo;
        let req = synthesize(&o, &catalog);
        assert!(req.document.starts_with("TASK: Premium"));
        assert!(req.document.contains("- Create 4 images.\n"));
        assert!(req.document.contains("- Aspect ratio per image: 3:4 (grid).\n"));
        assert!(req.document.contains("- Quality: 4K. Lighting: studio-grade.\n"));
        assert!(req.document.ends_with("- Images only. No text, no JSON."));
        assert_eq!(frame_blocks(&req.document), 4);
    }

    #[test]
    fn test_explicit_ids_are_normalized_and_padded() {
        let catalog = Catalog::builtin();
        let ids = vec![
            " Surreal_Fusion ".to_string(),
            "surreal_fusion".to_string(),
            "bogus".to_string(),
        ];
        let frames = frames_for_output(&catalog, 3, &ids);
        let got: Vec<_> = frames.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(got, vec!["surreal_fusion", "hero_still_life", "extreme_macro"]);
    }

    #[test]
    fn test_unknown_ids_use_catalog_order() {
        let catalog = Catalog::builtin();
        let frames = frames_for_output(&catalog, 2, &["nope".to_string()]);
        assert_eq!(frames[0].id, "hero_still_life");
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_small_catalog_truncates() {
        let full = Catalog::builtin();
        let small = Catalog::new(
            full.categories().to_vec(),
            full.styles().to_vec(),
            full.frames()[..2].to_vec(),
        );
        let req = synthesize(&opts(), &small);
        assert_eq!(frame_blocks(&req.document), 2);
        assert!(req.document.contains("- Return exactly 9 images."));
    }

    #[test]
    fn test_frame_clauses() {
        let catalog = Catalog::builtin();
        let mut o = opts();
        o.mode = LayoutMode::Vertical;
        o.vertical_count = VerticalCount::new(3).unwrap();
        o.category = Some("beverage".to_string());
        o.style = Some("gold".to_string());
        o.human_usage = true;
        o.frame_ids = vec!["dynamic_interaction".to_string()];
        let shape = o.shape();
        let frames = decorate_frames(
            frames_for_output(&catalog, shape.count, &o.frame_ids),
            &shape,
            catalog.resolve_category(o.category.as_deref()),
            catalog.style("gold"),
            true,
        );
        let exec = &frames[0].execution;
        assert!(exec.contains(&MOOD_LOCK.to_string()));
        assert!(exec.contains(&"Portrait composition lock: 9:16 framing.".to_string()));
        assert!(exec.iter().any(|l| l.starts_with("STYLE ENFORCEMENT: ")));
        let beverage = catalog.category("beverage").unwrap();
        for clause in &beverage.interaction {
            assert!(exec.contains(clause));
        }
        assert_eq!(frames[1].id, "hero_still_life");
        for clause in &beverage.interaction {
            assert!(!frames[1].execution.contains(clause));
        }
    }

    #[test]
    fn test_dedupe_trims_and_drops_repeats() {
        let got = dedupe(vec![" a ".into(), "".into(), "a".into(), "b".into(), "  ".into()]);
        assert_eq!(got, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_catalog_templates_not_mutated() {
        let catalog = Catalog::builtin();
        let before = catalog.frames().to_vec();
        let mut o = opts();
        o.human_usage = true;
        let _ = synthesize(&o, &catalog);
        assert_eq!(catalog.frames(), before.as_slice());
    }
}
