//! Preview wizard: callback protocol, state transitions and rendering
//!
//! Everything here is a pure function of the wizard state; the handler does
//! the I/O. Callback data has the form `pv:<owner>:<action>[:args...]`.

use tracing::debug;

use crate::catalog::{Catalog, normalize_key};
use crate::preview::{GridPreset, Layout, LayoutMode, PreviewState, Submenu, VerticalCount};
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CALLBACK_PREFIX: &str = "pv";

const NOTE_PREVIEW_CHARS: usize = 80;
const FRAME_COLUMNS: usize = 3;

/// One wizard button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    Menu(Submenu),
    Mode(LayoutMode),
    Preset(Layout),
    Category(Option<String>),
    Style(Option<String>),
    ToggleHuman,
    ToggleFrame(Option<usize>),
    ResetFrames,
    Note,
    AwaitPhoto,
    Reset,
    Close,
    Prompt,
    Generate,
    /// Well-formed but unrecognized, or missing its arguments
    Noop,
}

/// Decoded callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub owner: i64,
    pub action: WizardAction,
}

/// Build callback data for `owner` from action parts
pub fn callback_data(owner: i64, parts: &[&str]) -> String {
    format!("{}:{}:{}", CALLBACK_PREFIX, owner, parts.join(":"))
}

/// Decode callback data; None when it is not a wizard callback
pub fn parse_callback(data: &str) -> Option<Callback> {
    let parts: Vec<&str> = data.trim().split(':').collect();
    if parts.len() < 3 || parts[0] != CALLBACK_PREFIX {
        return None;
    }
    let owner = parts[1].parse::<i64>().ok()?;
    let action = WizardAction::parse(parts[2], &parts[3..]);
    Some(Callback { owner, action })
}

impl WizardAction {
    pub fn parse(action: &str, args: &[&str]) -> Self {
        let first = args.first().copied();
        match (action, first) {
            ("menu", Some(menu)) => WizardAction::Menu(Submenu::parse(menu)),
            ("mode", Some(mode)) => WizardAction::Mode(LayoutMode::parse_or_default(mode)),
            ("preset", Some(kind)) => match args.get(1) {
                Some(value) => WizardAction::Preset(Layout::from_keys(kind, value, value)),
                None => WizardAction::Noop,
            },
            ("cat", Some("auto")) => WizardAction::Category(None),
            ("cat", Some(key)) => WizardAction::Category(Some(normalize_key(key))),
            ("style", Some("default")) => WizardAction::Style(None),
            ("style", Some(key)) => WizardAction::Style(Some(normalize_key(key))),
            ("human", _) => WizardAction::ToggleHuman,
            ("frame", idx) => WizardAction::ToggleFrame(idx.and_then(|i| i.parse().ok())),
            ("frames_reset", _) => WizardAction::ResetFrames,
            ("note", _) => WizardAction::Note,
            ("await_photo", _) => WizardAction::AwaitPhoto,
            ("reset", _) => WizardAction::Reset,
            ("close", _) => WizardAction::Close,
            ("prompt", _) => WizardAction::Prompt,
            ("generate", _) => WizardAction::Generate,
            _ => WizardAction::Noop,
        }
    }

    /// Apply the state transition for this action
    ///
    /// `Prompt` and `Generate` only have side effects and leave the state alone.
    pub fn apply(&self, st: &mut PreviewState) {
        debug!(action = ?self, "WizardAction::apply: called");
        match self {
            WizardAction::Menu(menu) => st.menu = *menu,
            WizardAction::Mode(mode) => {
                st.mode = *mode;
                st.menu = Submenu::Main;
            }
            WizardAction::Preset(layout) => {
                match layout {
                    Layout::Grid(preset) => {
                        st.mode = LayoutMode::Grid;
                        st.grid_preset = *preset;
                    }
                    Layout::Vertical(count) => {
                        st.mode = LayoutMode::Vertical;
                        st.vertical_count = *count;
                    }
                }
                st.menu = Submenu::Main;
            }
            WizardAction::Category(key) => {
                st.category = key.clone();
                st.menu = Submenu::Main;
            }
            WizardAction::Style(key) => {
                st.style = key.clone();
                st.menu = Submenu::Main;
            }
            WizardAction::ToggleHuman => {
                st.human_usage = !st.human_usage;
                st.menu = Submenu::Main;
            }
            WizardAction::ToggleFrame(idx) => {
                if let Some(idx) = idx {
                    st.toggle_frame(*idx);
                }
                st.menu = Submenu::Frames;
            }
            WizardAction::ResetFrames => {
                st.reset_frames();
                st.menu = Submenu::Frames;
            }
            WizardAction::Note => {
                st.awaiting_note = true;
                st.menu = Submenu::Main;
            }
            WizardAction::AwaitPhoto => {
                st.awaiting_photo = true;
                st.menu = Submenu::Main;
            }
            WizardAction::Reset => {
                let photo_ref = st.photo_ref.take();
                let message_id = st.message_id;
                st.reset();
                st.photo_ref = photo_ref;
                st.message_id = message_id;
                st.awaiting_photo = true;
            }
            WizardAction::Close => {
                st.awaiting_note = false;
                st.awaiting_photo = false;
                st.menu = Submenu::Main;
            }
            WizardAction::Prompt | WizardAction::Generate | WizardAction::Noop => {}
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}

fn checked(label: impl AsRef<str>, selected: bool) -> String {
    if selected {
        format!("✅ {}", label.as_ref())
    } else {
        label.as_ref().to_string()
    }
}

/// Trim and cut to `max` chars, marking the cut with an ellipsis
pub fn truncate_line(text: &str, max: usize) -> String {
    let text = text.trim();
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

fn has_photo(st: &PreviewState) -> bool {
    st.photo_ref.as_deref().is_some_and(|p| !p.trim().is_empty())
}

/// The wizard panel text
pub fn ui_text(st: &PreviewState, catalog: &Catalog) -> String {
    let shape = st.shape();
    let mode = match st.mode {
        LayoutMode::Grid => "Grid",
        LayoutMode::Vertical => "Vertical",
    };

    let mut lines = vec![
        "🧩 Product Shot Preview".to_string(),
        String::new(),
        format!("Mode: {} ({})", mode, st.layout().label()),
        format!("Images: {}, AR: {}", shape.count, shape.aspect_ratio),
        format!("Category: {}", catalog.category_name(st.category.as_deref())),
        format!("Style: {}", catalog.style_name(st.style.as_deref())),
        format!("Human usage: {}", yes_no(st.human_usage)),
        format!("Frames: {}/{}", st.frames().len(), shape.count),
    ];
    if !st.note.trim().is_empty() {
        lines.push(format!("Note: {}", truncate_line(&st.note, NOTE_PREVIEW_CHARS)));
    }
    lines.push(if has_photo(st) { "Photo: saved ✅" } else { "Photo: (none)" }.to_string());

    if st.awaiting_note {
        lines.push(String::new());
        lines.push("📝 Endi note yuboring (bekor qilish: /cancel).".to_string());
    } else if st.awaiting_photo {
        lines.push(String::new());
        lines.push("📷 Endi mahsulot rasmini yuboring.".to_string());
    } else if has_photo(st) {
        lines.push(String::new());
        lines.push("🎨 Endi `Generate` tugmasini bosing.".to_string());
        lines.push("📷 Rasmni almashtirish: yangi rasmni shunchaki yuboring (caption bo'sh) yoki `Photo`.".to_string());
    }

    if st.menu == Submenu::Frames {
        lines.push(String::new());
        lines.push("Frames list:".to_string());
        for (i, frame) in catalog.frames().iter().take(st.frames().slots()).enumerate() {
            lines.push(format!("{}) {}", i + 1, frame.title));
        }
    }

    lines.join("\n").trim().to_string()
}

/// The keyboard for the open submenu
pub fn keyboard(owner: i64, st: &PreviewState, catalog: &Catalog) -> InlineKeyboardMarkup {
    match st.menu {
        Submenu::Main => main_keyboard(owner, st),
        Submenu::Category => category_keyboard(owner, st, catalog),
        Submenu::Style => style_keyboard(owner, st, catalog),
        Submenu::Frames => frames_keyboard(owner, st),
    }
}

fn button(owner: i64, label: impl Into<String>, parts: &[&str]) -> InlineKeyboardButton {
    InlineKeyboardButton::new(label, callback_data(owner, parts))
}

fn main_keyboard(owner: i64, st: &PreviewState) -> InlineKeyboardMarkup {
    if !has_photo(st) {
        return InlineKeyboardMarkup::new(vec![
            vec![
                button(owner, "📷 Send photo", &["await_photo"]),
                button(owner, "Close", &["close"]),
            ],
            vec![button(owner, "Reset", &["reset"])],
        ]);
    }

    let vertical = st.mode == LayoutMode::Vertical;
    let mut rows = vec![vec![
        button(owner, checked("Grid", !vertical), &["mode", "grid"]),
        button(owner, checked("Vertical", vertical), &["mode", "vertical"]),
    ]];

    let presets: Vec<InlineKeyboardButton> = if vertical {
        VerticalCount::all()
            .map(|count| {
                let value = count.to_string();
                button(
                    owner,
                    checked(format!("v{}", value), st.vertical_count == count),
                    &["preset", "vertical", &value],
                )
            })
            .collect()
    } else {
        GridPreset::ALL
            .iter()
            .map(|preset| {
                button(
                    owner,
                    checked(preset.key(), st.grid_preset == *preset),
                    &["preset", "grid", preset.key()],
                )
            })
            .collect()
    };
    rows.push(presets);

    rows.push(vec![
        button(owner, "Category", &["menu", "category"]),
        button(owner, "Style", &["menu", "style"]),
    ]);
    rows.push(vec![
        button(owner, format!("Human: {}", on_off(st.human_usage)), &["human"]),
        button(owner, format!("Frames ({})", st.frames().len()), &["menu", "frames"]),
    ]);
    rows.push(vec![
        button(owner, "Note", &["note"]),
        button(owner, "📄 Prompt", &["prompt"]),
    ]);
    rows.push(vec![
        button(owner, "📷 Photo", &["await_photo"]),
        button(owner, "🎨 Generate", &["generate"]),
    ]);
    rows.push(vec![
        button(owner, "Reset", &["reset"]),
        button(owner, "Close", &["close"]),
    ]);
    InlineKeyboardMarkup::new(rows)
}

fn back_row(owner: i64) -> Vec<InlineKeyboardButton> {
    vec![button(owner, "⬅ Back", &["menu", "main"])]
}

/// Lay out option buttons two per row, followed by a back button
fn option_rows(buttons: Vec<InlineKeyboardButton>, owner: i64) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons.chunks(2).map(<[_]>::to_vec).collect();
    rows.push(back_row(owner));
    InlineKeyboardMarkup::new(rows)
}

fn category_keyboard(owner: i64, st: &PreviewState, catalog: &Catalog) -> InlineKeyboardMarkup {
    let current = st.category.as_deref().map(normalize_key).unwrap_or_default();
    let buttons = catalog
        .category_options()
        .into_iter()
        .map(|opt| {
            let cb_key = if opt.key.is_empty() { "auto" } else { opt.key.as_str() };
            button(owner, checked(&opt.name, opt.key == current), &["cat", cb_key])
        })
        .collect();
    option_rows(buttons, owner)
}

fn style_keyboard(owner: i64, st: &PreviewState, catalog: &Catalog) -> InlineKeyboardMarkup {
    let current = st.style.as_deref().map(normalize_key).unwrap_or_default();
    let buttons = catalog
        .style_options()
        .into_iter()
        .map(|opt| {
            let cb_key = if opt.key.is_empty() { "default" } else { opt.key.as_str() };
            button(owner, checked(&opt.name, opt.key == current), &["style", cb_key])
        })
        .collect();
    option_rows(buttons, owner)
}

fn frames_keyboard(owner: i64, st: &PreviewState) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = (0..st.frames().slots())
        .map(|idx| {
            let mark = if st.is_frame_selected(idx) { "✅" } else { "⬜" };
            button(owner, format!("{} {}", mark, idx + 1), &["frame", &idx.to_string()])
        })
        .collect();
    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons.chunks(FRAME_COLUMNS).map(<[_]>::to_vec).collect();
    rows.push(vec![
        button(owner, "Reset frames", &["frames_reset"]),
        button(owner, "⬅ Back", &["menu", "main"]),
    ]);
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_photo() -> PreviewState {
        let mut st = PreviewState::default();
        st.photo_ref = Some("file-1".to_string());
        st
    }

    #[test]
    fn test_parse_callback() {
        let cb = parse_callback("pv:42:preset:vertical:3").unwrap();
        assert_eq!(cb.owner, 42);
        assert_eq!(
            cb.action,
            WizardAction::Preset(Layout::Vertical(VerticalCount::new(3).unwrap()))
        );
        assert_eq!(parse_callback("pv:42:cat:auto").unwrap().action, WizardAction::Category(None));
        assert_eq!(
            parse_callback("pv:42:style:Gold").unwrap().action,
            WizardAction::Style(Some("gold".to_string()))
        );
        assert_eq!(parse_callback("pv:42:frame:x").unwrap().action, WizardAction::ToggleFrame(None));
        assert_eq!(parse_callback("pv:42:menu").unwrap().action, WizardAction::Noop);
        assert_eq!(parse_callback("pv:42:bogus").unwrap().action, WizardAction::Noop);
    }

    #[test]
    fn test_parse_callback_rejects_foreign_data() {
        assert!(parse_callback("xx:42:menu:main").is_none());
        assert!(parse_callback("pv:abc:menu:main").is_none());
        assert!(parse_callback("pv:42").is_none());
    }

    #[test]
    fn test_callback_data_round_trips_through_parser() {
        let data = callback_data(7, &["preset", "grid", "2x2"]);
        assert_eq!(data, "pv:7:preset:grid:2x2");
        let cb = parse_callback(&data).unwrap();
        assert_eq!(cb.action, WizardAction::Preset(Layout::Grid(GridPreset::TwoByTwo)));
    }

    #[test]
    fn test_preset_switches_mode_and_shrinks_selection() {
        let mut st = with_photo();
        WizardAction::Preset(Layout::Vertical(VerticalCount::new(2).unwrap())).apply(&mut st);
        st.reconcile();
        assert_eq!(st.mode, LayoutMode::Vertical);
        assert_eq!(st.frames().len(), 2);
        assert_eq!(st.menu, Submenu::Main);
    }

    #[test]
    fn test_toggle_frame_clamps_out_of_range() {
        let mut st = with_photo();
        WizardAction::Preset(Layout::Grid(GridPreset::TwoByTwo)).apply(&mut st);
        st.reconcile();
        WizardAction::ToggleFrame(Some(99)).apply(&mut st);
        assert!(st.is_frame_selected(8));
        assert!(!st.is_frame_selected(0));
        assert_eq!(st.frames().len(), 4);
        assert_eq!(st.menu, Submenu::Frames);

        WizardAction::ToggleFrame(Some(8)).apply(&mut st);
        assert!(!st.is_frame_selected(8));
        assert_eq!(st.frames().len(), 4);
    }

    #[test]
    fn test_reset_keeps_photo_and_panel() {
        let mut st = with_photo();
        st.message_id = Some(55);
        st.note = "matte".to_string();
        st.human_usage = true;
        WizardAction::Reset.apply(&mut st);
        assert_eq!(st.photo_ref.as_deref(), Some("file-1"));
        assert_eq!(st.message_id, Some(55));
        assert!(st.note.is_empty());
        assert!(!st.human_usage);
        assert!(st.awaiting_photo);
    }

    #[test]
    fn test_close_clears_awaiting_flags() {
        let mut st = with_photo();
        st.awaiting_note = true;
        st.awaiting_photo = true;
        st.menu = Submenu::Style;
        WizardAction::Close.apply(&mut st);
        assert!(!st.awaiting_note && !st.awaiting_photo);
        assert_eq!(st.menu, Submenu::Main);
    }

    #[test]
    fn test_ui_text_summary() {
        let catalog = Catalog::default();
        let mut st = with_photo();
        st.note = "x".repeat(100);
        let text = ui_text(&st, &catalog);
        assert!(text.starts_with("🧩 Product Shot Preview\n\nMode: Grid (3x3)"));
        assert!(text.contains("Images: 9, AR: 3:4"));
        assert!(text.contains("Style: Default"));
        assert!(text.contains("Human usage: No"));
        assert!(text.contains("Frames: 9/9"));
        assert!(text.contains(&format!("Note: {}…", "x".repeat(80))));
        assert!(text.contains("Photo: saved ✅"));
        assert!(text.contains("`Generate`"));
        assert!(!text.contains("Frames list:"));
    }

    #[test]
    fn test_ui_text_hints_and_frame_list() {
        let catalog = Catalog::default();
        let mut st = PreviewState::default();
        st.awaiting_photo = true;
        assert!(ui_text(&st, &catalog).contains("Photo: (none)"));
        assert!(ui_text(&st, &catalog).ends_with("📷 Endi mahsulot rasmini yuboring."));

        st.awaiting_note = true;
        st.menu = Submenu::Frames;
        let text = ui_text(&st, &catalog);
        assert!(text.contains("📝 Endi note yuboring"));
        assert!(text.contains("Frames list:\n1) "));
        assert!(text.contains("\n9) "));
    }

    #[test]
    fn test_main_keyboard_without_photo() {
        let kb = keyboard(5, &PreviewState::default(), &Catalog::default());
        assert_eq!(kb.inline_keyboard.len(), 2);
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "pv:5:await_photo");
        assert_eq!(kb.inline_keyboard[1][0].text, "Reset");
    }

    #[test]
    fn test_main_keyboard_with_photo() {
        let mut st = with_photo();
        st.mode = LayoutMode::Vertical;
        st.reconcile();
        let kb = keyboard(5, &st, &Catalog::default());
        assert_eq!(kb.inline_keyboard.len(), 7);
        assert_eq!(kb.inline_keyboard[0][1].text, "✅ Vertical");
        let presets: Vec<_> = kb.inline_keyboard[1].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(presets, vec!["v1", "v2", "v3", "✅ v4"]);
        assert_eq!(kb.inline_keyboard[3][1].text, "Frames (4)");
        assert!(kb.buttons().all(|b| b.callback_data.starts_with("pv:5:")));
    }

    #[test]
    fn test_option_keyboards_mark_selection() {
        let catalog = Catalog::default();
        let mut st = with_photo();
        st.menu = Submenu::Category;
        let kb = keyboard(1, &st, &catalog);
        assert!(kb.inline_keyboard[0][0].text.starts_with("✅ "));
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "pv:1:cat:auto");
        assert!(kb.inline_keyboard.iter().rev().skip(1).all(|row| row.len() <= 2));
        assert_eq!(kb.inline_keyboard.last().unwrap()[0].text, "⬅ Back");

        st.menu = Submenu::Style;
        st.style = Some("gold".to_string());
        let kb = keyboard(1, &st, &catalog);
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "pv:1:style:default");
        let marked: Vec<_> = kb.buttons().filter(|b| b.text.starts_with("✅ ")).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].callback_data, "pv:1:style:gold");
    }

    #[test]
    fn test_frames_keyboard() {
        let mut st = with_photo();
        st.grid_preset = GridPreset::TwoByTwo;
        st.menu = Submenu::Frames;
        st.reconcile();
        let kb = keyboard(3, &st, &Catalog::default());
        assert_eq!(kb.inline_keyboard.len(), 4);
        assert_eq!(kb.inline_keyboard[0][0].text, "✅ 1");
        assert_eq!(kb.inline_keyboard[2][2].text, "⬜ 9");
        assert_eq!(kb.inline_keyboard[2][2].callback_data, "pv:3:frame:8");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("  short  ", 80), "short");
        assert_eq!(truncate_line("abc def", 4), "abc…");
        assert_eq!(truncate_line("ўўўў", 2), "ўў…");
    }
}
