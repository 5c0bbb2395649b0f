//! Dialog-state extraction.
//!
//! Reconstructs a stable `DialogState` (speaker, line, options, bounds) from
//! the host widget tree once per simulation tick. The tree is noisy: option
//! rows live in different containers per dialog flavor, chat chrome shares
//! containers with option menus, and widgets populate over several frames.
//! Extraction therefore combines a cached root search, a depth-limited walk,
//! and aggressive label filtering.
//!
//! Everything here is total: missing or malformed widgets are "no data this
//! tick", never an error.

use crate::text::{is_blank, normalize_opt};
use crate::ui::{Rect, UiSnapshot, Widget, WidgetId, component};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Upper bound on spoken/displayed options.
pub const MAX_OPTIONS: usize = 10;

/// Safety bound against cyclic or pathological trees. Exceeding it means
/// "nothing found", not an error.
const MAX_WALK_DEPTH: u32 = 10;

/// At most this many option roots are remembered between ticks.
const MAX_CACHED_ROOTS: usize = 3;

/// Containers that may host an option menu, in scan order.
const CANDIDATE_GROUPS: [u32; 5] = [219, 231, 193, 162, 161];

/// Child indices scanned per candidate group during a brute-force search.
const MAX_CHILD_SCAN: u32 = 1400;

// Overlay row geometry used to grow the bounds when the native option
// container under-reports its height (options are drawn by the overlay, not
// the native widget).
const BOUNDS_TOP_PADDING: i32 = 18;
const BOUNDS_BOTTOM_PADDING: i32 = 18;
const BOUNDS_HEADER_HEIGHT: i32 = 18;
const BOUNDS_PER_OPTION_HEIGHT: i32 = 32;

/// Recognized option-menu header phrases, lowercase.
const HEADER_PHRASES: [&str; 4] = [
    "select an option",
    "what would you like to say",
    "what would you like to do",
    "what would you like to ask",
];

/// Chat-tab chrome labels that must never become options.
const CHAT_TAB_LABELS: [&str; 8] = [
    "all", "game", "public", "private", "channel", "clan", "trade", "friends",
];

static ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.$").expect("ordinal regex"));
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("integer regex"));
static TIMER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:\d+(?::\d+)?$").expect("timer regex"));
static CHAT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _\-]{1,12}:\s+.+$").expect("chat line regex"));

/// Canonical dialog state for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogState {
    /// Speaker name; empty if none. Player lines use `"You"`.
    pub speaker: String,
    /// Normalized current dialog line; empty if none.
    pub line: String,
    /// Up to [`MAX_OPTIONS`] option labels in on-screen reading order.
    pub options: Vec<String>,
    /// Union of contributing widget rectangles, clamped to the canvas.
    pub bounds: Option<Rect>,
}

impl DialogState {
    /// True when there is nothing to display or speak.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty() && self.options.is_empty()
    }
}

/// Speaker + line only; the cheap subset safe to read on the render tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogLine {
    pub speaker: String,
    pub line: String,
}

impl DialogLine {
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

/// A widget subtree believed to host an option menu.
///
/// Remembered across ticks so the brute-force container scan only runs when
/// no cached root re-validates.
#[derive(Debug, Default)]
struct OptionRootCache {
    roots: Vec<WidgetId>,
}

impl OptionRootCache {
    /// Re-validate cached roots: present, visible, and still containing a
    /// header phrase. Refs that fail are dropped from the cache; the
    /// survivors are returned together with the header bounds seen during
    /// validation.
    fn validate(&mut self, ui: &dyn UiSnapshot, bounds: &mut Option<Rect>) -> Vec<WidgetId> {
        let mut live = Vec::new();
        for &id in &self.roots {
            let Some(root) = ui.widget(id) else { continue };
            if root.is_hidden() {
                continue;
            }
            if let Some(header) = find_header(root, 0) {
                union_into(bounds, header);
                live.push(id);
            }
        }
        if live.len() != self.roots.len() {
            self.roots.clone_from(&live);
        }
        live
    }

    /// Brute-force scan over the fixed candidate containers, stopping after
    /// [`MAX_CACHED_ROOTS`] hits. Replaces the cache wholesale.
    fn rescan(&mut self, ui: &dyn UiSnapshot, bounds: &mut Option<Rect>) -> Vec<WidgetId> {
        let mut found = Vec::new();

        'outer: for group in CANDIDATE_GROUPS {
            for child in 0..MAX_CHILD_SCAN {
                let id = WidgetId::new(group, child);
                let Some(root) = ui.widget(id) else { continue };
                if root.is_hidden() {
                    continue;
                }
                if let Some(header) = find_header(root, 0) {
                    union_into(bounds, header);
                    found.push(id);
                    if found.len() >= MAX_CACHED_ROOTS {
                        break 'outer;
                    }
                }
            }
        }

        trace!(roots = found.len(), "option root rescan");
        self.roots.clone_from(&found);
        found
    }

    /// Quick probe through the cached roots only (no scan, no bounds).
    fn any_live(&self, ui: &dyn UiSnapshot) -> bool {
        self.roots.iter().any(|&id| {
            ui.widget(id)
                .filter(|root| !root.is_hidden())
                .is_some_and(|root| find_header(root, 0).is_some())
        })
    }
}

/// Walks the widget tree to produce one [`DialogState`] per simulation tick.
///
/// Owns the option-root cache; all mutation happens on the simulation-tick
/// thread, so no locking is required.
#[derive(Debug, Default)]
pub struct DialogExtractor {
    cache: OptionRootCache,
}

impl DialogExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve speaker and line from the three direct dialog widgets.
    ///
    /// O(1) and safe to call on every render tick.
    pub fn read_dialog_line(&self, ui: &dyn UiSnapshot) -> DialogLine {
        let npc_name = widget_text(ui, component::DIALOG_NPC_NAME);
        let npc_text = widget_text(ui, component::DIALOG_NPC_TEXT);

        if !is_blank(&npc_text) {
            return DialogLine {
                speaker: npc_name,
                line: npc_text,
            };
        }

        let player_text = widget_text(ui, component::DIALOG_PLAYER_TEXT);
        if !is_blank(&player_text) {
            return DialogLine {
                speaker: "You".to_owned(),
                line: player_text,
            };
        }

        DialogLine::default()
    }

    /// Cheap option-menu-header probe, safe on the render tick.
    ///
    /// Checks the canonical option container first, then the cached roots.
    /// Never scans.
    pub fn has_option_header(&self, ui: &dyn UiSnapshot) -> bool {
        if let Some(opt) = ui.widget(component::DIALOG_OPTION_OPTIONS)
            && !opt.is_hidden()
            && find_header(opt, 0).is_some()
        {
            return true;
        }

        self.cache.any_live(ui)
    }

    /// True when the chatbox free-text input line is open.
    pub fn chatbox_input_open(&self, ui: &dyn UiSnapshot) -> bool {
        ui.widget(component::CHATBOX_INPUT)
            .is_some_and(|w| !w.is_hidden())
    }

    /// Full extraction: speaker/line, stabilized option labels, and clamped
    /// bounds. Simulation tick only — the option discovery path is expensive.
    pub fn extract(&mut self, ui: &dyn UiSnapshot) -> DialogState {
        let dialog = self.read_dialog_line(ui);

        // Anchor bounds to the direct dialog widgets.
        let mut bounds: Option<Rect> = None;
        for id in [
            component::DIALOG_NPC_TEXT,
            component::DIALOG_PLAYER_TEXT,
            component::DIALOG_NPC_NAME,
        ] {
            if let Some(w) = ui.widget(id) {
                union_into(&mut bounds, w.bounds());
            }
        }

        let mut roots = self.cache.validate(ui, &mut bounds);
        if roots.is_empty() {
            roots = self.cache.rescan(ui, &mut bounds);
        }

        let mut options = Vec::new();
        if !roots.is_empty() {
            let mut candidates = Vec::new();
            for id in roots {
                let Some(root) = ui.widget(id) else { continue };
                if root.is_hidden() {
                    continue;
                }
                collect_candidates(root, 0, &dialog, &mut candidates, &mut bounds);
            }

            // Top-to-bottom, then left-to-right reading order. Widgets with
            // no layout yet sort last.
            candidates.sort_by_key(|c| {
                c.bounds
                    .map(|b| (b.y, b.x))
                    .unwrap_or((i32::MAX, i32::MAX))
            });

            for candidate in candidates {
                if options.iter().any(|o| *o == candidate.text) {
                    continue;
                }
                options.push(candidate.text);
                union_into(&mut bounds, candidate.bounds);
                if options.len() >= MAX_OPTIONS {
                    break;
                }
            }

            bounds = ensure_height_for_options(bounds, options.len());
        }

        let bounds = bounds
            .and_then(|b| b.clamp_to_canvas(ui.canvas_width(), ui.canvas_height()));

        DialogState {
            speaker: dialog.speaker,
            line: dialog.line,
            options,
            bounds,
        }
    }
}

/// One accepted option-text widget, pre-sort.
struct Candidate {
    text: String,
    bounds: Option<Rect>,
}

fn widget_text(ui: &dyn UiSnapshot, id: WidgetId) -> String {
    normalize_opt(ui.widget(id).and_then(|w| w.text()))
}

fn union_into(acc: &mut Option<Rect>, rect: Option<Rect>) {
    if let Some(r) = rect {
        *acc = Some(match acc {
            Some(existing) => existing.union(&r),
            None => r,
        });
    }
}

fn is_header_text(lower: &str) -> bool {
    !lower.is_empty() && HEADER_PHRASES.iter().any(|p| lower.contains(p))
}

/// Depth-limited search for a header phrase anywhere in the subtree.
/// Returns the matching widget's bounds on success.
fn find_header(w: &dyn Widget, depth: u32) -> Option<Option<Rect>> {
    if w.is_hidden() || depth > MAX_WALK_DEPTH {
        return None;
    }

    let text = normalize_opt(w.text());
    if is_header_text(&text.to_lowercase()) {
        return Some(w.bounds());
    }

    for child in w
        .children()
        .into_iter()
        .chain(w.static_children())
        .chain(w.dynamic_children())
    {
        if let Some(found) = find_header(child, depth + 1) {
            return Some(found);
        }
    }

    None
}

/// Depth-limited candidate collection under one option root.
///
/// Header lines and continue prompts contribute to bounds only; everything
/// else passes the noise filters or is dropped.
fn collect_candidates(
    w: &dyn Widget,
    depth: u32,
    dialog: &DialogLine,
    out: &mut Vec<Candidate>,
    bounds: &mut Option<Rect>,
) {
    if w.is_hidden() || depth > MAX_WALK_DEPTH {
        return;
    }

    let text = normalize_opt(w.text());
    if !text.is_empty() {
        let lower = text.to_lowercase();

        if is_header_text(&lower) || lower.contains("click here to continue") {
            union_into(bounds, w.bounds());
        } else if !text.eq_ignore_ascii_case(&dialog.line)
            && !text.eq_ignore_ascii_case(&dialog.speaker)
            && !is_chat_tab_label(&lower)
            && looks_like_option_label(&text)
        {
            out.push(Candidate {
                text,
                bounds: w.bounds(),
            });
        }
    }

    // Options live in layout or dynamic children; static children hold
    // container chrome and are skipped here (the header search still looks
    // through them).
    for child in w.children().into_iter().chain(w.dynamic_children()) {
        collect_candidates(child, depth + 1, dialog, out, bounds);
    }
}

fn is_chat_tab_label(lower: &str) -> bool {
    CHAT_TAB_LABELS.contains(&lower)
}

/// Filter for label-like noise that shares containers with real options:
/// counters, ordinals, timers, toggle captions, chat lines.
fn looks_like_option_label(text: &str) -> bool {
    let s = text.trim();
    if s.len() < 2 {
        return false;
    }

    if s.eq_ignore_ascii_case("on") || s.eq_ignore_ascii_case("off") {
        return false;
    }

    if ORDINAL.is_match(s) || INTEGER.is_match(s) || TIMER.is_match(s) {
        return false;
    }

    if CHAT_LINE.is_match(s) {
        return false;
    }

    if s.to_lowercase().contains("press enter to chat") {
        return false;
    }

    true
}

/// Grow the bounds so the overlay has room for a header row plus one row per
/// option. The native container often reports a smaller rectangle than the
/// overlay actually needs.
fn ensure_height_for_options(bounds: Option<Rect>, option_count: usize) -> Option<Rect> {
    let b = bounds?;
    if option_count == 0 {
        return Some(b);
    }

    let needed = BOUNDS_TOP_PADDING
        + BOUNDS_HEADER_HEIGHT
        + BOUNDS_BOTTOM_PADDING
        + (option_count as i32) * BOUNDS_PER_OPTION_HEIGHT;

    if b.height < needed {
        Some(Rect::new(b.x, b.y, b.width, needed))
    } else {
        Some(b)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::test_utils::{FakeUi, FakeWidget};
    use crate::ui::component;

    fn ui_with_npc_dialog(name: &str, text: &str) -> FakeUi {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_NPC_NAME,
            FakeWidget::text(name).with_bounds(Rect::new(20, 380, 120, 18)),
        );
        ui.insert(
            component::DIALOG_NPC_TEXT,
            FakeWidget::text(text).with_bounds(Rect::new(20, 400, 400, 60)),
        );
        ui
    }

    fn option_root(header_y: i32, labels: &[(&str, i32, i32)]) -> FakeWidget {
        let mut children = vec![
            FakeWidget::text("Select an Option").with_bounds(Rect::new(30, header_y, 200, 18)),
        ];
        for (label, x, y) in labels {
            children.push(FakeWidget::text(label).with_bounds(Rect::new(*x, *y, 180, 20)));
        }
        FakeWidget::container(children)
    }

    #[test]
    fn npc_line_wins_over_player_line() {
        let mut ui = ui_with_npc_dialog("Bob", "Hello, adventurer.");
        ui.insert(component::DIALOG_PLAYER_TEXT, FakeWidget::text("Hi."));

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.speaker, "Bob");
        assert_eq!(state.line, "Hello, adventurer.");
    }

    #[test]
    fn player_line_uses_you_speaker() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_PLAYER_TEXT,
            FakeWidget::text("I'd like to <col=0000ff>trade</col>."),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.speaker, "You");
        assert_eq!(state.line, "I'd like to trade .");
    }

    #[test]
    fn no_dialog_widgets_yields_empty_state() {
        let ui = FakeUi::new(765, 503);
        let state = DialogExtractor::new().extract(&ui);
        assert!(state.is_empty());
        assert!(state.bounds.is_none());
    }

    #[test]
    fn options_sorted_in_reading_order() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(
                10,
                &[("Attack", 10, 50), ("Talk-to", 10, 20), ("Examine", 10, 80)],
            ),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options, vec!["Talk-to", "Attack", "Examine"]);
    }

    #[test]
    fn same_row_sorts_left_to_right() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(10, &[("Right", 200, 40), ("Left", 10, 40)]),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options, vec!["Left", "Right"]);
    }

    #[test]
    fn noise_labels_are_filtered() {
        let mut ui = FakeUi::new(765, 503);
        let labels: Vec<(&str, i32, i32)> = [
            "12:34",
            "3.",
            "42",
            "on",
            "All",
            "Trade",
            "Bob: hello there",
            "Press Enter to Chat...",
            "Yes, I'll help",
        ]
        .iter()
        .enumerate()
        .map(|(i, l)| (*l, 10, 20 + 20 * (i as i32 + 1)))
        .collect();
        ui.insert(component::DIALOG_OPTION_OPTIONS, option_root(10, &labels));

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options, vec!["Yes, I'll help"]);
    }

    #[test]
    fn speaker_and_line_are_not_options() {
        let mut ui = ui_with_npc_dialog("Bob", "Hello there.");
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(10, &[("Hello there.", 10, 30), ("Bob", 10, 50), ("Goodbye", 10, 70)]),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options, vec!["Goodbye"]);
    }

    #[test]
    fn duplicate_texts_keep_first_occurrence() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(10, &[("Yes", 10, 30), ("No", 10, 50), ("Yes", 10, 70)]),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options, vec!["Yes", "No"]);
    }

    #[test]
    fn option_list_caps_at_ten() {
        let labels: Vec<String> = (0..14).map(|i| format!("Choice {i}")).collect();
        let rows: Vec<(&str, i32, i32)> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), 10, 30 + 20 * i as i32))
            .collect();

        let mut ui = FakeUi::new(765, 1000);
        ui.insert(component::DIALOG_OPTION_OPTIONS, option_root(10, &rows));

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.options.len(), MAX_OPTIONS);
        assert_eq!(state.options[0], "Choice 0");
        assert_eq!(state.options[9], "Choice 9");
    }

    #[test]
    fn no_header_means_no_options() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            FakeWidget::container(vec![
                FakeWidget::text("Attack").with_bounds(Rect::new(10, 30, 100, 20)),
            ]),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert!(state.options.is_empty());
    }

    #[test]
    fn hidden_root_is_ignored() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(10, &[("Yes", 10, 30)]).hidden(),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert!(state.options.is_empty());
    }

    #[test]
    fn header_beyond_depth_limit_is_not_found() {
        let mut w = FakeWidget::text("Select an Option");
        for _ in 0..12 {
            w = FakeWidget::container(vec![w]);
        }
        let mut ui = FakeUi::new(765, 503);
        ui.insert(component::DIALOG_OPTION_OPTIONS, w);

        let state = DialogExtractor::new().extract(&ui);
        assert!(state.options.is_empty());
    }

    #[test]
    fn cached_root_survives_between_ticks() {
        let mut ui = FakeUi::new(765, 503);
        // Root lives at a non-canonical address only reachable via scan.
        ui.insert(
            WidgetId::new(193, 2),
            option_root(10, &[("Yes", 10, 30), ("No", 10, 50)]),
        );

        let mut extractor = DialogExtractor::new();
        let first = extractor.extract(&ui);
        assert_eq!(first.options, vec!["Yes", "No"]);
        assert_eq!(extractor.cache.roots, vec![WidgetId::new(193, 2)]);

        // Second tick reuses the cache (same result, cache unchanged).
        let second = extractor.extract(&ui);
        assert_eq!(second.options, vec!["Yes", "No"]);
        assert_eq!(extractor.cache.roots, vec![WidgetId::new(193, 2)]);
    }

    #[test]
    fn dead_ref_is_pruned_while_sibling_survives() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(WidgetId::new(219, 5), option_root(10, &[("Yes", 10, 30)]));
        ui.insert(WidgetId::new(193, 2), option_root(200, &[("No", 10, 230)]));

        let mut extractor = DialogExtractor::new();
        extractor.extract(&ui);
        assert_eq!(
            extractor.cache.roots,
            vec![WidgetId::new(219, 5), WidgetId::new(193, 2)]
        );

        // One menu closes; its ref must not linger behind the survivor.
        ui.remove(WidgetId::new(193, 2));
        extractor.extract(&ui);
        assert_eq!(extractor.cache.roots, vec![WidgetId::new(219, 5)]);
    }

    #[test]
    fn stale_cache_entry_is_replaced_by_rescan() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(WidgetId::new(193, 2), option_root(10, &[("Yes", 10, 30)]));

        let mut extractor = DialogExtractor::new();
        extractor.extract(&ui);
        assert_eq!(extractor.cache.roots, vec![WidgetId::new(193, 2)]);

        // Dialog closes; a different dialog opens elsewhere.
        let mut ui = FakeUi::new(765, 503);
        ui.insert(WidgetId::new(219, 5), option_root(10, &[("Trade", 10, 30)]));

        let state = extractor.extract(&ui);
        assert_eq!(state.options, vec!["Trade"]);
        assert_eq!(extractor.cache.roots, vec![WidgetId::new(219, 5)]);
    }

    #[test]
    fn bounds_grow_to_fit_options() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(
            component::DIALOG_OPTION_OPTIONS,
            option_root(10, &[("Yes", 30, 30), ("No", 30, 50), ("Maybe", 30, 70)]),
        );

        let state = DialogExtractor::new().extract(&ui);
        let bounds = state.bounds.unwrap();
        // 18 top + 18 header + 18 bottom + 3 * 32 rows.
        assert!(bounds.height >= 150);
    }

    #[test]
    fn bounds_clamped_to_canvas() {
        let mut ui = FakeUi::new(200, 120);
        ui.insert(
            component::DIALOG_NPC_TEXT,
            FakeWidget::text("Hi").with_bounds(Rect::new(-40, 100, 600, 600)),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.bounds, Some(Rect::new(0, 100, 200, 20)));
    }

    #[test]
    fn fully_offscreen_bounds_are_absent() {
        let mut ui = FakeUi::new(200, 120);
        ui.insert(
            component::DIALOG_NPC_TEXT,
            FakeWidget::text("Hi").with_bounds(Rect::new(500, 500, 40, 40)),
        );

        let state = DialogExtractor::new().extract(&ui);
        assert_eq!(state.line, "Hi");
        assert!(state.bounds.is_none());
    }

    #[test]
    fn quick_header_probe_uses_canonical_container() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(component::DIALOG_OPTION_OPTIONS, option_root(10, &[]));

        let extractor = DialogExtractor::new();
        assert!(extractor.has_option_header(&ui));
        assert!(!extractor.has_option_header(&FakeUi::new(765, 503)));
    }

    #[test]
    fn quick_header_probe_falls_back_to_cached_roots() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(WidgetId::new(162, 40), option_root(10, &[("Yes", 10, 30)]));

        let mut extractor = DialogExtractor::new();
        extractor.extract(&ui);
        assert!(extractor.has_option_header(&ui));
    }

    #[test]
    fn chatbox_probe_reflects_visibility() {
        let mut ui = FakeUi::new(765, 503);
        ui.insert(component::CHATBOX_INPUT, FakeWidget::text("Speak: *"));
        let extractor = DialogExtractor::new();
        assert!(extractor.chatbox_input_open(&ui));

        let mut ui = FakeUi::new(765, 503);
        ui.insert(component::CHATBOX_INPUT, FakeWidget::text("Speak: *").hidden());
        assert!(!extractor.chatbox_input_open(&ui));
    }
}
