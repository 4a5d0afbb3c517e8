//! Input handling — maps key/mouse events to state mutations.

use std::path::PathBuf;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use serde_json::Value;

use crate::core::debounce::SaveDelay;
use crate::core::grid::TileKind;
use crate::core::navigator::{self, Direction, NavKey, NavOutcome};
use crate::core::page::Rgb;
use crate::core::select::{SelectEvent, SelectKey};
use crate::ui::layout::{contains, NewTabLayout, OptionsHit, OptionsLayout};

use super::settings::{ControlKind, OPTION_FIELDS};
use super::state::{ActiveView, AppState, Control, OptionsState};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::NewTab => handle_new_tab_key(state, key),
        ActiveView::Options => handle_options_key(state, key),
    }
}

// ── New tab ─────────────────────────────────────────────────────

fn handle_new_tab_key(state: &mut AppState, key: KeyEvent) {
    let nav = match key.code {
        KeyCode::Left => NavKey::Move(Direction::Left),
        KeyCode::Right => NavKey::Move(Direction::Right),
        KeyCode::Up => NavKey::Move(Direction::Up),
        KeyCode::Down => NavKey::Move(Direction::Down),
        KeyCode::Backspace | KeyCode::Esc => NavKey::Back,
        KeyCode::Enter => {
            activate_focused(state);
            return;
        }
        KeyCode::Char('q') => {
            state.should_quit = true;
            return;
        }
        KeyCode::Char('o') | KeyCode::Char(',') => {
            state.open_options();
            return;
        }
        _ => return,
    };

    let tab = &mut state.new_tab;
    let outcome = navigator::handle_key(
        &tab.grid,
        tab.focus,
        nav,
        tab.page.alignment,
        tab.back_visible(),
    );
    match outcome {
        NavOutcome::Focus(col, row) => {
            tab.focus = Some((col, row));
            tab.keyboard_mode = true;
        }
        NavOutcome::Back => {
            tab.keyboard_mode = true;
            tab.go_back();
        }
        NavOutcome::Ignored => {}
    }
}

/// Follow the focused tile: open a folder in place, or hand a link to the
/// main loop.
fn activate_focused(state: &mut AppState) {
    let tab = &mut state.new_tab;
    let Some((col, row)) = tab.focus else {
        return;
    };
    let Some(tile) = tab.grid.tile(col, row) else {
        return;
    };
    match &tile.kind {
        TileKind::Folder { target_id } => {
            let target = target_id.clone();
            tab.open_folder(&target);
        }
        TileKind::Link { url } => state.open_url = Some(url.clone()),
    }
}

// ── Options ─────────────────────────────────────────────────────

fn handle_options_key(state: &mut AppState, key: KeyEvent) {
    let height = OptionsLayout::from_area(state.terminal_area).visible_rows();
    let Some(options) = state.options.as_mut() else {
        return;
    };

    if handle_control_key(options, key) {
        options.scroll_to_focus(height);
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => move_focus(options, 1),
        KeyCode::BackTab | KeyCode::Up => move_focus(options, -1),
        KeyCode::Esc => {
            finish_number_entry(options);
            state.close_options();
            return;
        }
        _ => return,
    }
    options.scroll_to_focus(height);
}

/// Give the focused control first go at a key. Returns `true` if it used it.
fn handle_control_key(options: &mut OptionsState, key: KeyEvent) -> bool {
    let idx = options.focused;
    let field = &OPTION_FIELDS[idx];
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::ALT | KeyModifiers::CONTROL);

    match &mut options.controls[idx] {
        Control::Checkbox(on) => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                *on = !*on;
                let value = Value::Bool(*on);
                options.update(field.key, value, SaveDelay::Immediate);
                options.fix_focus();
                true
            }
            _ => false,
        },

        Control::Range {
            pair,
            editing_number,
        } => {
            let ControlKind::Range { step, .. } = field.kind else {
                return false;
            };
            let saved = if *editing_number {
                let typed = match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => pair.push_digit(c),
                    KeyCode::Backspace => pair.pop_digit(),
                    KeyCode::Up => Some(pair.step(1)),
                    KeyCode::Down => Some(pair.step(-1)),
                    KeyCode::Enter | KeyCode::Esc => {
                        pair.end_number_entry();
                        *editing_number = false;
                        return true;
                    }
                    _ => return false,
                };
                typed.map(|v| (v, SaveDelay::Slider))
            } else {
                match key.code {
                    KeyCode::Left => Some((pair.step(-step), SaveDelay::Slider)),
                    KeyCode::Right => Some((pair.step(step), SaveDelay::Slider)),
                    KeyCode::Home => Some((pair.set_from_slider(i64::MIN), SaveDelay::Slider)),
                    KeyCode::End => Some((pair.set_from_slider(i64::MAX), SaveDelay::Slider)),
                    KeyCode::Char(c) if plain && (c.is_ascii_digit() || c == '-') => {
                        pair.begin_number_entry();
                        *editing_number = true;
                        pair.push_digit(c).map(|v| (v, SaveDelay::Slider))
                    }
                    KeyCode::Backspace | KeyCode::Delete => {
                        pair.begin_number_entry();
                        *editing_number = true;
                        None
                    }
                    _ => return false,
                }
            };
            if let Some((value, delay)) = saved {
                options.update(field.key, Value::from(value), delay);
            }
            true
        }

        Control::Text(text) => {
            if !edit_text(text, key, None) {
                return false;
            }
            let value = Value::String(text.clone());
            options.update(field.key, value, SaveDelay::Typing);
            true
        }

        Control::Color(text) => {
            if !edit_text(text, key, Some(7)) {
                return false;
            }
            // Half-typed colours stay local until they form `#rrggbb`.
            if text.len() == 7 && text.starts_with('#') && Rgb::parse(text).is_some() {
                let value = Value::String(text.clone());
                options.update(field.key, value, SaveDelay::Typing);
            }
            true
        }

        Control::File { input, has_image } => match key.code {
            KeyCode::Enter if !input.trim().is_empty() => {
                options.pending_image = Some(expand_home(input.trim()));
                options.status_message = Some("Reading image…".into());
                true
            }
            KeyCode::Delete => {
                input.clear();
                *has_image = false;
                options.update(field.key, Value::String(String::new()), SaveDelay::Immediate);
                options.status_message = Some("Background reset".into());
                true
            }
            _ => edit_text(input, key, None),
        },

        Control::Select(widget) => {
            let select_key = match key.code {
                KeyCode::Enter => SelectKey::Enter,
                KeyCode::Esc => SelectKey::Escape,
                KeyCode::Char(' ') => SelectKey::Space,
                KeyCode::Up => SelectKey::Up,
                KeyCode::Down => SelectKey::Down,
                KeyCode::Char(c) => SelectKey::Char(c),
                _ => return false,
            };
            let was_open = widget.is_open();
            let modified = key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::CONTROL | KeyModifiers::SHIFT);
            let response = widget.handle(SelectEvent::Key {
                key: select_key,
                modified,
            });
            if let Some(commit) = response.commit {
                options.update(field.key, Value::String(commit.value), commit.delay);
            }
            // Escape on a closed list leaves the form; everything else the
            // control reacts to stays with it.
            response.prevent_default
                || select_key == SelectKey::Enter
                || (select_key == SelectKey::Escape && was_open)
        }
    }
}

/// Typing into a text-like control. Returns `true` if the text changed.
fn edit_text(text: &mut String, key: KeyEvent, max_len: Option<usize>) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            if max_len.is_some_and(|max| text.chars().count() >= max) {
                return false;
            }
            text.push(c);
            true
        }
        KeyCode::Backspace => text.pop().is_some(),
        _ => false,
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

fn move_focus(options: &mut OptionsState, delta: isize) {
    let visible = options.visible_fields();
    let Some(pos) = visible.iter().position(|&i| i == options.focused) else {
        options.fix_focus();
        return;
    };
    let Some(next) = pos.checked_add_signed(delta).and_then(|p| visible.get(p)) else {
        return;
    };
    set_focus(options, *next, SelectEvent::FocusIn);
}

/// Move focus to `field`, telling select controls they lost or gained it.
fn set_focus(options: &mut OptionsState, field: usize, arrive: SelectEvent) {
    if field == options.focused {
        return;
    }
    finish_number_entry(options);
    if let Control::Select(widget) = &mut options.controls[options.focused] {
        widget.handle(SelectEvent::Blur);
    }
    options.focused = field;
    if let Control::Select(widget) = &mut options.controls[field] {
        widget.handle(arrive);
    }
}

fn finish_number_entry(options: &mut OptionsState) {
    if let Control::Range {
        pair,
        editing_number,
    } = &mut options.controls[options.focused]
    {
        if *editing_number {
            pair.end_number_entry();
            *editing_number = false;
        }
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    match state.active_view {
        ActiveView::NewTab => handle_new_tab_click(state, mouse.column, mouse.row),
        ActiveView::Options => handle_options_click(state, mouse.column, mouse.row),
    }
}

fn handle_new_tab_click(state: &mut AppState, x: u16, y: u16) {
    let layout = NewTabLayout::compute(state.terminal_area, &state.new_tab);

    if layout.settings_button.is_some_and(|r| contains(r, x, y)) {
        state.open_options();
        return;
    }
    if layout.back_button.is_some_and(|r| contains(r, x, y)) {
        state.new_tab.go_back();
        return;
    }
    if let Some((col, row)) = layout.tile_at(&state.new_tab.grid, x, y) {
        state.new_tab.focus = Some((col, row));
        state.new_tab.keyboard_mode = false;
        activate_focused(state);
    }
}

fn handle_options_click(state: &mut AppState, x: u16, y: u16) {
    let layout = OptionsLayout::from_area(state.terminal_area);
    let Some(options) = state.options.as_mut() else {
        return;
    };

    match layout.hit_test(options, x, y) {
        Some(OptionsHit::DropdownEntry { field, entry }) => {
            if let Control::Select(widget) = &mut options.controls[field] {
                let commit = widget.handle(SelectEvent::PointerDownEntry(entry)).commit;
                // The press lands outside the control, which takes focus off it.
                widget.handle(SelectEvent::Blur);
                if let Some(commit) = commit {
                    options.update(OPTION_FIELDS[field].key, Value::String(commit.value), commit.delay);
                }
            }
        }
        Some(OptionsHit::Dropdown) => {}
        Some(OptionsHit::Field { field, on_control }) => {
            if on_control && matches!(options.controls[field], Control::Select(_)) {
                if field == options.focused {
                    if let Control::Select(widget) = &mut options.controls[field] {
                        widget.handle(SelectEvent::PointerDown);
                    }
                } else {
                    // Press, then the focus it brings.
                    finish_number_entry(options);
                    if let Control::Select(widget) = &mut options.controls[options.focused] {
                        widget.handle(SelectEvent::Blur);
                    }
                    options.focused = field;
                    if let Control::Select(widget) = &mut options.controls[field] {
                        widget.handle(SelectEvent::PointerDown);
                        widget.handle(SelectEvent::FocusIn);
                    }
                }
                return;
            }
            set_focus(options, field, SelectEvent::FocusIn);
            if on_control {
                click_control(options, field);
            }
        }
        None => {
            if let Control::Select(widget) = &mut options.controls[options.focused] {
                widget.handle(SelectEvent::Blur);
            }
        }
    }
}

/// A press on a control that reacts to being clicked.
fn click_control(options: &mut OptionsState, field: usize) {
    if let Control::Checkbox(on) = &mut options.controls[field] {
        *on = !*on;
        let value = Value::Bool(*on);
        options.update(OPTION_FIELDS[field].key, value, SaveDelay::Immediate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bookmark_runtime::{BookmarkUpdate, RenderedFolder};
    use crate::config::Settings;
    use crate::core::bookmarks::BookmarkTree;
    use crate::core::grid::GridLayout;
    use ratatui::layout::Rect;
    use serde_json::json;

    fn now() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Seven links and a folder in the bookmarks bar, five per row.
    fn app() -> AppState {
        let mut tree = BookmarkTree::new();
        for i in 0..7 {
            tree.add_link("1", &format!("{}", 10 + i), &format!("site {i}"), &format!("https://s{i}.example/"));
        }
        tree.add_folder("1", "30", "Reading");
        let settings = Settings::default();
        let layout = GridLayout::build(
            "1",
            &tree.children("1").unwrap(),
            settings.columns(),
            &settings.special_folders(),
        );
        let mut state = AppState::new(settings, now());
        state.terminal_area = Rect::new(0, 0, 120, 40);
        state.new_tab.begin_render();
        state.new_tab.finish_render(BookmarkUpdate {
            result: Ok(RenderedFolder {
                folder_id: "1".into(),
                layout,
                title: String::new(),
                back_target: None,
            }),
        });
        state
    }

    fn field(key: &str) -> usize {
        OPTION_FIELDS.iter().position(|f| f.key == key).unwrap()
    }

    #[test]
    fn arrows_move_focus_and_enable_keyboard_mode() {
        let mut state = app();
        handle_key(&mut state, press(KeyCode::Right));
        assert_eq!(state.new_tab.focus, Some((0, 0)));
        assert!(state.new_tab.keyboard_mode);
        handle_key(&mut state, press(KeyCode::Down));
        assert_eq!(state.new_tab.focus, Some((0, 1)));
        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.new_tab.focus, Some((4, 0)));
    }

    #[test]
    fn enter_opens_links_and_folders() {
        let mut state = app();
        state.new_tab.focus = Some((1, 0));
        handle_key(&mut state, press(KeyCode::Enter));
        assert_eq!(state.open_url.as_deref(), Some("https://s1.example/"));

        state.new_tab.focus = Some((2, 1));
        handle_key(&mut state, press(KeyCode::Enter));
        assert_eq!(state.new_tab.fragment, "#30");
        assert!(state.new_tab.needs_render);
    }

    #[test]
    fn back_is_ignored_at_the_root() {
        let mut state = app();
        handle_key(&mut state, press(KeyCode::Backspace));
        assert!(!state.new_tab.needs_render);
        assert_eq!(state.new_tab.focus, None);
    }

    #[test]
    fn clicking_a_tile_activates_it() {
        let mut state = app();
        let layout = NewTabLayout::compute(state.terminal_area, &state.new_tab);
        let r = layout.tile_rect(&state.new_tab.grid, 3, 0).unwrap();
        handle_mouse(&mut state, click(r.x, r.y));
        assert_eq!(state.new_tab.focus, Some((3, 0)));
        assert_eq!(state.open_url.as_deref(), Some("https://s3.example/"));

        let button = layout.settings_button.unwrap();
        handle_mouse(&mut state, click(button.x, button.y));
        assert_eq!(state.active_view, ActiveView::Options);
    }

    #[test]
    fn quit_keys() {
        let mut state = app();
        handle_key(&mut state, press(KeyCode::Char('q')));
        assert!(state.should_quit);

        let mut state = app();
        state.open_options();
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[test]
    fn checkbox_toggle_saves_immediately_and_hides_dependents() {
        let mut state = app();
        state.open_options();
        let options = state.options.as_mut().unwrap();
        options.focused = field("showTime");
        handle_key(&mut state, press(KeyCode::Char(' ')));

        let options = state.options.as_ref().unwrap();
        assert_eq!(options.pending_saves.len(), 1);
        assert_eq!(options.pending_saves[0].key, "showTime");
        assert_eq!(options.pending_saves[0].value, json!(false));
        assert_eq!(options.pending_saves[0].delay, SaveDelay::Immediate);
        assert!(!options.is_visible(field("showSeconds")));

        handle_key(&mut state, press(KeyCode::Tab));
        assert_eq!(state.options.as_ref().unwrap().focused, field("showWeekday"));
    }

    #[test]
    fn slider_and_number_entry() {
        let mut state = app();
        state.open_options();
        state.options.as_mut().unwrap().focused = field("zoomLevel");

        handle_key(&mut state, press(KeyCode::Right));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.settings.zoom_level, 110);
        assert_eq!(options.pending_saves[0].delay, SaveDelay::Slider);

        // Typing replaces the number; out-of-range input clamps.
        handle_key(&mut state, press(KeyCode::Char('3')));
        handle_key(&mut state, press(KeyCode::Char('0')));
        handle_key(&mut state, press(KeyCode::Char('0')));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.settings.zoom_level, 200);
        assert_eq!(options.pending_saves.last().unwrap().delay, SaveDelay::Slider);
        match &options.controls[field("zoomLevel")] {
            Control::Range { pair, editing_number } => {
                assert!(*editing_number);
                assert!(pair.is_invalid());
                assert_eq!(pair.number_text(), "300");
            }
            other => panic!("unexpected {other:?}"),
        }

        // Clearing the field saves nothing.
        handle_key(&mut state, press(KeyCode::Backspace));
        handle_key(&mut state, press(KeyCode::Backspace));
        let saves = state.options.as_ref().unwrap().pending_saves.len();
        handle_key(&mut state, press(KeyCode::Backspace));
        assert_eq!(state.options.as_ref().unwrap().pending_saves.len(), saves);
        assert_eq!(state.options.as_ref().unwrap().settings.zoom_level, 50);

        handle_key(&mut state, press(KeyCode::Tab));
        match &state.options.as_ref().unwrap().controls[field("zoomLevel")] {
            Control::Range { pair, editing_number } => {
                assert!(!*editing_number);
                assert_eq!(pair.number_text(), "50");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn select_keys_commit_with_typing_delay() {
        let mut state = app();
        state.open_options();
        state.options.as_mut().unwrap().focused = field("mainFont");

        handle_key(&mut state, press(KeyCode::Down));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.focused, field("mainFont"), "arrows stay in the select");
        assert_eq!(options.settings.main_font, "Lato");
        assert_eq!(options.pending_saves[0].delay, SaveDelay::Typing);

        handle_key(&mut state, press(KeyCode::Char('r')));
        assert_eq!(state.options.as_ref().unwrap().settings.main_font, "Raleway");

        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(state.active_view, ActiveView::NewTab);
        assert_eq!(state.new_tab.settings.main_font, "Raleway");
    }

    #[test]
    fn tab_into_select_opens_it() {
        let mut state = app();
        state.open_options();
        state.options.as_mut().unwrap().focused = field("textColor");
        handle_key(&mut state, press(KeyCode::Tab));
        let options = state.options.as_ref().unwrap();
        assert!(matches!(&options.controls[field("mainFont")], Control::Select(w) if w.is_open()));

        handle_key(&mut state, press(KeyCode::Tab));
        let options = state.options.as_ref().unwrap();
        assert!(matches!(&options.controls[field("mainFont")], Control::Select(w) if !w.is_open()));
        assert!(matches!(&options.controls[field("accentFont")], Control::Select(w) if w.is_open()));
    }

    #[test]
    fn color_saves_only_complete_hex() {
        let mut state = app();
        state.open_options();
        let options = state.options.as_mut().unwrap();
        options.focused = field("textColor");
        for _ in 0..7 {
            handle_key(&mut state, press(KeyCode::Backspace));
        }
        for c in "#12ab3".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)));
        }
        assert!(state.options.as_ref().unwrap().pending_saves.is_empty());
        handle_key(&mut state, press(KeyCode::Char('f')));
        handle_key(&mut state, press(KeyCode::Char('f')));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.settings.text_color, "#12ab3f");
        assert_eq!(options.pending_saves.len(), 1);
    }

    #[test]
    fn file_field_requests_image_read() {
        let mut state = app();
        state.open_options();
        state.options.as_mut().unwrap().focused = field("backgroundImage");
        for c in "/tmp/bg.png".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)));
        }
        handle_key(&mut state, press(KeyCode::Enter));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.pending_image, Some(PathBuf::from("/tmp/bg.png")));
        assert!(options.pending_saves.is_empty());
    }

    #[test]
    fn clicking_dropdown_entry_commits_immediately() {
        let mut state = app();
        state.open_options();
        let layout = OptionsLayout::from_area(state.terminal_area);
        let font = field("accentFont");
        let control = layout
            .control_rect(state.options.as_ref().unwrap(), font)
            .unwrap();
        handle_mouse(&mut state, click(control.x, control.y));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.focused, font);
        assert!(matches!(&options.controls[font], Control::Select(w) if w.is_open()));

        let (_, popup) = layout.dropdown(options).unwrap();
        handle_mouse(&mut state, click(popup.x + 1, popup.y + 4));
        let options = state.options.as_ref().unwrap();
        assert_eq!(options.settings.accent_font, "Pacifico");
        assert_eq!(options.pending_saves[0].delay, SaveDelay::Immediate);
        assert!(matches!(&options.controls[font], Control::Select(w) if !w.is_open()));
    }
}
