//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).
//! Side effects the handlers ask for (renders, saves, opening links, reading
//! images) are recorded as flags and queues that the main loop drains.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use ratatui::layout::Rect;
use serde_json::Value;

use crate::app::bookmark_runtime::{BookmarkUpdate, RenderRequest, RenderedFolder};
use crate::app::settings::{ControlKind, OptionField, OPTION_FIELDS};
use crate::config::Settings;
use crate::core::{
    clock::ClockFace,
    data_url::DataUrlError,
    debounce::SaveDelay,
    grid::GridLayout,
    page::{Background, PageModel, Rgb},
    range::RangePair,
    select::SelectWidget,
};

/// Stand-in colour for the bundled background picture.
const DEFAULT_BACKDROP: Rgb = Rgb {
    r: 0x3b,
    g: 0x4a,
    b: 0x5c,
};

/// A custom background's data URL, which has to be decoded for its colour.
fn custom_background(page: &PageModel) -> Option<String> {
    match &page.background {
        Background::Default => None,
        Background::Custom(url) => Some(url.clone()),
    }
}

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    NewTab,
    Options,
}

// ───────────────────────────────────────── new tab ───────────

/// The landing view: clock, date and the bookmark grid.
pub struct NewTabState {
    pub settings: Settings,
    pub page: PageModel,
    /// Colour standing in for the background picture.
    pub backdrop: Rgb,
    /// Custom background waiting to be decoded off the event loop.
    pub pending_backdrop: Option<String>,
    pub clock: ClockFace,
    /// Tiles of the displayed folder.
    pub grid: GridLayout,
    pub folder_id: String,
    /// Title of the displayed folder, empty at the root.
    pub folder_title: String,
    /// Parent of the displayed folder; `Some` means the back affordance shows.
    pub back_target: Option<String>,
    /// Focused tile as (col, row).
    pub focus: Option<(usize, usize)>,
    /// Set once the user navigates with the keyboard; new grids then get
    /// their first tile focused.
    pub keyboard_mode: bool,
    /// Location fragment (`#<folder id>`, or empty).
    pub fragment: String,
    /// Previous fragments, most recent last.
    pub history: Vec<String>,
    /// A render is in flight.
    pub rendering: bool,
    /// A handler asked for the grid to be rebuilt.
    pub needs_render: bool,
    /// The grid is hidden while a render is in flight.
    pub grid_visible: bool,
}

impl NewTabState {
    pub fn new(settings: Settings, now: NaiveDateTime) -> Self {
        let page = PageModel::from_settings(&settings);
        let clock = ClockFace::at(now, page.military_time);
        Self {
            settings,
            backdrop: DEFAULT_BACKDROP,
            pending_backdrop: custom_background(&page),
            page,
            clock,
            grid: GridLayout::default(),
            folder_id: String::new(),
            folder_title: String::new(),
            back_target: None,
            focus: None,
            keyboard_mode: false,
            fragment: String::new(),
            history: Vec::new(),
            rendering: false,
            needs_render: true,
            grid_visible: false,
        }
    }

    /// Swap in a new settings snapshot and redraw everything from it.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.page = PageModel::from_settings(&settings);
        if settings.background_image != self.settings.background_image {
            self.pending_backdrop = custom_background(&self.page);
            if self.pending_backdrop.is_none() {
                self.backdrop = DEFAULT_BACKDROP;
            }
        }
        self.settings = settings;
        self.needs_render = true;
    }

    /// Take the decoded colour of `url`, unless the background has changed
    /// since it was requested.
    pub fn finish_backdrop(&mut self, url: &str, color: Option<Rgb>) {
        if !matches!(&self.page.background, Background::Custom(current) if current == url) {
            return;
        }
        self.backdrop = color.unwrap_or_else(|| {
            tracing::warn!("custom background could not be decoded");
            DEFAULT_BACKDROP
        });
    }

    pub fn tick(&mut self, now: NaiveDateTime) {
        self.clock = ClockFace::at(now, self.page.military_time);
    }

    /// Folder the current fragment points at.
    pub fn requested_folder(&self) -> String {
        self.settings
            .special_folders()
            .folder_for_fragment(&self.fragment)
    }

    pub fn back_visible(&self) -> bool {
        self.back_target.is_some()
    }

    /// Open folder `id` (like following a `#id` link).
    pub fn open_folder(&mut self, id: &str) {
        let next = format!("#{id}");
        if next == self.fragment {
            return;
        }
        let previous = std::mem::replace(&mut self.fragment, next);
        self.history.push(previous);
        self.needs_render = true;
    }

    /// Follow the back affordance: step back through history, or to the
    /// parent folder when there is no history to go back to.
    pub fn go_back(&mut self) {
        if let Some(previous) = self.history.pop() {
            self.fragment = previous;
        } else if let Some(parent) = &self.back_target {
            self.fragment = format!("#{parent}");
        } else {
            return;
        }
        self.needs_render = true;
    }

    /// Turn a pending render request into a fetch, unless one is already in
    /// flight, in which case the request is dropped for good.
    pub fn begin_render(&mut self) -> Option<RenderRequest> {
        if !self.needs_render {
            return None;
        }
        self.needs_render = false;

        if !self.page.visibility.bookmarks {
            return None;
        }
        if self.rendering {
            tracing::debug!("render of {} dropped, another is in flight", self.fragment);
            return None;
        }

        self.rendering = true;
        self.grid_visible = false;
        self.grid = GridLayout::default();
        self.focus = None;
        Some(RenderRequest {
            folder_id: self.requested_folder(),
            columns: self.page.columns,
            folders: self.settings.special_folders(),
        })
    }

    pub fn finish_render(&mut self, update: BookmarkUpdate) {
        self.rendering = false;
        self.grid_visible = true;
        match update.result {
            Ok(RenderedFolder {
                folder_id,
                layout,
                title,
                back_target,
            }) => {
                tracing::debug!("showing folder {folder_id} ({} tiles)", layout.tile_count());
                self.folder_id = folder_id;
                self.grid = layout;
                self.folder_title = title;
                self.back_target = back_target;
                self.focus = (self.keyboard_mode && self.grid.first_tile().is_some())
                    .then_some((0, 0));
            }
            Err(e) => {
                tracing::warn!("could not load bookmarks: {e}");
                self.grid = GridLayout::default();
                self.folder_title.clear();
                self.back_target = None;
            }
        }
    }
}

// ───────────────────────────────────────── options ───────────

/// Editing state of one form field.
#[derive(Debug, Clone)]
pub enum Control {
    Checkbox(bool),
    Range {
        pair: RangePair,
        /// Keyboard focus is in the number field rather than the slider.
        editing_number: bool,
    },
    Text(String),
    Color(String),
    Select(SelectWidget),
    File {
        /// Path being typed.
        input: String,
        /// A custom image is currently saved.
        has_image: bool,
    },
}

impl Control {
    /// Control for `field` showing `value`.
    fn load(field: &OptionField, value: Option<Value>) -> Self {
        match field.kind {
            ControlKind::Checkbox => {
                Control::Checkbox(value.and_then(|v| v.as_bool()).unwrap_or(false))
            }
            ControlKind::Range { min, max, .. } => Control::Range {
                pair: RangePair::new(min, max, value.and_then(|v| v.as_i64()).unwrap_or(min)),
                editing_number: false,
            },
            ControlKind::Text => Control::Text(as_string(value)),
            ControlKind::Color => Control::Color(as_string(value)),
            ControlKind::Select(entries) => {
                let mut widget = SelectWidget::new(entries());
                if let Some(v) = value.as_ref().and_then(Value::as_str) {
                    widget.select_value(v);
                }
                Control::Select(widget)
            }
            ControlKind::File => Control::File {
                input: String::new(),
                has_image: !as_string(value).is_empty(),
            },
        }
    }
}

fn as_string(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

/// One line of the options form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Section(&'static str),
    /// Index into [`OPTION_FIELDS`].
    Field(usize),
}

/// A settings write the main loop should hand to the debouncer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub key: &'static str,
    pub value: Value,
    pub delay: SaveDelay,
}

/// The options form.
pub struct OptionsState {
    pub settings: Settings,
    /// One control per entry of [`OPTION_FIELDS`].
    pub controls: Vec<Control>,
    /// Index into [`OPTION_FIELDS`] of the focused field (always visible).
    pub focused: usize,
    /// First visible row of the form.
    pub offset: usize,
    pub pending_saves: Vec<PendingSave>,
    /// Image file the user asked to use as the background.
    pub pending_image: Option<PathBuf>,
    pub status_message: Option<String>,
}

impl OptionsState {
    pub fn new(settings: Settings) -> Self {
        let controls = OPTION_FIELDS
            .iter()
            .map(|f| Control::load(f, settings.get(f.key)))
            .collect();
        Self {
            settings,
            controls,
            focused: 0,
            offset: 0,
            pending_saves: Vec::new(),
            pending_image: None,
            status_message: None,
        }
    }

    /// Whether field `idx` is shown (its controlling checkbox, if any, is on).
    pub fn is_visible(&self, idx: usize) -> bool {
        let Some(field) = OPTION_FIELDS.get(idx) else {
            return false;
        };
        match field.shown_when {
            None => true,
            Some(parent) => OPTION_FIELDS
                .iter()
                .position(|f| f.key == parent)
                .is_some_and(|p| self.is_visible(p) && matches!(self.controls[p], Control::Checkbox(true))),
        }
    }

    /// Indices of visible fields, in display order.
    pub fn visible_fields(&self) -> Vec<usize> {
        (0..OPTION_FIELDS.len()).filter(|&i| self.is_visible(i)).collect()
    }

    /// Section headings and visible fields, in display order.
    pub fn form_rows(&self) -> Vec<FormRow> {
        let mut rows = Vec::new();
        let mut section = "";
        for idx in self.visible_fields() {
            let field = &OPTION_FIELDS[idx];
            if field.section != section {
                section = field.section;
                rows.push(FormRow::Section(section));
            }
            rows.push(FormRow::Field(idx));
        }
        rows
    }

    /// Scroll so the focused field (and its section heading, when it is the
    /// first of its section) fits in a viewport of `height` rows.
    pub fn scroll_to_focus(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let rows = self.form_rows();
        let Some(pos) = rows.iter().position(|r| *r == FormRow::Field(self.focused)) else {
            return;
        };
        let top = match pos.checked_sub(1).map(|p| rows[p]) {
            Some(FormRow::Section(_)) => pos - 1,
            _ => pos,
        };
        if top < self.offset {
            self.offset = top;
        } else if pos >= self.offset + height {
            self.offset = pos + 1 - height;
        }
        self.offset = self.offset.min(rows.len().saturating_sub(height));
    }

    pub fn focused_field(&self) -> &'static OptionField {
        &OPTION_FIELDS[self.focused]
    }

    /// Record an edit: advance the settings snapshot and queue the save.
    /// Values the schema rejects are dropped.
    pub fn update(&mut self, key: &'static str, value: Value, delay: SaveDelay) -> bool {
        match self.settings.with_value(key, value.clone()) {
            Some(next) => {
                self.settings = next;
                self.pending_saves.push(PendingSave { key, value, delay });
                true
            }
            None => {
                tracing::debug!("rejected value for {key}: {value}");
                false
            }
        }
    }

    /// Result of reading the image file the user picked.
    pub fn apply_image(&mut self, result: Result<String, DataUrlError>) {
        match result {
            Ok(url) => {
                self.update("backgroundImage", Value::String(url), SaveDelay::Immediate);
                if let Some(Control::File { input, has_image }) = self.control_mut("backgroundImage") {
                    input.clear();
                    *has_image = true;
                }
                self.status_message = Some("Background image updated".into());
            }
            Err(e) => {
                tracing::warn!("background image rejected: {e}");
                self.status_message = Some(format!("Could not use image: {e}"));
            }
        }
    }

    fn control_mut(&mut self, key: &str) -> Option<&mut Control> {
        let idx = OPTION_FIELDS.iter().position(|f| f.key == key)?;
        self.controls.get_mut(idx)
    }

    /// Keep focus on a visible field after visibility changed.
    pub fn fix_focus(&mut self) {
        if self.is_visible(self.focused) {
            return;
        }
        let visible = self.visible_fields();
        self.focused = visible
            .iter()
            .rev()
            .find(|&&i| i < self.focused)
            .or_else(|| visible.first())
            .copied()
            .unwrap_or(0);
    }
}

// ───────────────────────────────────────── top level ─────────

/// Top-level application state.
pub struct AppState {
    pub active_view: ActiveView,
    pub new_tab: NewTabState,
    /// Present while the options view is open.
    pub options: Option<OptionsState>,
    /// Leaving the options view returns to the new-tab view instead of
    /// quitting.
    pub options_return_to_new_tab: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Link the user activated, to be opened by the main loop.
    pub open_url: Option<String>,
    /// Last drawn terminal area, for mouse hit-testing.
    pub terminal_area: Rect,
}

impl AppState {
    pub fn new(settings: Settings, now: NaiveDateTime) -> Self {
        Self {
            active_view: ActiveView::NewTab,
            new_tab: NewTabState::new(settings, now),
            options: None,
            options_return_to_new_tab: true,
            should_quit: false,
            open_url: None,
            terminal_area: Rect::default(),
        }
    }

    /// Start directly in the options view; closing it quits.
    pub fn new_in_options(settings: Settings, now: NaiveDateTime) -> Self {
        let mut state = Self::new(settings, now);
        state.open_options();
        state.options_return_to_new_tab = false;
        state
    }

    pub fn open_options(&mut self) {
        self.options = Some(OptionsState::new(self.new_tab.settings.clone()));
        self.options_return_to_new_tab = true;
        self.active_view = ActiveView::Options;
    }

    /// Leave the options view, carrying its settings back to the new tab.
    pub fn close_options(&mut self) {
        if !self.options_return_to_new_tab {
            self.should_quit = true;
            return;
        }
        if let Some(options) = self.options.take() {
            self.new_tab.apply_settings(options.settings);
        }
        self.active_view = ActiveView::NewTab;
    }
}
