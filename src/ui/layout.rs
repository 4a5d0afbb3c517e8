//! Layout helpers — split the terminal area into regions.
//!
//! Both views compute their geometry here so that drawing and mouse
//! hit-testing always agree on where things are.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::state::{Control, FormRow, NewTabState, OptionsState};
use crate::core::grid::{Alignment, GridLayout};

pub const SETTINGS_BUTTON_LABEL: &str = " ⚙ Options ";
pub const BACK_BUTTON_LABEL: &str = "‹ Back";

// ───────────────────────────────────────── new tab ───────────

/// Where each part of the landing view goes. Hidden parts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTabLayout {
    pub settings_button: Option<Rect>,
    pub time: Option<Rect>,
    pub weekday: Option<Rect>,
    pub date: Option<Rect>,
    /// Folder title row.
    pub header: Option<Rect>,
    pub back_button: Option<Rect>,
    pub grid: Option<Rect>,
    pub tile_width: u16,
    pub tile_height: u16,
    pub alignment: Alignment,
    max_columns: u16,
}

impl NewTabLayout {
    pub fn compute(area: Rect, tab: &NewTabState) -> Self {
        let page = &tab.page;
        let vis = page.visibility;

        let settings_button = vis.settings_button.then(|| {
            let width = (SETTINGS_BUTTON_LABEL.chars().count() as u16).min(area.width);
            Rect::new(area.right().saturating_sub(width), area.y, width, 1)
        });

        let tile_width = page.column_cells();
        let lines = u16::from(page.show_icons) + u16::from(page.show_labels);
        let tile_height = lines.max(1) + 1;

        let show_grid = vis.bookmarks && tab.grid_visible;
        let max_columns = u16::try_from(tab.grid.max_columns()).unwrap_or(u16::MAX);
        let grid_rows = u16::try_from(tab.grid.row_count()).unwrap_or(u16::MAX);
        let show_header = show_grid && (tab.back_visible() || !tab.folder_title.is_empty());

        let clock_lines = u16::from(vis.time) + u16::from(vis.weekday) + u16::from(vis.date);
        let gap = u16::from(clock_lines > 0 && show_grid);
        let grid_height = if show_grid {
            grid_rows.saturating_mul(tile_height)
        } else {
            0
        };
        let total = (clock_lines + gap + u16::from(show_header)).saturating_add(grid_height);

        // Row 0 belongs to the settings button.
        let body = Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        };
        let mut y = body.y + body.height.saturating_sub(total) / 2;
        let mut take = |height: u16| {
            let rect = Rect::new(body.x, y, body.width, height).intersection(body);
            y = y.saturating_add(height);
            rect
        };

        let time = vis.time.then(|| take(1));
        let weekday = vis.weekday.then(|| take(1));
        let date = vis.date.then(|| take(1));
        take(gap);
        let header = show_header.then(|| take(1));

        let grid_width = max_columns.saturating_mul(tile_width).min(body.width);
        let grid_x = body.x + (body.width - grid_width) / 2;
        let grid = show_grid.then(|| {
            let rect = take(grid_height);
            Rect {
                x: grid_x,
                width: grid_width,
                ..rect
            }
        });

        let back_button = header.filter(|_| tab.back_visible()).map(|h| {
            let width = (BACK_BUTTON_LABEL.chars().count() as u16).min(h.width);
            Rect::new(grid_x.min(h.right().saturating_sub(width)), h.y, width, 1)
        });

        Self {
            settings_button,
            time,
            weekday,
            date,
            header,
            back_button,
            grid,
            tile_width,
            tile_height,
            alignment: page.alignment,
            max_columns,
        }
    }

    /// Screen area of the tile at (`col`, `row`), if it is on screen.
    ///
    /// Short rows are shifted according to the alignment, by whole tiles for
    /// right alignment and by half the shortfall for centre alignment.
    pub fn tile_rect(&self, grid: &GridLayout, col: usize, row: usize) -> Option<Rect> {
        let area = self.grid?;
        grid.tile(col, row)?;
        let row_len = u16::try_from(grid.column_count(row)?).ok()?;
        let shortfall = self
            .max_columns
            .saturating_sub(row_len)
            .saturating_mul(self.tile_width);
        let shift = match self.alignment {
            Alignment::Left => 0,
            Alignment::Center => shortfall / 2,
            Alignment::Right => shortfall,
        };

        let x = area
            .x
            .saturating_add(shift)
            .saturating_add(u16::try_from(col).ok()?.saturating_mul(self.tile_width));
        let y = area
            .y
            .saturating_add(u16::try_from(row).ok()?.saturating_mul(self.tile_height));
        let rect = Rect::new(
            x,
            y,
            self.tile_width.saturating_sub(1).max(1),
            self.tile_height.saturating_sub(1).max(1),
        )
        .intersection(area);
        (!rect.is_empty()).then_some(rect)
    }

    /// Tile under the point, as (col, row).
    pub fn tile_at(&self, grid: &GridLayout, x: u16, y: u16) -> Option<(usize, usize)> {
        grid.rows().iter().enumerate().find_map(|(row, tiles)| {
            (0..tiles.len()).find_map(|col| {
                self.tile_rect(grid, col, row)
                    .filter(|r| contains(*r, x, y))
                    .map(|_| (col, row))
            })
        })
    }
}

// ───────────────────────────────────────── options ───────────

/// Width of the label column in the options form.
pub const LABEL_WIDTH: u16 = 26;

/// Regions of the options view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsLayout {
    pub area: Rect,
    pub title: Rect,
    /// Bordered form area.
    pub form: Rect,
    /// Inside of the form border; one form row per line.
    pub rows: Rect,
    pub help: Rect,
}

/// What the pointer is over in the options view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsHit {
    /// A field row; `on_control` is true over the control itself.
    Field { field: usize, on_control: bool },
    /// An entry of the open dropdown belonging to `field`.
    DropdownEntry { field: usize, entry: usize },
    /// Inside the open dropdown but not on an entry.
    Dropdown,
}

impl OptionsLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(3),    // form
                Constraint::Length(1), // key help
            ])
            .split(area);

        let form = chunks[1];
        let rows = Rect {
            x: form.x.saturating_add(1),
            y: form.y.saturating_add(1),
            width: form.width.saturating_sub(2),
            height: form.height.saturating_sub(2),
        };

        Self {
            area,
            title: chunks[0],
            form,
            rows,
            help: chunks[2],
        }
    }

    /// Number of form rows that fit.
    pub fn visible_rows(&self) -> usize {
        usize::from(self.rows.height)
    }

    /// Screen line of form row `pos`, if scrolled into view.
    pub fn row_rect(&self, options: &OptionsState, pos: usize) -> Option<Rect> {
        let line = pos.checked_sub(options.offset)?;
        if line >= self.visible_rows() {
            return None;
        }
        let y = self.rows.y + u16::try_from(line).ok()?;
        Some(Rect::new(self.rows.x, y, self.rows.width, 1))
    }

    /// Area of `field`'s control (right of its label).
    pub fn control_rect(&self, options: &OptionsState, field: usize) -> Option<Rect> {
        let pos = options
            .form_rows()
            .iter()
            .position(|r| *r == FormRow::Field(field))?;
        let row = self.row_rect(options, pos)?;
        let label = LABEL_WIDTH.min(row.width);
        Some(Rect {
            x: row.x + label,
            width: row.width - label,
            ..row
        })
    }

    /// The open dropdown, if any select control is open: its field and area.
    pub fn dropdown(&self, options: &OptionsState) -> Option<(usize, Rect)> {
        options
            .controls
            .iter()
            .enumerate()
            .find_map(|(field, control)| match control {
                Control::Select(widget) if widget.is_open() => Some((field, widget)),
                _ => None,
            })
            .and_then(|(field, widget)| {
                let anchor = self.control_rect(options, field)?;
                let widest = widget
                    .entries()
                    .iter()
                    .map(|e| e.label.chars().count())
                    .max()
                    .unwrap_or(0);
                let width = (u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(4))
                    .max(12)
                    .min(self.area.width);
                let height = u16::try_from(widget.entries().len())
                    .unwrap_or(u16::MAX)
                    .saturating_add(2)
                    .min(self.area.height);

                let below = anchor.y + 1;
                let y = if below + height <= self.area.bottom() {
                    below
                } else {
                    anchor.y.saturating_sub(height).max(self.area.y)
                };
                let x = anchor.x.min(self.area.right().saturating_sub(width));
                Some((field, Rect::new(x, y, width, height)))
            })
    }

    pub fn hit_test(&self, options: &OptionsState, x: u16, y: u16) -> Option<OptionsHit> {
        if let Some((field, popup)) = self.dropdown(options) {
            if contains(popup, x, y) {
                let entry = usize::from(y.saturating_sub(popup.y + 1));
                let inside = y > popup.y && y + 1 < popup.bottom();
                return Some(if inside {
                    OptionsHit::DropdownEntry { field, entry }
                } else {
                    OptionsHit::Dropdown
                });
            }
        }

        if !contains(self.rows, x, y) {
            return None;
        }
        let pos = options.offset + usize::from(y - self.rows.y);
        match options.form_rows().get(pos)? {
            FormRow::Section(_) => None,
            FormRow::Field(field) => Some(OptionsHit::Field {
                field: *field,
                on_control: x >= self.rows.x + LABEL_WIDTH,
            }),
        }
    }
}

// ───────────────────────────────────────── helpers ───────────

pub fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}
