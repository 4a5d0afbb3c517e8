//! The landing view: clock, date and the bookmark grid.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment as TextAlignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::app::state::NewTabState;
use crate::core::grid::{Tile, TileKind};

use super::layout::{NewTabLayout, BACK_BUTTON_LABEL, SETTINGS_BUTTON_LABEL};
use super::theme::PageTheme;

pub struct NewTabView<'a> {
    pub state: &'a NewTabState,
}

impl Widget for NewTabView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tab = self.state;
        let page = &tab.page;
        let theme = PageTheme::from_page(page, tab.backdrop);
        let layout = NewTabLayout::compute(area, tab);

        Block::default().style(theme.base()).render(area, buf);

        if let Some(rect) = layout.settings_button {
            Paragraph::new(SETTINGS_BUTTON_LABEL)
                .style(theme.button_style())
                .render(rect, buf);
        }

        let centered = |text: String, style: Style, rect: Rect, buf: &mut Buffer| {
            Paragraph::new(Line::styled(text, style))
                .alignment(TextAlignment::Center)
                .render(rect, buf);
        };

        if let Some(rect) = layout.time {
            let vis = page.visibility;
            centered(
                tab.clock.time_line(vis.seconds, vis.am_pm),
                theme.time_style(),
                rect,
                buf,
            );
        }
        if let Some(rect) = layout.weekday {
            centered(tab.clock.weekday.clone(), theme.accent_style(), rect, buf);
        }
        if let Some(rect) = layout.date {
            centered(
                tab.clock.date_line(page.date_format),
                theme.accent_style(),
                rect,
                buf,
            );
        }

        if let Some(rect) = layout.header {
            centered(tab.folder_title.clone(), theme.time_style(), rect, buf);
        }
        if let Some(rect) = layout.back_button {
            Paragraph::new(BACK_BUTTON_LABEL)
                .style(theme.button_style())
                .render(rect, buf);
        }

        for tile in tab.grid.rows().iter().flatten() {
            let Some(rect) = layout.tile_rect(&tab.grid, tile.col, tile.row) else {
                continue;
            };
            let focused = tab.focus == Some((tile.col, tile.row));
            let style = theme.tile_style(focused, page.dim_bookmarks);

            let mut lines = Vec::with_capacity(2);
            if page.show_icons {
                lines.push(Line::from(Span::styled(icon(tile), style)));
            }
            if page.show_labels {
                let width = usize::from(rect.width);
                lines.push(Line::from(Span::styled(truncate(&tile.label, width), style)));
            }
            if lines.is_empty() {
                lines.push(Line::from(Span::styled(" ", style)));
            }
            Paragraph::new(lines)
                .alignment(TextAlignment::Center)
                .style(style)
                .render(rect, buf);
        }
    }
}

/// Stand-in for a favicon: a folder mark, or the first letter of the host.
fn icon(tile: &Tile) -> String {
    match &tile.kind {
        TileKind::Folder { .. } => "▤".into(),
        TileKind::Link { url } => match host(url).chars().next() {
            Some(c) => format!("({})", c.to_uppercase()),
            None => "(·)".into(),
        },
    }
}

fn host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = host.rsplit('@').next().unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host)
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut out: String = label.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
