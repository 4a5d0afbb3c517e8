//! The options form.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{ControlKind, OPTION_FIELDS};
use crate::app::state::{Control, FormRow, OptionsState};
use crate::core::page::Rgb;
use crate::core::range::RangePair;

use super::layout::{OptionsLayout, LABEL_WIDTH};
use super::theme::Theme;

const TRACK_WIDTH: usize = 20;

pub struct OptionsView<'a> {
    pub state: &'a OptionsState,
}

impl Widget for OptionsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let options = self.state;
        let layout = OptionsLayout::from_area(area);

        let mut title = vec![Span::styled(" Options ", Theme::title_style())];
        if let Some(msg) = &options.status_message {
            title.push(Span::styled(format!("  {msg}"), Theme::hint_style()));
        }
        Paragraph::new(Line::from(title)).render(layout.title, buf);

        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style())
            .render(layout.form, buf);

        for (pos, row) in options.form_rows().into_iter().enumerate() {
            let Some(rect) = layout.row_rect(options, pos) else {
                continue;
            };
            let line = match row {
                FormRow::Section(name) => Line::from(Span::styled(name, Theme::section_style())),
                FormRow::Field(idx) => field_line(options, idx),
            };
            Paragraph::new(line).render(rect, buf);
        }

        Paragraph::new(Line::from(Span::styled(help_text(options), Theme::hint_style())))
            .style(Theme::status_bar_style())
            .render(layout.help, buf);

        if let Some((field, popup)) = layout.dropdown(options) {
            if let Control::Select(widget) = &options.controls[field] {
                Clear.render(popup, buf);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray));
                let inner = block.inner(popup);
                block.render(popup, buf);

                let lines: Vec<Line> = widget
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        let style = if widget.selected() == Some(i) {
                            Theme::selected_style()
                        } else {
                            Theme::label_style()
                        };
                        Line::from(Span::styled(format!(" {} ", entry.label), style))
                    })
                    .collect();
                Paragraph::new(lines).render(inner, buf);
            }
        }
    }
}

fn field_line(options: &OptionsState, idx: usize) -> Line<'static> {
    let field = &OPTION_FIELDS[idx];
    let focused = options.focused == idx;
    let (prefix, label_style) = if focused {
        (" ▸ ", Theme::label_style().patch(Theme::selected_style()))
    } else {
        ("   ", Theme::label_style())
    };
    let label_width = usize::from(LABEL_WIDTH) - prefix.chars().count();
    let mut spans = vec![Span::styled(
        format!("{prefix}{:<label_width$}", field.label),
        label_style,
    )];

    match (&options.controls[idx], field.kind) {
        (Control::Checkbox(on), _) => {
            spans.push(Span::styled(
                if *on { "[x]" } else { "[ ]" },
                Theme::value_style(),
            ));
        }
        (
            Control::Range {
                pair,
                editing_number,
            },
            ControlKind::Range { unit, .. },
        ) => spans.extend(range_spans(pair, *editing_number && focused, unit)),
        (Control::Text(text), _) => {
            let shown = if text.is_empty() && !focused {
                Span::styled("(none)", Theme::hint_style())
            } else {
                Span::styled(tail(text, 40), Theme::value_style())
            };
            spans.push(shown);
            if focused {
                spans.push(Span::styled("▏", Theme::value_style()));
            }
        }
        (Control::Color(text), _) => {
            let swatch = match Rgb::parse(text) {
                Some(c) => Span::styled("██ ", Style::default().fg(Color::Rgb(c.r, c.g, c.b))),
                None => Span::styled("?? ", Theme::invalid_style()),
            };
            spans.push(swatch);
            spans.push(Span::styled(text.clone(), Theme::value_style()));
            if focused {
                spans.push(Span::styled("▏", Theme::value_style()));
            }
        }
        (Control::Select(widget), _) => {
            spans.push(Span::styled(
                format!("‹{}› ▾", widget.label()),
                Theme::value_style(),
            ));
        }
        (Control::File { input, has_image }, _) => {
            if input.is_empty() {
                let current = if *has_image { "custom image" } else { "default" };
                spans.push(Span::styled(current, Theme::value_style()));
            } else {
                spans.push(Span::styled(tail(input, 40), Theme::value_style()));
            }
            if focused {
                spans.push(Span::styled("▏", Theme::value_style()));
            }
        }
        (Control::Range { .. }, _) => {}
    }

    Line::from(spans)
}

fn range_spans(pair: &RangePair, editing: bool, unit: &'static str) -> Vec<Span<'static>> {
    let filled = ((pair.ratio() * (TRACK_WIDTH - 1) as f64).round() as usize).min(TRACK_WIDTH - 1);
    let track = format!(
        "{}●{}",
        "━".repeat(filled),
        "─".repeat(TRACK_WIDTH - 1 - filled)
    );
    let number_style = if pair.is_invalid() {
        Theme::invalid_style()
    } else {
        Theme::value_style()
    };

    let mut spans = vec![
        Span::styled(track, Theme::value_style()),
        Span::raw(" "),
        Span::styled(format!("{:>4}", pair.number_text()), number_style),
    ];
    if editing {
        spans.push(Span::styled("▏", Theme::value_style()));
    }
    spans.push(Span::styled(unit, Theme::hint_style()));
    if pair.is_invalid() {
        let (min, max) = pair.bounds();
        spans.push(Span::styled(format!("  {min}–{max}"), Theme::invalid_style()));
    }
    spans
}

/// The last `width` characters of `text`, so the cursor end stays visible.
fn tail(text: &str, width: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(width)).collect()
}

fn help_text(options: &OptionsState) -> &'static str {
    match (&options.controls[options.focused], OPTION_FIELDS[options.focused].kind) {
        (Control::Select(w), _) if w.is_open() => " ↑↓: choose  Enter/Esc: close",
        (Control::Select(_), _) => " Tab: next  ↑↓/letter: choose  Space: open  Esc: back",
        (Control::Checkbox(_), _) => " Tab/↑↓: move  Space: toggle  Esc: back",
        (Control::Range { editing_number: true, .. }, _) => " 0-9: type  Enter: done  Esc: back",
        (Control::Range { .. }, _) => " ←→: adjust  0-9: type a number  Tab/↑↓: move  Esc: back",
        (Control::File { .. }, _) => " type a path  Enter: use image  Del: default  Esc: back",
        (_, ControlKind::Color) => " type #rrggbb  Tab/↑↓: move  Esc: back",
        _ => " type to edit  Tab/↑↓: move  Esc: back",
    }
}
