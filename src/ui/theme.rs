//! Colour palette and text styles used across the UI.
//!
//! The landing view is coloured by the user's settings ([`PageTheme`]); the
//! options form uses the fixed [`Theme`] palette.

use ratatui::style::{Color, Modifier, Style};

use crate::core::page::{PageModel, Rgb};

/// Fixed palette for the options view.
pub struct Theme;

impl Theme {
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn section_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn invalid_style() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}

/// Colours of the landing view, derived from the page model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTheme {
    pub background: Color,
    pub text: Color,
    /// Text of unfocused tiles when dimming is on.
    pub dimmed: Color,
}

impl PageTheme {
    /// `backdrop` stands in for the background picture; the overlay is
    /// blended over it at the configured opacity.
    pub fn from_page(page: &PageModel, backdrop: Rgb) -> Self {
        let background = blend(backdrop, page.overlay.color, page.overlay.alpha);
        Self {
            background: rgb(background),
            text: rgb(page.text_color),
            dimmed: rgb(blend(page.text_color, background, 0.5)),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    pub fn time_style(&self) -> Style {
        self.base().add_modifier(Modifier::BOLD)
    }

    /// Weekday and date use the accent face.
    pub fn accent_style(&self) -> Style {
        self.base().add_modifier(Modifier::ITALIC)
    }

    pub fn tile_style(&self, focused: bool, dim: bool) -> Style {
        match (focused, dim) {
            (true, _) => self
                .base()
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            (false, true) => self.base().fg(self.dimmed),
            (false, false) => self.base(),
        }
    }

    pub fn button_style(&self) -> Style {
        self.base().fg(self.dimmed)
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// `over` painted on `under` with opacity `alpha`.
fn blend(under: Rgb, over: Rgb, alpha: f64) -> Rgb {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |u: u8, o: u8| (f64::from(u) * (1.0 - alpha) + f64::from(o) * alpha).round() as u8;
    Rgb {
        r: mix(under.r, over.r),
        g: mix(under.g, over.g),
        b: mix(under.b, over.b),
    }
}
