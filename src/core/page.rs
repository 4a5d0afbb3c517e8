//! Page model — everything the landing view derives from a settings snapshot.
//!
//! The model is computed once per load and is independent of how it is
//! drawn: it carries the same CSS-variable table the browser page applies
//! (see [`PageModel::stylesheet`]), plus the values the terminal renderer
//! reads directly.

use crate::config::Settings;

use super::clock::DateFormat;
use super::grid::Alignment;

/// Background used when no custom image is set.
pub const DEFAULT_BACKGROUND: &str = "/assets/mountain.webp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` (the `#` is optional, hex digits in any case).
    /// Anything else is black.
    pub fn from_hex(hex: &str) -> Self {
        Self::parse(hex).unwrap_or_default()
    }

    /// Strict variant of [`Rgb::from_hex`].
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Colour wash drawn over the background image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub color: Rgb,
    /// 0.0–1.0
    pub alpha: f64,
}

impl Overlay {
    pub fn css(&self) -> String {
        let Rgb { r, g, b } = self.color;
        format!("rgba({r}, {g}, {b}, {})", self.alpha)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    Default,
    /// A `data:` URL.
    Custom(String),
}

impl Background {
    pub fn source(&self) -> &str {
        match self {
            Background::Default => DEFAULT_BACKGROUND,
            Background::Custom(url) => url,
        }
    }
}

/// Which page regions are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub settings_button: bool,
    pub time: bool,
    pub seconds: bool,
    pub am_pm: bool,
    pub weekday: bool,
    pub date: bool,
    pub bookmarks: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageModel {
    pub background: Background,
    pub overlay: Overlay,
    pub text_color: Rgb,
    pub visibility: Visibility,
    pub date_format: DateFormat,
    pub military_time: bool,
    pub alignment: Alignment,
    pub columns: usize,
    pub show_icons: bool,
    pub show_labels: bool,
    pub dim_bookmarks: bool,
    /// Column width in rem, before zoom.
    pub column_width_rem: u16,
    /// Percent.
    pub zoom: u16,
    /// Free-form style appended after the generated rules.
    pub custom_style: String,
    css_variables: Vec<(&'static str, String)>,
}

impl PageModel {
    pub fn from_settings(settings: &Settings) -> Self {
        let overlay = Overlay {
            color: Rgb::from_hex(&settings.background_overlay_color),
            alpha: settings.background_overlay_opacity.clamp(0, 100) as f64 / 100.0,
        };

        let mut css_variables = vec![
            ("--textColor", settings.text_color.clone()),
            ("--mainFont", settings.main_font.clone()),
            ("--accentFont", settings.accent_font.clone()),
            ("--zoomLevel", format!("{}%", settings.zoom_level)),
        ];
        if !settings.show_icons {
            css_variables.push(("--showIcons", "none".into()));
        }
        if !settings.show_labels {
            css_variables.push(("--showLabels", "none".into()));
        }
        if settings.dim_bookmarks {
            css_variables.push(("--dimBookmarks", "50%".into()));
        }
        css_variables.push(("--columnWidth", format!("{}rem", settings.column_width)));

        let background = if settings.background_image.is_empty() {
            Background::Default
        } else {
            Background::Custom(settings.background_image.clone())
        };

        Self {
            background,
            overlay,
            text_color: Rgb::from_hex(&settings.text_color),
            visibility: Visibility {
                settings_button: settings.show_settings_button,
                time: settings.show_time,
                seconds: settings.show_seconds,
                am_pm: settings.show_am_pm,
                weekday: settings.show_weekday,
                date: settings.show_date,
                bookmarks: settings.show_bookmarks,
            },
            date_format: settings.date_format,
            military_time: settings.military_time,
            alignment: settings.bookmark_alignment,
            columns: settings.columns(),
            show_icons: settings.show_icons,
            show_labels: settings.show_labels,
            dim_bookmarks: settings.dim_bookmarks,
            column_width_rem: u16::try_from(settings.column_width.max(1)).unwrap_or(u16::MAX),
            zoom: u16::try_from(settings.zoom_level.max(10)).unwrap_or(u16::MAX),
            custom_style: settings.custom_css.clone(),
            css_variables,
        }
    }

    /// The page's look as a stylesheet: the variable table on `:root`, the
    /// background with its overlay on `body`, then the custom style as is.
    pub fn stylesheet(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.css_variables {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");

        let overlay = self.overlay.css();
        css.push_str(&format!(
            "body {{\n  background-image: linear-gradient({overlay}, {overlay}), url(\"{}\");\n}}\n",
            self.background.source()
        ));
        if !self.custom_style.is_empty() {
            css.push_str(&self.custom_style);
            css.push('\n');
        }
        css
    }

    /// Terminal cells per grid column: two cells per rem, scaled by zoom.
    pub fn column_cells(&self) -> u16 {
        let cells = u64::from(self.column_width_rem) * 2 * u64::from(self.zoom) / 100;
        u16::try_from(cells.max(4)).unwrap_or(u16::MAX)
    }
}
