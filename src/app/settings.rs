//! Options form model (data only).
//!
//! Keeping the field table outside the input handler lets both the handler
//! and the form renderer consume the same source of truth.

use crate::core::{clock::DateFormat, grid::Alignment, select::SelectEntry};

/// How a field is edited.
#[derive(Debug, Clone, Copy)]
pub enum ControlKind {
    Checkbox,
    /// Slider plus number field. `unit` is shown after the number.
    Range {
        min: i64,
        max: i64,
        step: i64,
        unit: &'static str,
    },
    Text,
    /// `#rrggbb`; only well-formed colours are saved.
    Color,
    Select(fn() -> Vec<SelectEntry>),
    /// Path to an image, saved as a data URL.
    File,
}

/// A single row of the options form.
#[derive(Debug, Clone, Copy)]
pub struct OptionField {
    /// Settings key the field edits.
    pub key: &'static str,
    pub label: &'static str,
    pub section: &'static str,
    pub kind: ControlKind,
    /// Checkbox that must be on for this field to be shown.
    pub shown_when: Option<&'static str>,
}

const fn field(
    section: &'static str,
    key: &'static str,
    label: &'static str,
    kind: ControlKind,
) -> OptionField {
    OptionField {
        key,
        label,
        section,
        kind,
        shown_when: None,
    }
}

const fn dependent(
    section: &'static str,
    key: &'static str,
    label: &'static str,
    kind: ControlKind,
    shown_when: &'static str,
) -> OptionField {
    OptionField {
        key,
        label,
        section,
        kind,
        shown_when: Some(shown_when),
    }
}

const MAIN_FONTS: &[&str] = &["Montserrat", "Lato", "Open Sans", "Raleway", "Roboto", "Ubuntu"];
const ACCENT_FONTS: &[&str] = &["Marck Script", "Dancing Script", "Lobster", "Pacifico", "Satisfy"];

fn font_entries(fonts: &[&str]) -> Vec<SelectEntry> {
    fonts.iter().map(|f| SelectEntry::new(f, f)).collect()
}

fn main_fonts() -> Vec<SelectEntry> {
    font_entries(MAIN_FONTS)
}

fn accent_fonts() -> Vec<SelectEntry> {
    font_entries(ACCENT_FONTS)
}

fn date_formats() -> Vec<SelectEntry> {
    DateFormat::ALL
        .iter()
        .map(|f| SelectEntry::new(f.as_str(), f.label()))
        .collect()
}

fn alignments() -> Vec<SelectEntry> {
    Alignment::ALL
        .iter()
        .map(|a| SelectEntry::new(a.as_str(), a.label()))
        .collect()
}

/// All fields, in display order.
pub static OPTION_FIELDS: &[OptionField] = &[
    // Theme
    field("Theme", "backgroundImage", "Background image", ControlKind::File),
    field("Theme", "backgroundOverlayColor", "Overlay color", ControlKind::Color),
    field(
        "Theme",
        "backgroundOverlayOpacity",
        "Overlay opacity",
        ControlKind::Range { min: 0, max: 100, step: 5, unit: "%" },
    ),
    field("Theme", "textColor", "Text color", ControlKind::Color),
    field("Theme", "mainFont", "Main font", ControlKind::Select(main_fonts)),
    field("Theme", "accentFont", "Accent font", ControlKind::Select(accent_fonts)),
    field(
        "Theme",
        "zoomLevel",
        "Zoom",
        ControlKind::Range { min: 50, max: 200, step: 10, unit: "%" },
    ),
    field("Theme", "showSettingsButton", "Settings button", ControlKind::Checkbox),
    // Time
    field("Time", "showTime", "Show time", ControlKind::Checkbox),
    dependent("Time", "showSeconds", "Seconds", ControlKind::Checkbox, "showTime"),
    dependent("Time", "showAMPM", "AM / PM", ControlKind::Checkbox, "showTime"),
    dependent("Time", "militaryTime", "24-hour clock", ControlKind::Checkbox, "showTime"),
    // Weekday
    field("Weekday", "showWeekday", "Show weekday", ControlKind::Checkbox),
    // Date
    field("Date", "showDate", "Show date", ControlKind::Checkbox),
    dependent("Date", "dateFormat", "Format", ControlKind::Select(date_formats), "showDate"),
    // Bookmarks
    field("Bookmarks", "showBookmarks", "Show bookmarks", ControlKind::Checkbox),
    dependent("Bookmarks", "showIcons", "Icons", ControlKind::Checkbox, "showBookmarks"),
    dependent("Bookmarks", "showLabels", "Labels", ControlKind::Checkbox, "showBookmarks"),
    dependent(
        "Bookmarks",
        "bookmarkAlignment",
        "Alignment",
        ControlKind::Select(alignments),
        "showBookmarks",
    ),
    dependent(
        "Bookmarks",
        "allowBookmarksBar",
        "Bookmarks bar",
        ControlKind::Checkbox,
        "showBookmarks",
    ),
    dependent(
        "Bookmarks",
        "allowOtherBookmarks",
        "Other bookmarks",
        ControlKind::Checkbox,
        "showBookmarks",
    ),
    dependent(
        "Bookmarks",
        "allowMobileBookmarks",
        "Mobile bookmarks",
        ControlKind::Checkbox,
        "showBookmarks",
    ),
    dependent("Bookmarks", "dimBookmarks", "Dim", ControlKind::Checkbox, "showBookmarks"),
    dependent(
        "Bookmarks",
        "numberOfColumns",
        "Columns",
        ControlKind::Range { min: 1, max: 20, step: 1, unit: "" },
        "showBookmarks",
    ),
    dependent(
        "Bookmarks",
        "columnWidth",
        "Column width",
        ControlKind::Range { min: 4, max: 20, step: 1, unit: "rem" },
        "showBookmarks",
    ),
    // Advanced
    field("Advanced", "customCSS", "Custom CSS", ControlKind::Text),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{range_bounds, Settings};

    #[test]
    fn every_setting_has_exactly_one_field() {
        let keys = Settings::default().to_map();
        assert_eq!(OPTION_FIELDS.len(), keys.len());
        for f in OPTION_FIELDS {
            assert!(keys.contains_key(f.key), "{} is not a setting", f.key);
        }
    }

    #[test]
    fn dependencies_point_at_earlier_checkboxes() {
        for (i, f) in OPTION_FIELDS.iter().enumerate() {
            let Some(parent) = f.shown_when else { continue };
            let pos = OPTION_FIELDS.iter().position(|p| p.key == parent).unwrap();
            assert!(pos < i);
            assert!(matches!(OPTION_FIELDS[pos].kind, ControlKind::Checkbox));
        }
    }

    #[test]
    fn select_defaults_are_listed() {
        let defaults = Settings::default();
        for f in OPTION_FIELDS {
            if let ControlKind::Select(entries) = f.kind {
                let value = defaults.get(f.key).unwrap();
                assert!(
                    entries().iter().any(|e| Some(e.value.as_str()) == value.as_str()),
                    "{}",
                    f.key
                );
            }
        }
    }

    #[test]
    fn slider_bounds_match_stored_bounds() {
        for f in OPTION_FIELDS {
            if let ControlKind::Range { min, max, .. } = f.kind {
                assert_eq!(range_bounds(f.key), Some((min, max)), "{}", f.key);
            }
        }
    }
}
