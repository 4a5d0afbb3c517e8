//! User settings — schema, defaults and load-time repair.
//!
//! Settings are a flat set of primitive values persisted through a
//! [`SettingsStorage`]. Whatever storage returns is checked key by key
//! against the defaults: anything missing, of the wrong type or not one of a
//! choice's allowed values is replaced with the default, and the defaults
//! used are written back so storage converges on a complete set.
//!
//! Default file locations follow `$XDG_CONFIG_HOME` (falling back to
//! `~/.config`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::clock::DateFormat;
use crate::core::grid::{Alignment, SpecialFolders};
use crate::core::storage::{SettingsMap, SettingsStorage};

// ───────────────────────────────────────── schema ────────────

/// An immutable snapshot of every option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    // Theme
    /// Data URL of a custom background, empty for the bundled one.
    pub background_image: String,
    pub background_overlay_color: String,
    /// Percent, 0–100.
    pub background_overlay_opacity: i64,
    pub text_color: String,
    pub main_font: String,
    pub accent_font: String,
    /// Percent.
    pub zoom_level: i64,
    pub show_settings_button: bool,

    // Time
    pub show_time: bool,
    pub show_seconds: bool,
    #[serde(rename = "showAMPM")]
    pub show_am_pm: bool,
    pub military_time: bool,

    // Weekday
    pub show_weekday: bool,

    // Date
    pub show_date: bool,
    pub date_format: DateFormat,

    // Bookmarks
    pub show_bookmarks: bool,
    pub show_icons: bool,
    pub show_labels: bool,
    pub bookmark_alignment: Alignment,
    pub allow_bookmarks_bar: bool,
    pub allow_other_bookmarks: bool,
    pub allow_mobile_bookmarks: bool,
    pub dim_bookmarks: bool,
    pub number_of_columns: i64,
    /// Width of one grid column in rem.
    pub column_width: i64,

    // Advanced
    #[serde(rename = "customCSS")]
    pub custom_css: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_image: String::new(),
            background_overlay_color: "#000000".into(),
            background_overlay_opacity: 35,
            text_color: "#FFFFFF".into(),
            main_font: "Montserrat".into(),
            accent_font: "Marck Script".into(),
            zoom_level: 100,
            show_settings_button: true,

            show_time: true,
            show_seconds: false,
            show_am_pm: false,
            military_time: false,

            show_weekday: true,

            show_date: true,
            date_format: DateFormat::MonthDayYear,

            show_bookmarks: true,
            show_icons: true,
            show_labels: true,
            bookmark_alignment: Alignment::Left,
            allow_bookmarks_bar: true,
            allow_other_bookmarks: false,
            allow_mobile_bookmarks: false,
            dim_bookmarks: true,
            number_of_columns: 5,
            column_width: 8,

            custom_css: String::new(),
        }
    }
}

/// Allowed values for string options that are really enumerations.
fn choices(key: &str) -> Option<Vec<&'static str>> {
    match key {
        "bookmarkAlignment" => Some(Alignment::ALL.iter().map(|a| a.as_str()).collect()),
        "dateFormat" => Some(DateFormat::ALL.iter().map(|f| f.as_str()).collect()),
        _ => None,
    }
}

/// Does `value` have the same primitive type as `default`?
fn same_kind(value: &Value, default: &Value) -> bool {
    match default {
        Value::Bool(_) => value.is_boolean(),
        Value::String(_) => value.is_string(),
        Value::Number(_) => value.is_i64(),
        _ => false,
    }
}

/// Bounds of the numeric options, matching their sliders.
pub fn range_bounds(key: &str) -> Option<(i64, i64)> {
    match key {
        "backgroundOverlayOpacity" => Some((0, 100)),
        "zoomLevel" => Some((50, 200)),
        "numberOfColumns" => Some((1, 20)),
        "columnWidth" => Some((4, 20)),
        _ => None,
    }
}

/// `value` pulled into range for bounded numeric keys; other values as is.
fn clamped(key: &str, value: &Value) -> Value {
    match (range_bounds(key), value.as_i64()) {
        (Some((min, max)), Some(n)) => Value::from(n.clamp(min, max)),
        _ => value.clone(),
    }
}

fn accepts(key: &str, value: &Value, default: &Value) -> bool {
    if !same_kind(value, default) {
        return false;
    }
    match (choices(key), value.as_str()) {
        (Some(allowed), Some(s)) => allowed.contains(&s),
        _ => true,
    }
}

/// Result of checking stored values against the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub settings: Settings,
    /// Keys that fell back to their default, with that default.
    pub repaired: SettingsMap,
}

impl Settings {
    /// Every option as a storage map.
    pub fn to_map(&self) -> SettingsMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => SettingsMap::new(),
        }
    }

    fn from_map(map: SettingsMap) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_else(|e| {
            tracing::warn!("settings did not deserialize, using defaults: {e}");
            Settings::default()
        })
    }

    /// Validate stored values against the defaults. Out-of-range numbers are
    /// clamped and reported as repaired.
    pub fn reconcile(stored: &SettingsMap) -> Reconciled {
        let mut merged = SettingsMap::new();
        let mut repaired = SettingsMap::new();

        for (key, default) in Settings::default().to_map() {
            match stored.get(&key) {
                Some(value) if accepts(&key, value, &default) => {
                    let fitted = clamped(&key, value);
                    if fitted != *value {
                        repaired.insert(key.clone(), fitted.clone());
                    }
                    merged.insert(key, fitted);
                }
                _ => {
                    repaired.insert(key.clone(), default.clone());
                    merged.insert(key, default);
                }
            }
        }

        Reconciled {
            settings: Self::from_map(merged),
            repaired,
        }
    }

    /// A copy with `key` set to `value`, or `None` if the key is unknown or
    /// the value is not acceptable for it. Numbers are clamped to range.
    pub fn with_value(&self, key: &str, value: Value) -> Option<Settings> {
        let mut map = self.to_map();
        let default = map.get(key)?;
        if !accepts(key, &value, default) {
            return None;
        }
        map.insert(key.to_string(), clamped(key, &value));
        Some(Self::from_map(map))
    }

    /// Current value of `key` as stored.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.to_map().remove(key)
    }

    pub fn special_folders(&self) -> SpecialFolders {
        SpecialFolders {
            bookmarks_bar: self.allow_bookmarks_bar,
            other: self.allow_other_bookmarks,
            mobile: self.allow_mobile_bookmarks,
        }
    }

    /// Column count as a usable grid width (never zero).
    pub fn columns(&self) -> usize {
        usize::try_from(self.number_of_columns).unwrap_or(1).max(1)
    }
}

// ───────────────────────────────────────── loading ───────────

/// Load settings from `storage`, persisting defaults for any key that had to
/// be repaired. Storage failures degrade to defaults.
pub async fn load_settings<S: SettingsStorage>(storage: &S) -> Settings {
    let stored = match storage.get_all().await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("could not read settings, using defaults: {e}");
            SettingsMap::new()
        }
    };

    let Reconciled { settings, repaired } = Settings::reconcile(&stored);
    if !repaired.is_empty() {
        tracing::info!("restoring {} settings to their defaults", repaired.len());
        if let Err(e) = storage.set(repaired).await {
            tracing::warn!("could not persist default settings: {e}");
        }
    }
    settings
}

// ───────────────────────────────────────── paths ─────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        })
}

/// `$XDG_CONFIG_HOME/tabgrid/settings.json`.
pub fn default_settings_path() -> PathBuf {
    config_dir().join(env!("CARGO_PKG_NAME")).join("settings.json")
}

/// The default Chromium profile's `Bookmarks` file.
pub fn default_bookmarks_path() -> PathBuf {
    config_dir().join("chromium").join("Default").join("Bookmarks")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use serde_json::json;

    fn map(value: Value) -> SettingsMap {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn defaults_use_storage_key_names() {
        let m = Settings::default().to_map();
        assert_eq!(m.len(), 26);
        assert_eq!(m.get("showAMPM"), Some(&json!(false)));
        assert_eq!(m.get("customCSS"), Some(&json!("")));
        assert_eq!(m.get("dateFormat"), Some(&json!("m d, y")));
        assert_eq!(m.get("bookmarkAlignment"), Some(&json!("left")));
        assert_eq!(m.get("numberOfColumns"), Some(&json!(5)));
    }

    #[test]
    fn valid_values_are_kept() {
        let stored = map(json!({
            "showSeconds": true,
            "bookmarkAlignment": "center",
            "dateFormat": "d m y",
            "zoomLevel": 125,
            "unknownKey": 1,
        }));
        let r = Settings::reconcile(&stored);
        assert!(r.settings.show_seconds);
        assert_eq!(r.settings.bookmark_alignment, Alignment::Center);
        assert_eq!(r.settings.date_format, DateFormat::DayMonthYear);
        assert_eq!(r.settings.zoom_level, 125);
        assert!(!r.repaired.contains_key("showSeconds"));
        assert!(!r.repaired.contains_key("unknownKey"));
        assert_eq!(r.repaired.len(), 22);
    }

    #[test]
    fn mismatched_values_fall_back() {
        let stored = map(json!({
            "showSeconds": "true",
            "zoomLevel": 99.5,
            "bookmarkAlignment": "diagonal",
            "textColor": null,
        }));
        let r = Settings::reconcile(&stored);
        assert_eq!(r.settings, Settings::default());
        for key in ["showSeconds", "zoomLevel", "bookmarkAlignment", "textColor"] {
            assert!(r.repaired.contains_key(key), "{key}");
        }
    }

    #[tokio::test]
    async fn string_boolean_is_replaced_and_defaults_written_back() {
        let storage = MemoryStorage::with_values(map(json!({"showSeconds": "true"})));
        let settings = load_settings(&storage).await;
        assert!(!settings.show_seconds);

        let writes = storage.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, Settings::default().to_map());
        assert_eq!(storage.snapshot().get("showSeconds"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn complete_storage_is_not_rewritten() {
        let storage = MemoryStorage::with_values(Settings::default().to_map());
        load_settings(&storage).await;
        assert!(storage.writes().is_empty());
    }

    #[test]
    fn with_value_validates() {
        let s = Settings::default();
        let s2 = s.with_value("numberOfColumns", json!(7)).unwrap();
        assert_eq!(s2.number_of_columns, 7);
        assert!(s.with_value("numberOfColumns", json!("7")).is_none());
        assert!(s.with_value("dateFormat", json!("y m d")).is_none());
        assert!(s.with_value("nope", json!(true)).is_none());
        assert_eq!(s2.get("numberOfColumns"), Some(json!(7)));
    }

    #[test]
    fn columns_never_zero() {
        let s = Settings::default()
            .with_value("numberOfColumns", json!(-3))
            .unwrap();
        assert_eq!(s.number_of_columns, 1);
        assert_eq!(s.columns(), 1);
    }

    #[tokio::test]
    async fn out_of_range_numbers_are_clamped_and_written_back() {
        let mut stored = Settings::default().to_map();
        stored.insert("zoomLevel".into(), json!(100_000));
        stored.insert("columnWidth".into(), json!(100_000));
        stored.insert("backgroundOverlayOpacity".into(), json!(-20));
        let storage = MemoryStorage::with_values(stored);

        let settings = load_settings(&storage).await;
        assert_eq!(settings.zoom_level, 200);
        assert_eq!(settings.column_width, 20);
        assert_eq!(settings.background_overlay_opacity, 0);

        let writes = storage.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.len(), 3);
        assert_eq!(storage.snapshot().get("zoomLevel"), Some(&json!(200)));
    }
}
