//! Clock and date text for the landing view.

use std::time::Duration;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Order of the date line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    /// `October 19, 2026`
    #[default]
    #[serde(rename = "m d, y")]
    MonthDayYear,
    /// `19 October 2026`
    #[serde(rename = "d m y")]
    DayMonthYear,
}

impl DateFormat {
    pub const ALL: &[DateFormat] = &[DateFormat::MonthDayYear, DateFormat::DayMonthYear];

    /// Value as stored in settings.
    pub fn as_str(self) -> &'static str {
        match self {
            DateFormat::MonthDayYear => "m d, y",
            DateFormat::DayMonthYear => "d m y",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateFormat::MonthDayYear => "Month Day, Year",
            DateFormat::DayMonthYear => "Day Month Year",
        }
    }
}

/// Every piece of text the clock area shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub hour: String,
    pub minute: String,
    pub second: String,
    /// `AM`/`PM`, empty on a 24-hour clock.
    pub am_pm: String,
    pub weekday: String,
    pub month: String,
    pub day: String,
    pub year: String,
}

impl ClockFace {
    pub fn at(now: NaiveDateTime, military_time: bool) -> Self {
        let h = now.hour();
        let (hour, am_pm) = if military_time {
            (format!("{h:02}"), "")
        } else {
            match h {
                0 => ("12".to_string(), "AM"),
                12 => ("12".to_string(), "PM"),
                13.. => ((h - 12).to_string(), "PM"),
                _ => (h.to_string(), "AM"),
            }
        };

        Self {
            hour,
            minute: format!("{:02}", now.minute()),
            second: format!("{:02}", now.second()),
            am_pm: am_pm.to_string(),
            weekday: now.format("%A").to_string(),
            month: now.format("%B").to_string(),
            day: now.day().to_string(),
            year: now.year().to_string(),
        }
    }

    /// `9:05`, `9:05:07`, `9:05 AM`, `21:05:07` …
    pub fn time_line(&self, show_seconds: bool, show_am_pm: bool) -> String {
        let mut line = format!("{}:{}", self.hour, self.minute);
        if show_seconds {
            line.push(':');
            line.push_str(&self.second);
        }
        if show_am_pm && !self.am_pm.is_empty() {
            line.push(' ');
            line.push_str(&self.am_pm);
        }
        line
    }

    pub fn date_line(&self, format: DateFormat) -> String {
        match format {
            DateFormat::MonthDayYear => format!("{} {}, {}", self.month, self.day, self.year),
            DateFormat::DayMonthYear => format!("{} {} {}", self.day, self.month, self.year),
        }
    }
}

/// Time left until the next whole second, so redraws land on the tick.
pub fn until_next_second(now: NaiveDateTime) -> Duration {
    let into_second = now.nanosecond() % 1_000_000_000;
    Duration::from_nanos(u64::from(1_000_000_000 - into_second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn twelve_hour_clock() {
        let cases = [
            (0, "12", "AM"),
            (1, "1", "AM"),
            (11, "11", "AM"),
            (12, "12", "PM"),
            (13, "1", "PM"),
            (23, "11", "PM"),
        ];
        for (h, hour, am_pm) in cases {
            let face = ClockFace::at(at(h, 0, 0), false);
            assert_eq!((face.hour.as_str(), face.am_pm.as_str()), (hour, am_pm), "h={h}");
        }
    }

    #[test]
    fn military_clock_pads_hour() {
        let face = ClockFace::at(at(7, 3, 9), true);
        assert_eq!(face.hour, "07");
        assert_eq!(face.am_pm, "");
        assert_eq!(face.time_line(true, true), "07:03:09");
    }

    #[test]
    fn time_line_parts() {
        let face = ClockFace::at(at(21, 5, 7), false);
        assert_eq!(face.time_line(false, false), "9:05");
        assert_eq!(face.time_line(true, false), "9:05:07");
        assert_eq!(face.time_line(false, true), "9:05 PM");
    }

    #[test]
    fn date_lines_and_weekday() {
        let face = ClockFace::at(at(8, 0, 0), false);
        assert_eq!(face.weekday, "Monday");
        assert_eq!(face.date_line(DateFormat::MonthDayYear), "October 19, 2026");
        assert_eq!(face.date_line(DateFormat::DayMonthYear), "19 October 2026");
    }

    #[test]
    fn next_second_alignment() {
        let t = at(8, 0, 0) + chrono::Duration::milliseconds(250);
        assert_eq!(until_next_second(t), Duration::from_millis(750));
        assert_eq!(until_next_second(at(8, 0, 0)), Duration::from_secs(1));
    }
}
