use chrono::{NaiveDateTime, NaiveTime};

use crate::{PixcycleError, Result};

/// Daytime interval `[start, end)` as local times of day. Never spans midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(PixcycleError::config(format!(
                "day window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        PixcycleError::config(format!("`{value}` is not a time of day in HH:MM format: {err}"))
    })
}

/// True when `now` falls inside today's occurrence of the window.
pub fn is_daytime(now: NaiveDateTime, window: &DayWindow) -> bool {
    let today_start = now.date().and_time(window.start);
    let today_end = now.date().and_time(window.end);
    today_start <= now && now < today_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn bounds_are_inclusive_start_exclusive_end() {
        let window = DayWindow::parse("07:00", "23:00").unwrap();

        assert!(is_daytime(at(7, 0, 0), &window));
        assert!(is_daytime(at(12, 30, 0), &window));
        assert!(is_daytime(at(22, 59, 59), &window));
        assert!(!is_daytime(at(23, 0, 0), &window));
        assert!(!is_daytime(at(23, 45, 0), &window));
        assert!(!is_daytime(at(6, 59, 59), &window));
        assert!(!is_daytime(at(0, 0, 0), &window));
    }

    #[test]
    fn sub_second_before_start_is_night() {
        let window = DayWindow::parse("07:00", "23:00").unwrap();
        let almost = at(6, 59, 59) + chrono::Duration::milliseconds(999);
        assert!(!is_daytime(almost, &window));
    }

    #[test]
    fn rejects_inverted_or_empty_windows() {
        assert!(DayWindow::parse("23:00", "07:00").is_err());
        assert!(DayWindow::parse("08:00", "08:00").is_err());
    }

    #[test]
    fn rejects_malformed_times() {
        let err = DayWindow::parse("7am", "23:00").unwrap_err();
        assert!(err.to_string().contains("7am"));
        assert!(DayWindow::parse("07:00", "25:00").is_err());
    }
}
