//! View parameters: which days a month, week, or day view shows.
//!
//! Settings are plain values passed into every entry point. Nothing here is
//! process-wide; two views with different settings can be laid out side by side.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::temporal::{is_weekend, parse_timezone, start_of_day, start_of_week};

/// User-level view preferences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    /// IANA display time zone.
    pub time_zone: String,
    /// First day of the week: 1 = Monday ... 6 = Saturday, 0 or 7 = Sunday.
    #[serde(default = "default_week_starts_on")]
    pub week_starts_on: u8,
    #[serde(default = "default_show_weekends")]
    pub show_weekends: bool,
}

fn default_week_starts_on() -> u8 {
    1
}

fn default_show_weekends() -> bool {
    true
}

impl ViewSettings {
    pub fn new(time_zone: impl Into<String>) -> Self {
        ViewSettings {
            time_zone: time_zone.into(),
            week_starts_on: default_week_starts_on(),
            show_weekends: default_show_weekends(),
        }
    }

    pub fn with_week_start(mut self, week_starts_on: u8) -> Self {
        self.week_starts_on = week_starts_on;
        self
    }

    pub fn with_weekends(mut self, show_weekends: bool) -> Self {
        self.show_weekends = show_weekends;
        self
    }

    /// The display zone.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidTimezone`] for an unknown identifier.
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.time_zone)
    }

    /// The configured week-start day.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSettings`] outside `0..=7`.
    pub fn week_start(&self) -> Result<Weekday> {
        match self.week_starts_on {
            0 | 7 => Ok(Weekday::Sun),
            1 => Ok(Weekday::Mon),
            2 => Ok(Weekday::Tue),
            3 => Ok(Weekday::Wed),
            4 => Ok(Weekday::Thu),
            5 => Ok(Weekday::Fri),
            6 => Ok(Weekday::Sat),
            other => Err(LayoutError::InvalidSettings(format!(
                "weekStartsOn must be 0..=7, got {other}"
            ))),
        }
    }

    /// Key of the preferences that change which days are visible.
    pub fn preferences_key(&self) -> String {
        format!("ws{}:we{}", self.week_starts_on, self.show_weekends)
    }
}

/// The kind of grid being laid out, anchored on a date inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CalendarView {
    Month { date: NaiveDate },
    Week { date: NaiveDate },
    Day { date: NaiveDate },
}

impl CalendarView {
    pub fn date(&self) -> NaiveDate {
        match self {
            CalendarView::Month { date }
            | CalendarView::Week { date }
            | CalendarView::Day { date } => *date,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CalendarView::Month { .. } => "month",
            CalendarView::Week { .. } => "week",
            CalendarView::Day { .. } => "day",
        }
    }
}

/// The days a view shows, in display order.
///
/// Month views cover whole weeks around the month. When weekends are hidden,
/// Saturdays and Sundays are dropped from month and week views; a day view
/// always shows its date.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidSettings`] for an invalid week start.
pub fn visible_days(view: &CalendarView, settings: &ViewSettings) -> Result<Vec<NaiveDate>> {
    let week_start = settings.week_start()?;

    let (first, count) = match view {
        CalendarView::Day { date } => return Ok(vec![*date]),
        CalendarView::Week { date } => (start_of_week(*date, week_start), 7),
        CalendarView::Month { date } => {
            let first_of_month = date.with_day(1).ok_or_else(|| {
                LayoutError::InvalidDatetime(format!("no first day for month of {date}"))
            })?;
            let last_of_month = last_day_of_month(first_of_month)?;
            let grid_start = start_of_week(first_of_month, week_start);
            let grid_end = start_of_week(last_of_month, week_start) + Duration::days(6);
            (grid_start, (grid_end - grid_start).num_days() + 1)
        }
    };

    let days = first
        .iter_days()
        .take(count as usize)
        .filter(|day| settings.show_weekends || !is_weekend(*day))
        .collect();
    Ok(days)
}

/// The instant range covered by `days`: local midnight of the first day
/// through one second before local midnight after the last.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidSettings`] when `days` is empty.
pub fn visible_range(days: &[NaiveDate], tz: &Tz) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Err(LayoutError::InvalidSettings("view has no visible days".to_string()));
    };
    let start = start_of_day(*first, tz)?;
    let after_last = last
        .succ_opt()
        .ok_or_else(|| LayoutError::InvalidDatetime(format!("no day after {last}")))?;
    let end = start_of_day(after_last, tz)? - Duration::seconds(1);
    Ok((start, end))
}

/// Key of a visible day range, for cache keys.
pub fn range_key(days: &[NaiveDate]) -> String {
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!("{first}..{last}#{}", days.len()),
        _ => String::from("empty"),
    }
}

fn last_day_of_month(first_of_month: NaiveDate) -> Result<NaiveDate> {
    let (y, m) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first_next| first_next.pred_opt())
        .ok_or_else(|| LayoutError::InvalidDatetime(format!("no month end after {first_of_month}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_values() {
        let s = ViewSettings::new("UTC");
        assert_eq!(s.clone().with_week_start(0).week_start().unwrap(), Weekday::Sun);
        assert_eq!(s.clone().with_week_start(7).week_start().unwrap(), Weekday::Sun);
        assert_eq!(s.clone().with_week_start(1).week_start().unwrap(), Weekday::Mon);
        assert_eq!(s.clone().with_week_start(6).week_start().unwrap(), Weekday::Sat);
        assert!(s.with_week_start(8).week_start().is_err());
    }

    #[test]
    fn test_week_view_sunday_start() {
        let settings = ViewSettings::new("UTC").with_week_start(0);
        let view = CalendarView::Week {
            date: date(2026, 3, 18),
        };
        let days = visible_days(&view, &settings).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 3, 15));
        assert_eq!(days[6], date(2026, 3, 21));
    }

    #[test]
    fn test_week_view_hides_weekends() {
        let settings = ViewSettings::new("UTC").with_weekends(false);
        let view = CalendarView::Week {
            date: date(2026, 3, 18),
        };
        let days = visible_days(&view, &settings).unwrap();
        assert_eq!(days, date(2026, 3, 16).iter_days().take(5).collect::<Vec<_>>());
    }

    #[test]
    fn test_month_view_whole_weeks() {
        // March 2026: starts on a Sunday, ends on a Tuesday
        let settings = ViewSettings::new("UTC");
        let view = CalendarView::Month {
            date: date(2026, 3, 10),
        };
        let days = visible_days(&view, &settings).unwrap();
        assert_eq!(days.first(), Some(&date(2026, 2, 23)));
        assert_eq!(days.last(), Some(&date(2026, 4, 5)));
        assert_eq!(days.len() % 7, 0);
    }

    #[test]
    fn test_month_view_december() {
        let settings = ViewSettings::new("UTC").with_week_start(0);
        let view = CalendarView::Month {
            date: date(2026, 12, 25),
        };
        let days = visible_days(&view, &settings).unwrap();
        assert!(days.contains(&date(2026, 12, 31)));
        assert_eq!(days.len() % 7, 0);
    }

    #[test]
    fn test_day_view_ignores_weekend_preference() {
        let settings = ViewSettings::new("UTC").with_weekends(false);
        let sunday = date(2026, 3, 22);
        let days = visible_days(&CalendarView::Day { date: sunday }, &settings).unwrap();
        assert_eq!(days, vec![sunday]);
    }

    #[test]
    fn test_visible_range_bounds() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        let (start, end) = visible_range(&[date(2026, 3, 16), date(2026, 3, 17)], &tz).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-03-16T00:00:00+01:00");
        assert_eq!(end.to_rfc3339(), "2026-03-17T23:59:59+01:00");
        assert!(visible_range(&[], &tz).is_err());
    }

    #[test]
    fn test_view_serde_tag() {
        let view: CalendarView =
            serde_json::from_str(r#"{"type":"week","date":"2026-03-16"}"#).unwrap();
        assert_eq!(
            view,
            CalendarView::Week {
                date: date(2026, 3, 16)
            }
        );
        assert_eq!(view.kind(), "week");
    }
}
