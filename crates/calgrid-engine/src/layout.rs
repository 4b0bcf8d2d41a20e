//! The full pipeline from raw events to a view layout.
//!
//! temporal normalization → collection → range pre-filter → partition. Each
//! stage returns fresh values; calling [`compute_layout`] twice with equal
//! inputs yields equal layouts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::collection::{build_collection, filter_by_range};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::event::CalendarEvent;
use crate::overflow::{organize_events_with_overflow, EventCapacityInfo, OverflowOptions};
use crate::partition::{
    partition_by_day, partition_for_columns, ColumnLayout, EventCollectionByDay,
};
use crate::temporal::day_key;
use crate::view::{visible_days, visible_range, CalendarView, ViewSettings};

/// Month grid: one bucket per visible day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLayout {
    pub days: Vec<NaiveDate>,
    pub by_day: BTreeMap<String, EventCollectionByDay>,
}

impl MonthLayout {
    pub fn bucket(&self, day: NaiveDate) -> Option<&EventCollectionByDay> {
        self.by_day.get(&day_key(day))
    }

    /// Fit one cell's events into its measured height.
    ///
    /// The result lists each visible chip with its lane and pixel offset.
    /// Days outside the grid report an empty cell.
    pub fn capacity(
        &self,
        day: NaiveDate,
        available_height_px: f64,
        tz: &Tz,
        options: &OverflowOptions,
    ) -> EventCapacityInfo {
        let events = self
            .bucket(day)
            .map(|bucket| bucket.all_events.as_slice())
            .unwrap_or_default();
        organize_events_with_overflow(events, available_height_px, tz, options)
    }
}

/// A laid-out view; the variant follows the requested [`CalendarView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewLayout {
    Month(MonthLayout),
    Week(ColumnLayout),
    Day(ColumnLayout),
}

impl ViewLayout {
    pub fn days(&self) -> &[NaiveDate] {
        match self {
            ViewLayout::Month(month) => &month.days,
            ViewLayout::Week(columns) | ViewLayout::Day(columns) => &columns.days,
        }
    }
}

/// Lay out `events` for `view`.
///
/// # Errors
///
/// Returns [`crate::LayoutError::InvalidTimezone`] for an unknown display or
/// event zone and [`crate::LayoutError::InvalidSettings`] for invalid view
/// settings or config.
#[tracing::instrument(skip_all, fields(view = view.kind(), events = events.len()))]
pub fn compute_layout(
    events: &[CalendarEvent],
    view: &CalendarView,
    settings: &ViewSettings,
    config: &LayoutConfig,
) -> Result<ViewLayout> {
    config.validate()?;
    let tz = settings.timezone()?;
    let days = visible_days(view, settings)?;
    let (range_start, range_end) = visible_range(&days, &tz)?;

    let items = build_collection(events, &tz)?;
    let relevant = filter_by_range(&items, &range_start, &range_end);

    let layout = match view {
        CalendarView::Month { .. } => ViewLayout::Month(MonthLayout {
            by_day: partition_by_day(&relevant, &days, &tz),
            days,
        }),
        CalendarView::Week { .. } => ViewLayout::Week(partition_for_columns(
            &relevant,
            &days,
            config.hour_height_px,
            &tz,
            config,
        )?),
        CalendarView::Day { .. } => ViewLayout::Day(partition_for_columns(
            &relevant,
            &days,
            config.hour_height_px,
            &tz,
            config,
        )?),
    };

    debug!(days = layout.days().len(), "computed layout");
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{parse_timezone, EventDate};

    fn event(id: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(
            id,
            id,
            EventDate::parse(start).unwrap(),
            EventDate::parse(end).unwrap(),
        )
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_month_layout_variant() {
        let layout = compute_layout(
            &[event("a", "2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z")],
            &CalendarView::Month { date: date(3, 1) },
            &ViewSettings::new("UTC"),
            &LayoutConfig::default(),
        )
        .unwrap();
        let ViewLayout::Month(month) = layout else {
            panic!("expected month layout");
        };
        assert_eq!(month.by_day.len(), month.days.len());
        assert_eq!(month.bucket(date(3, 16)).unwrap().day_events.len(), 1);
    }

    #[test]
    fn test_out_of_range_events_dropped() {
        let layout = compute_layout(
            &[event("later", "2026-05-01T09:00:00Z", "2026-05-01T10:00:00Z")],
            &CalendarView::Week { date: date(3, 16) },
            &ViewSettings::new("UTC"),
            &LayoutConfig::default(),
        )
        .unwrap();
        let ViewLayout::Week(week) = layout else {
            panic!("expected week layout");
        };
        assert!(week.positioned_events.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_invalid_display_zone_is_fatal() {
        let err = compute_layout(
            &[],
            &CalendarView::Day { date: date(3, 16) },
            &ViewSettings::new("Etc/Nowhere"),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_month_capacity_for_cell() {
        let tz = parse_timezone("UTC").unwrap();
        let events: Vec<CalendarEvent> = (0..4)
            .map(|i| {
                event(
                    &format!("e{i}"),
                    &format!("2026-03-16T{:02}:00:00Z", 8 + i),
                    &format!("2026-03-16T{:02}:30:00Z", 8 + i),
                )
            })
            .collect();
        let ViewLayout::Month(month) = compute_layout(
            &events,
            &CalendarView::Month { date: date(3, 16) },
            &ViewSettings::new("UTC"),
            &LayoutConfig::default(),
        )
        .unwrap() else {
            panic!("expected month layout");
        };
        let options = OverflowOptions {
            lane_height_px: 20.0,
            lane_gap_px: 2.0,
            min_visible_lanes: 0,
        };
        let info = month.capacity(date(3, 16), 42.0, &tz, &options);
        assert_eq!(info.visible_lanes.len(), 2);
        assert_eq!(info.overflow_count, 2);
        let chips: Vec<(&str, usize, f64)> = info
            .visible_chips
            .iter()
            .map(|chip| (chip.event_id.as_str(), chip.lane, chip.top))
            .collect();
        assert_eq!(chips, vec![("e0", 0, 0.0), ("e1", 1, 22.0)]);

        let empty = month.capacity(date(9, 1), 42.0, &tz, &options);
        assert_eq!(empty.total_count(), 0);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let layout = compute_layout(
            &[],
            &CalendarView::Day { date: date(3, 16) },
            &ViewSettings::new("UTC"),
            &LayoutConfig::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["type"], "day");
        assert_eq!(json["days"][0], "2026-03-16");
        assert_eq!(json["columnMinutes"][0], 1440);
    }
}
