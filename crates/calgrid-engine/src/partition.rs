//! Split a filtered collection into per-day buckets (month view) or
//! positioned per-column lists (week and day views).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::collection::{sort_items, EventCollectionItem};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::lanes::{assign_lanes, chip_top, column_geometry, time_geometry, z_index};
use crate::temporal::{day_key, day_minutes, start_of_day};

// ── Month view ──────────────────────────────────────────────────────────────

/// The events touching one month-view cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCollectionByDay {
    /// Timed events that start and end on this day.
    pub day_events: Vec<EventCollectionItem>,
    /// Timed events covering this day and at least one other.
    pub spanning_events: Vec<EventCollectionItem>,
    /// All-day events covering this day.
    pub all_day_events: Vec<EventCollectionItem>,
    /// Union of the three lists in display order.
    pub all_events: Vec<EventCollectionItem>,
}

impl EventCollectionByDay {
    pub fn is_empty(&self) -> bool {
        self.all_events.is_empty()
    }
}

/// Bucket items into every requested day, keyed by ISO day string.
///
/// Every day in `days` gets an entry, empty or not. An item lands in each day
/// it covers as seen from `tz`.
pub fn partition_by_day(
    items: &[EventCollectionItem],
    days: &[NaiveDate],
    tz: &Tz,
) -> BTreeMap<String, EventCollectionByDay> {
    let mut sorted: Vec<EventCollectionItem> = items.iter().map(|i| i.in_timezone(tz)).collect();
    sort_items(&mut sorted);

    let mut buckets = BTreeMap::new();
    for &day in days {
        let mut bucket = EventCollectionByDay::default();
        for item in sorted.iter().filter(|item| item.covers(day)) {
            if item.is_all_day() {
                bucket.all_day_events.push(item.clone());
            } else if item.is_multi_day() {
                bucket.spanning_events.push(item.clone());
            } else {
                bucket.day_events.push(item.clone());
            }
            bucket.all_events.push(item.clone());
        }
        buckets.insert(day_key(day), bucket);
    }

    debug!(
        days = days.len(),
        items = items.len(),
        "partitioned collection by day"
    );
    buckets
}

// ── Week / day view ─────────────────────────────────────────────────────────

/// A timed event (or one day's slice of a multi-day timed event) placed in a
/// time-grid column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEvent {
    pub item: EventCollectionItem,
    /// The day of the column this slice sits in.
    pub day: NaiveDate,
    pub column: usize,
    pub lane: usize,
    pub lane_count: usize,
    /// Pixels from the top of the column.
    pub top: f64,
    /// Height in pixels.
    pub height: f64,
    /// Fraction of the column width.
    pub left: f64,
    /// Fraction of the column width.
    pub width: f64,
    pub z_index: u32,
    /// The event starts on this day.
    pub is_first_day: bool,
    /// The event ends on this day.
    pub is_last_day: bool,
}

/// An all-day event laid out across the header row of a week or day view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllDaySpan {
    pub item: EventCollectionItem,
    pub lane: usize,
    /// First visible column the event covers.
    pub first_column: usize,
    /// Last visible column the event covers.
    pub last_column: usize,
    /// Pixels from the top of the header row.
    pub top: f64,
    /// The event starts in `first_column` rather than before the visible days.
    pub is_first_day: bool,
    /// The event ends in `last_column` rather than after the visible days.
    pub is_last_day: bool,
}

/// One visible day's share of an [`AllDaySpan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllDaySlot<'a> {
    pub span: &'a AllDaySpan,
    pub day: NaiveDate,
    pub column: usize,
    pub is_first_day: bool,
    pub is_last_day: bool,
}

/// Result of [`partition_for_columns`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLayout {
    pub days: Vec<NaiveDate>,
    /// Length of each column's day in minutes; 1380 or 1500 across DST changes.
    pub column_minutes: Vec<i64>,
    pub all_day_events: Vec<AllDaySpan>,
    pub all_day_lane_count: usize,
    /// One list per entry of `days`.
    pub positioned_events: Vec<Vec<PositionedEvent>>,
}

impl ColumnLayout {
    /// The header spans broken into per-day slots, one list per column.
    ///
    /// A span shows `is_first_day` only in the column of the day the event
    /// starts, and `is_last_day` only in the column of the day it ends.
    pub fn all_day_slots(&self) -> Vec<Vec<AllDaySlot<'_>>> {
        let mut slots = vec![Vec::new(); self.days.len()];
        for span in &self.all_day_events {
            for column in span.first_column..=span.last_column {
                let Some(&day) = self.days.get(column) else {
                    continue;
                };
                slots[column].push(AllDaySlot {
                    span,
                    day,
                    column,
                    is_first_day: span.is_first_day && column == span.first_column,
                    is_last_day: span.is_last_day && column == span.last_column,
                });
            }
        }
        slots
    }

    /// Positioned slices for the column showing `day`.
    pub fn column_for(&self, day: NaiveDate) -> Option<&[PositionedEvent]> {
        let column = self.days.iter().position(|d| *d == day)?;
        self.positioned_events.get(column).map(Vec::as_slice)
    }

    /// Timed lanes in the busiest column.
    pub fn max_lane_count(&self) -> usize {
        self.positioned_events
            .iter()
            .flatten()
            .map(|p| p.lane_count)
            .max()
            .unwrap_or(0)
    }
}

/// Lay out items for a week or day view.
///
/// Timed events are positioned per column by minutes elapsed since local
/// midnight, with `cell_height_px` pixels per hour. A column is as long as its
/// day really is: 1380 minutes on a spring-forward day, 1500 on a fall-back
/// day, so events that overlap in time never share a lane. A timed event
/// covering several days is clipped and positioned once in every visible
/// column it touches. All-day events go to the header row with lanes computed
/// across visible columns. `days` must be in ascending order; a day view
/// passes a single day.
///
/// # Errors
///
/// Returns [`crate::LayoutError::InvalidDatetime`] if a column's local
/// midnight cannot be resolved in `tz`.
pub fn partition_for_columns(
    items: &[EventCollectionItem],
    days: &[NaiveDate],
    cell_height_px: f64,
    tz: &Tz,
    config: &LayoutConfig,
) -> Result<ColumnLayout> {
    let mut sorted: Vec<EventCollectionItem> = items.iter().map(|i| i.in_timezone(tz)).collect();
    sort_items(&mut sorted);

    let (all_day, timed): (Vec<_>, Vec<_>) = sorted.into_iter().partition(|i| i.is_all_day());

    let (all_day_events, all_day_lane_count) = place_all_day(all_day, days, config);

    let pixels_per_minute = cell_height_px / 60.0;
    let mut column_minutes = Vec::with_capacity(days.len());
    let mut positioned_events = Vec::with_capacity(days.len());
    for (column, &day) in days.iter().enumerate() {
        let window = DayWindow::new(day, tz)?;
        column_minutes.push(window.minutes);
        positioned_events.push(place_column(&timed, &window, column, pixels_per_minute, config));
    }

    debug!(
        days = days.len(),
        all_day = all_day_events.len(),
        timed = timed.len(),
        "partitioned collection into columns"
    );

    Ok(ColumnLayout {
        days: days.to_vec(),
        column_minutes,
        all_day_events,
        all_day_lane_count,
        positioned_events,
    })
}

/// One column's day as an instant range.
struct DayWindow {
    day: NaiveDate,
    start: DateTime<Tz>,
    /// Elapsed minutes from local midnight to the next local midnight.
    minutes: i64,
}

impl DayWindow {
    fn new(day: NaiveDate, tz: &Tz) -> Result<Self> {
        Ok(DayWindow {
            day,
            start: start_of_day(day, tz)?,
            minutes: day_minutes(day, tz)?,
        })
    }

    /// Start and end of an item's slice, in minutes since local midnight.
    fn slice(&self, item: &EventCollectionItem) -> (i64, i64) {
        let start = (item.start - self.start).num_minutes().clamp(0, self.minutes);
        let end = (item.end - self.start).num_minutes().clamp(0, self.minutes);
        (start, end.max(start))
    }
}

fn place_column(
    timed: &[EventCollectionItem],
    window: &DayWindow,
    column: usize,
    pixels_per_minute: f64,
    config: &LayoutConfig,
) -> Vec<PositionedEvent> {
    let day = window.day;
    let slices: Vec<(&EventCollectionItem, i64, i64)> = timed
        .iter()
        .filter(|item| item.covers(day))
        .map(|item| {
            let (start, end) = window.slice(item);
            (item, start, end)
        })
        .collect();

    let assignment = assign_lanes(
        &slices,
        |(_, start, end)| (*start, (*end).max(start + config.min_event_minutes)),
        |(item, _, _)| item.id(),
    );

    assignment
        .order
        .iter()
        .map(|&index| {
            let (item, start, end) = slices[index];
            let lane = assignment.lanes[index];
            let (top, height) =
                time_geometry(start, end, pixels_per_minute, config.min_event_minutes);
            let (left, width) = column_geometry(lane, assignment.lane_count);
            PositionedEvent {
                item: item.clone(),
                day,
                column,
                lane,
                lane_count: assignment.lane_count,
                top,
                height,
                left,
                width,
                z_index: z_index(lane),
                is_first_day: item.first_date() == day,
                is_last_day: item.last_date() == day,
            }
        })
        .collect()
}

fn place_all_day(
    all_day: Vec<EventCollectionItem>,
    days: &[NaiveDate],
    config: &LayoutConfig,
) -> (Vec<AllDaySpan>, usize) {
    // Visible columns an item covers; contiguous because `days` is ascending.
    let covered: Vec<(EventCollectionItem, usize, usize)> = all_day
        .into_iter()
        .filter_map(|item| {
            let first = days.iter().position(|d| item.covers(*d))?;
            let last = days.iter().rposition(|d| item.covers(*d))?;
            Some((item, first, last))
        })
        .collect();

    let assignment = assign_lanes(
        &covered,
        |(_, first, last)| (*first, last + 1),
        |(item, _, _)| item.id(),
    );

    let spans = assignment
        .order
        .iter()
        .map(|&index| {
            let (item, first_column, last_column) = &covered[index];
            let lane = assignment.lanes[index];
            AllDaySpan {
                is_first_day: item.first_date() == days[*first_column],
                is_last_day: item.last_date() == days[*last_column],
                item: item.clone(),
                lane,
                first_column: *first_column,
                last_column: *last_column,
                top: chip_top(lane, config.chip_height_px, config.chip_gap_px),
            }
        })
        .collect();

    (spans, assignment.lane_count)
}
