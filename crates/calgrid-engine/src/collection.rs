//! Build the canonical per-view event collection.
//!
//! Each [`CalendarEvent`] becomes an [`EventCollectionItem`] whose start and
//! end are projected into the display zone. Date-only ends are exclusive in
//! the source data; the builder stores them one second earlier so that an
//! event "ending at midnight of day N" has day N-1 as its last day, and every
//! later stage can compare ends inclusively.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::event::CalendarEvent;
use crate::temporal::to_zoned_date_time;

/// An event with its boundaries normalized into the display zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCollectionItem {
    pub event: CalendarEvent,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl EventCollectionItem {
    pub fn id(&self) -> &str {
        &self.event.id
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_all_day(&self) -> bool {
        self.event.is_all_day()
    }

    /// First local day this item covers.
    pub fn first_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last local day this item covers.
    ///
    /// A timed item ending exactly at midnight does not cover the new day.
    /// All-day items already had their end pulled back by the builder.
    pub fn last_date(&self) -> NaiveDate {
        last_covered_date(&self.start, &self.end)
    }

    /// First and last covered day as seen from another zone.
    pub fn dates_in(&self, tz: &Tz) -> (NaiveDate, NaiveDate) {
        let start = self.start.with_timezone(tz);
        let end = self.end.with_timezone(tz);
        (start.date_naive(), last_covered_date(&start, &end))
    }

    /// Whether the item covers more than one local day.
    pub fn is_multi_day(&self) -> bool {
        self.first_date() != self.last_date()
    }

    /// Whether the item covers `day`.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.first_date() <= day && day <= self.last_date()
    }

    /// The same item re-expressed in another zone.
    pub fn in_timezone(&self, tz: &Tz) -> EventCollectionItem {
        EventCollectionItem {
            event: self.event.clone(),
            start: self.start.with_timezone(tz),
            end: self.end.with_timezone(tz),
        }
    }
}

fn last_covered_date(start: &DateTime<Tz>, end: &DateTime<Tz>) -> NaiveDate {
    let end_date = end.date_naive();
    if end > start && end.time() == NaiveTime::MIN {
        end_date.pred_opt().unwrap_or(end_date)
    } else {
        end_date
    }
}

/// Normalize a single event into the display zone.
///
/// # Errors
///
/// Propagates [`crate::LayoutError::InvalidTimezone`] when a zoned boundary
/// names an unknown zone.
pub fn build_item(event: &CalendarEvent, tz: &Tz) -> Result<EventCollectionItem> {
    let start = to_zoned_date_time(&event.start, tz)?;
    let mut end = to_zoned_date_time(&event.end, tz)?;

    if event.is_all_day() || event.end.is_date_only() {
        end = end - Duration::seconds(1);
    }

    if end < start {
        warn!(
            event_id = %event.id,
            start = %start.to_rfc3339(),
            end = %end.to_rfc3339(),
            "event ends before it starts, clamping to zero duration"
        );
        end = start;
    }

    Ok(EventCollectionItem {
        event: event.clone(),
        start,
        end,
    })
}

/// Normalize every event into the display zone, one item per event.
///
/// Output order follows input order; callers that need chronological order
/// sort with [`sort_items`].
pub fn build_collection(events: &[CalendarEvent], tz: &Tz) -> Result<Vec<EventCollectionItem>> {
    let items = events
        .iter()
        .map(|event| build_item(event, tz))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = items.len(), tz = tz.name(), "built event collection");
    Ok(items)
}

/// Drop items that cannot overlap `[range_start, range_end]`.
///
/// The test is inclusive on both ends so that borderline items are kept;
/// the partitioner makes the exact per-day decision.
pub fn filter_by_range<T: TimeZone>(
    items: &[EventCollectionItem],
    range_start: &DateTime<T>,
    range_end: &DateTime<T>,
) -> Vec<EventCollectionItem> {
    let kept: Vec<EventCollectionItem> = items
        .iter()
        .filter(|item| item.end >= *range_start && item.start <= *range_end)
        .cloned()
        .collect();
    debug!(
        total = items.len(),
        kept = kept.len(),
        "filtered collection to visible range"
    );
    kept
}

/// Display order: start ascending, longer duration first, then event id.
pub fn compare_items(a: &EventCollectionItem, b: &EventCollectionItem) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.duration().cmp(&a.duration()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Sort items into display order in place.
pub fn sort_items(items: &mut [EventCollectionItem]) {
    items.sort_by(compare_items);
}

/// The first item in a start-sorted collection that has not ended by `now`.
///
/// Items that started before `now` and are still running are returned ahead
/// of later ones, so this answers "what is on now or next".
pub fn next_event<'a, T: TimeZone>(
    items: &'a [EventCollectionItem],
    now: &DateTime<T>,
) -> Option<&'a EventCollectionItem> {
    // Everything starting after `now` is upcoming; among earlier items only
    // ones still running qualify.
    let upcoming = items.partition_point(|item| item.start <= *now);
    items[..upcoming]
        .iter()
        .find(|item| item.end > *now)
        .or_else(|| items.get(upcoming))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{parse_timezone, EventDate};
    use chrono::Utc;

    fn event(id: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(
            id,
            id,
            EventDate::parse(start).unwrap(),
            EventDate::parse(end).unwrap(),
        )
    }

    fn utc() -> Tz {
        parse_timezone("UTC").unwrap()
    }

    #[test]
    fn test_all_day_end_pulled_back_one_second() {
        let item = build_item(&event("a", "2026-03-16", "2026-03-17"), &utc()).unwrap();
        assert_eq!(item.end.to_rfc3339(), "2026-03-16T23:59:59+00:00");
        assert!(!item.is_multi_day());
        assert_eq!(item.last_date(), item.first_date());
    }

    #[test]
    fn test_all_day_flag_with_instants_also_adjusted() {
        let mut e = event("a", "2026-03-16T00:00:00Z", "2026-03-18T00:00:00Z");
        e.all_day = true;
        let item = build_item(&e, &utc()).unwrap();
        assert_eq!(item.last_date(), NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
    }

    #[test]
    fn test_end_before_start_clamped() {
        let item = build_item(
            &event("a", "2026-03-16T10:00:00Z", "2026-03-16T09:00:00Z"),
            &utc(),
        )
        .unwrap();
        assert_eq!(item.start, item.end);
    }

    #[test]
    fn test_zero_length_date_only_clamped() {
        let item = build_item(&event("a", "2026-03-16", "2026-03-16"), &utc()).unwrap();
        assert_eq!(item.start, item.end);
    }

    #[test]
    fn test_timed_event_ending_at_midnight_stays_on_its_day() {
        let item = build_item(
            &event("late", "2026-03-16T22:00:00Z", "2026-03-17T00:00:00Z"),
            &utc(),
        )
        .unwrap();
        assert!(!item.is_multi_day());
        assert!(item.covers(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()));
        assert!(!item.covers(NaiveDate::from_ymd_opt(2026, 3, 17).unwrap()));
    }

    #[test]
    fn test_invalid_zone_propagates() {
        let bad = CalendarEvent::new(
            "a",
            "a",
            EventDate::Zoned {
                date_time: NaiveDate::from_ymd_opt(2026, 3, 16)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
                time_zone: "Nowhere/Special".to_string(),
            },
            EventDate::parse("2026-03-16T10:00:00Z").unwrap(),
        );
        assert!(build_collection(&[bad], &utc()).is_err());
    }

    #[test]
    fn test_filter_is_inclusive() {
        let tz = utc();
        let items = build_collection(
            &[
                event("before", "2026-03-15T08:00:00Z", "2026-03-15T09:00:00Z"),
                event("touching", "2026-03-15T23:00:00Z", "2026-03-16T00:00:00Z"),
                event("inside", "2026-03-16T10:00:00Z", "2026-03-16T11:00:00Z"),
                event("after", "2026-03-17T00:00:00Z", "2026-03-17T01:00:00Z"),
            ],
            &tz,
        )
        .unwrap();
        let start = tz.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2026, 3, 16, 23, 59, 59).unwrap();
        let kept = filter_by_range(&items, &start, &end);
        let ids: Vec<&str> = kept.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["touching", "inside"]);
    }

    #[test]
    fn test_compare_longer_first_then_id() {
        let tz = utc();
        let mut items = build_collection(
            &[
                event("b", "2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z"),
                event("c", "2026-03-16T09:00:00Z", "2026-03-16T12:00:00Z"),
                event("a", "2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z"),
                event("z", "2026-03-16T08:00:00Z", "2026-03-16T08:30:00Z"),
            ],
            &tz,
        )
        .unwrap();
        sort_items(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["z", "c", "a", "b"]);
    }

    #[test]
    fn test_next_event_prefers_running() {
        let tz = utc();
        let mut items = build_collection(
            &[
                event("done", "2026-03-16T08:00:00Z", "2026-03-16T09:00:00Z"),
                event("running", "2026-03-16T09:30:00Z", "2026-03-16T11:00:00Z"),
                event("later", "2026-03-16T12:00:00Z", "2026-03-16T13:00:00Z"),
            ],
            &tz,
        )
        .unwrap();
        sort_items(&mut items);

        let now = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
        assert_eq!(next_event(&items, &now).map(|i| i.id()), Some("running"));

        let evening = Utc.with_ymd_and_hms(2026, 3, 16, 11, 30, 0).unwrap();
        assert_eq!(next_event(&items, &evening).map(|i| i.id()), Some("later"));

        let night = Utc.with_ymd_and_hms(2026, 3, 16, 23, 0, 0).unwrap();
        assert!(next_event(&items, &night).is_none());
    }
}
