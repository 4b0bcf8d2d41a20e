//! Temporal normalization for event layout.
//!
//! Every event boundary arrives in one of three shapes: a date-only value, an
//! absolute instant, or a wall-clock datetime qualified by the zone it was
//! authored in. Layout only ever compares datetimes projected into the
//! caller's display time zone, so everything funnels through
//! [`to_zoned_date_time`].
//!
//! # Functions
//!
//! - [`parse_timezone`]: Look up an IANA time zone, failing loudly
//! - [`to_zoned_date_time`]: Project an [`EventDate`] into a display zone
//! - [`start_of_day`]: Local midnight of a date in a zone
//! - [`day_minutes`]: Real length of a local day, 1380 to 1500 across DST
//! - [`start_of_week`]: First day of the week containing a date
//!
//! # Local time resolution
//!
//! Wall-clock values that fall into a DST fold resolve to the earlier of the
//! two instants. Values inside a DST gap are pushed forward by one hour,
//! matching how calendar applications treat "2:30 AM" on spring-forward day.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

// ── EventDate ───────────────────────────────────────────────────────────────

/// One boundary of an event as supplied by a provider.
///
/// The zoned variant keeps the zone the event was authored in; projecting it
/// into the display zone never overwrites this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventDate {
    /// A calendar date with no time of day, used by all-day events.
    Date(NaiveDate),
    /// A point in time with no associated zone.
    Instant(DateTime<Utc>),
    /// A wall-clock datetime in a named IANA zone.
    #[serde(rename_all = "camelCase")]
    Zoned {
        date_time: NaiveDateTime,
        time_zone: String,
    },
}

impl EventDate {
    /// Parse the textual form of an event boundary.
    ///
    /// Accepted shapes:
    ///
    /// - `2026-03-16`: date-only
    /// - `2026-03-16T14:00:00Z`, `2026-03-16T09:00:00-05:00`: absolute instant
    /// - `2026-03-16T10:00:00[America/New_York]`: zone-qualified wall time
    ///   (an offset before the bracket is accepted and ignored in favour of the
    ///   named zone)
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnsupportedDate`] for anything else, and
    /// [`LayoutError::InvalidTimezone`] if the bracketed zone is unknown.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some((local, zone)) = split_bracketed_zone(s) {
            parse_timezone(zone)?;
            let date_time = parse_local_datetime(local)
                .ok_or_else(|| LayoutError::UnsupportedDate(format!("'{s}'")))?;
            return Ok(EventDate::Zoned {
                date_time,
                time_zone: zone.to_string(),
            });
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(EventDate::Instant(dt.with_timezone(&Utc)));
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(EventDate::Date(date));
        }

        Err(LayoutError::UnsupportedDate(format!("'{s}'")))
    }

    /// Whether this value is date-only (no time of day).
    pub fn is_date_only(&self) -> bool {
        matches!(self, EventDate::Date(_))
    }

    /// The zone this value was authored in, when it carries one.
    pub fn authored_zone(&self) -> Option<&str> {
        match self {
            EventDate::Zoned { time_zone, .. } => Some(time_zone),
            _ => None,
        }
    }
}

impl FromStr for EventDate {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        EventDate::parse(s)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventDate::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventDate::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
            EventDate::Zoned {
                date_time,
                time_zone,
            } => write!(f, "{}[{}]", date_time.format("%Y-%m-%dT%H:%M:%S"), time_zone),
        }
    }
}

/// Split `2026-03-16T10:00:00[Europe/Paris]` into its local part and zone.
fn split_bracketed_zone(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_suffix(']')?;
    let (local, zone) = body.split_once('[')?;
    Some((local, zone))
}

/// Parse the local part of a zoned value, with or without seconds or offset.
fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}

// ── Normalization ───────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
///
/// An unknown identifier is a caller bug: this never falls back to UTC, since
/// a silent default would misplace every event by an unpredictable offset.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidTimezone`] if the name is not a known IANA zone.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| LayoutError::InvalidTimezone(format!("'{s}'")))
}

/// Project an event boundary into the display time zone.
///
/// - Date-only values become local midnight in `tz`.
/// - Instants are reprojected into `tz`.
/// - Zoned values are resolved in their authored zone, then re-expressed in `tz`.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidTimezone`] if a zoned value names an unknown
/// zone, or [`LayoutError::InvalidDatetime`] if a wall-clock time cannot be
/// resolved at all.
///
/// # Examples
///
/// ```
/// use calgrid_engine::temporal::{parse_timezone, to_zoned_date_time, EventDate};
///
/// let tz = parse_timezone("America/New_York").unwrap();
/// let instant = EventDate::parse("2026-03-16T14:00:00Z").unwrap();
/// let local = to_zoned_date_time(&instant, &tz).unwrap();
/// // March 16 2026 is EDT (UTC-4)
/// assert_eq!(local.to_rfc3339(), "2026-03-16T10:00:00-04:00");
/// ```
pub fn to_zoned_date_time(value: &EventDate, tz: &Tz) -> Result<DateTime<Tz>> {
    match value {
        EventDate::Date(date) => start_of_day(*date, tz),
        EventDate::Instant(instant) => Ok(instant.with_timezone(tz)),
        EventDate::Zoned {
            date_time,
            time_zone,
        } => {
            let authored = parse_timezone(time_zone)?;
            Ok(resolve_local(&authored, date_time)?.with_timezone(tz))
        }
    }
}

/// Resolve a wall-clock datetime in `tz`, earliest instant first, skipping
/// forward over DST gaps.
pub fn resolve_local(tz: &Tz, naive: &NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(naive)
        .earliest()
        .or_else(|| {
            let shifted = *naive + Duration::hours(1);
            tz.from_local_datetime(&shifted).earliest()
        })
        .ok_or_else(|| {
            LayoutError::InvalidDatetime(format!("'{naive}' does not exist in {}", tz.name()))
        })
}

/// Local midnight of `date` in `tz`.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    resolve_local(tz, &date.and_time(NaiveTime::MIN))
}

/// Minutes from local midnight of `date` to local midnight of the next day.
///
/// A time grid column is this long, so every instant of the day has its own
/// position even when the clock repeats an hour.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidDatetime`] if `date` is the last
/// representable day or either midnight cannot be resolved in `tz`.
pub fn day_minutes(date: NaiveDate, tz: &Tz) -> Result<i64> {
    let next = date
        .succ_opt()
        .ok_or_else(|| LayoutError::InvalidDatetime(format!("no day after {date}")))?;
    Ok((start_of_day(next, tz)? - start_of_day(date, tz)?).num_minutes())
}

/// ISO day key (`YYYY-MM-DD`) used to index per-day buckets.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an ISO day key back into a date.
pub fn parse_day_key(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| LayoutError::InvalidDatetime(format!("'{s}': {e}")))
}

// ── Week arithmetic ─────────────────────────────────────────────────────────

/// How many days `weekday` is from the week-start day.
pub fn days_from_week_start(weekday: Weekday, week_start: Weekday) -> i64 {
    let offset = 7 + weekday.num_days_from_monday() - week_start.num_days_from_monday();
    i64::from(offset % 7)
}

/// The first day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    date - Duration::days(days_from_week_start(date.weekday(), week_start))
}

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ── Tests ───────────────────────────────────────────────────────────────────
