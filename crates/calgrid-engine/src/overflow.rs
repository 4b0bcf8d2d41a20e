//! Fit stacked chips into a measured cell and count what spills over.
//!
//! A month cell or an all-day header row stacks one chip per lane. Given the
//! measured height of the container, [`organize_events_with_overflow`] decides
//! how many lanes fit and moves the rest behind a "+N more" affordance.
//!
//! The calculation is a pure function of its inputs. Callers re-run it on every
//! observed resize; nothing is cached or debounced here.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::EventCollectionItem;
use crate::lanes::{assign_lanes, chip_top};

/// Chip sizing for [`organize_events_with_overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowOptions {
    pub lane_height_px: f64,
    pub lane_gap_px: f64,
    /// Lanes kept visible even when the measured height says otherwise, so a
    /// cell measured at 0px during initial layout still shows something.
    #[serde(default)]
    pub min_visible_lanes: usize,
}

impl Default for OverflowOptions {
    fn default() -> Self {
        OverflowOptions {
            lane_height_px: 20.0,
            lane_gap_px: 2.0,
            min_visible_lanes: 0,
        }
    }
}

/// Where one visible chip sits inside its cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipPlacement {
    pub event_id: String,
    pub lane: usize,
    /// Offset from the top of the chip area in pixels.
    pub top: f64,
}

/// Visible and overflowing lanes of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCapacityInfo {
    pub visible_lanes: Vec<Vec<EventCollectionItem>>,
    /// One entry per event in `visible_lanes`, lane by lane.
    pub visible_chips: Vec<ChipPlacement>,
    pub overflow_lanes: Vec<Vec<EventCollectionItem>>,
    pub has_overflow: bool,
    pub overflow_count: usize,
}

impl EventCapacityInfo {
    /// Number of events shown as chips.
    pub fn visible_count(&self) -> usize {
        self.visible_lanes.iter().map(Vec::len).sum()
    }

    /// Every event that went into the calculation.
    pub fn total_count(&self) -> usize {
        self.visible_count() + self.overflow_count
    }

    /// The overflowing events as one flat list, lane by lane.
    pub fn overflow_events(&self) -> impl Iterator<Item = &EventCollectionItem> {
        self.overflow_lanes.iter().flatten()
    }
}

/// How many lanes of `lane_height + gap` fit in `available_height_px`.
///
/// The last lane needs no trailing gap, hence the `+ gap` on the height. At
/// least one lane is granted whenever there is something to show and the
/// space is positive; `min_visible_lanes` raises the floor further.
pub fn max_visible_lanes(
    available_height_px: f64,
    options: &OverflowOptions,
    has_events: bool,
) -> usize {
    let per_lane = options.lane_height_px + options.lane_gap_px;
    let fitted = if available_height_px.is_finite() && available_height_px > 0.0 && per_lane > 0.0
    {
        let lanes = ((available_height_px + options.lane_gap_px) / per_lane).floor() as usize;
        if has_events {
            lanes.max(1)
        } else {
            lanes
        }
    } else {
        0
    };
    fitted.max(options.min_visible_lanes)
}

/// Split a cell's events into visible lanes and overflow.
///
/// Lanes are assigned at local-day granularity in `tz`: each event occupies
/// `[first day, last day + 1)`, so every event of one day gets its own row and
/// a multi-day event blocks its row on every day it covers.
pub fn organize_events_with_overflow(
    events: &[EventCollectionItem],
    available_height_px: f64,
    tz: &Tz,
    options: &OverflowOptions,
) -> EventCapacityInfo {
    let assignment = assign_lanes(
        events,
        |item| {
            let (first, last) = item.dates_in(tz);
            (first, last.succ_opt().unwrap_or(last))
        },
        |item| item.id(),
    );

    let mut lanes: Vec<Vec<EventCollectionItem>> = assignment
        .by_lane()
        .into_iter()
        .map(|indices| indices.into_iter().map(|i| events[i].clone()).collect())
        .collect();

    let visible = max_visible_lanes(available_height_px, options, !events.is_empty());
    let overflow_lanes = lanes.split_off(visible.min(lanes.len()));
    let overflow_count: usize = overflow_lanes.iter().map(Vec::len).sum();

    let visible_chips = lanes
        .iter()
        .enumerate()
        .flat_map(|(lane, items)| {
            let top = chip_top(lane, options.lane_height_px, options.lane_gap_px);
            items.iter().map(move |item| ChipPlacement {
                event_id: item.id().to_string(),
                lane,
                top,
            })
        })
        .collect();

    debug!(
        events = events.len(),
        lanes = assignment.lane_count,
        visible,
        overflow_count,
        "organized events with overflow"
    );

    EventCapacityInfo {
        visible_lanes: lanes,
        visible_chips,
        overflow_lanes,
        has_overflow: overflow_count > 0,
        overflow_count,
    }
}
