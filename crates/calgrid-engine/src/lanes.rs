//! Lane assignment for overlapping events.
//!
//! Greedy interval partitioning: sort by start, then place each interval in the
//! lowest-indexed lane that has already been vacated, opening a new lane only
//! when every lane is still busy. For half-open intervals this uses exactly as
//! many lanes as the maximum number of intervals open at one instant, which is
//! what the overflow calculator relies on when it counts lanes.
//!
//! Lanes are assigned over a whole day or column, not per connected cluster of
//! overlaps: two unrelated bursts of meetings on the same day share one lane
//! grid, keeping column widths stable across the day.
//!
//! The algorithm is generic over the interval key so the same code lays out
//! minutes in a time grid, dates in a chip row, and column indices in a
//! week header.

use tracing::trace;

/// Result of [`assign_lanes`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaneAssignment {
    /// Lane index per input item, aligned with the input slice.
    pub lanes: Vec<usize>,
    /// Number of lanes opened.
    pub lane_count: usize,
    /// Input indices in placement order (start ascending, longer first, id).
    pub order: Vec<usize>,
}

impl LaneAssignment {
    /// Input indices grouped by lane, each lane in placement order.
    pub fn by_lane(&self) -> Vec<Vec<usize>> {
        let mut grouped = vec![Vec::new(); self.lane_count];
        for &index in &self.order {
            grouped[self.lanes[index]].push(index);
        }
        grouped
    }
}

/// Assign every item a lane so that no two items in one lane overlap.
///
/// `interval` returns the half-open `[start, end)` of an item; an end earlier
/// than the start is treated as the start. `id` breaks ties between items with
/// the same start and length so the result never depends on input order.
pub fn assign_lanes<T, K, F, I>(items: &[T], interval: F, id: I) -> LaneAssignment
where
    K: Ord + Copy,
    F: Fn(&T) -> (K, K),
    I: Fn(&T) -> &str,
{
    let spans: Vec<(K, K)> = items
        .iter()
        .map(|item| {
            let (start, end) = interval(item);
            (start, end.max(start))
        })
        .collect();

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        let (start_a, end_a) = spans[a];
        let (start_b, end_b) = spans[b];
        start_a
            .cmp(&start_b)
            .then_with(|| end_b.cmp(&end_a))
            .then_with(|| id(&items[a]).cmp(id(&items[b])))
    });

    let mut lane_ends: Vec<K> = Vec::new();
    let mut lanes = vec![0; items.len()];

    for &index in &order {
        let (start, end) = spans[index];
        let lane = match lane_ends.iter().position(|lane_end| *lane_end <= start) {
            Some(free) => {
                lane_ends[free] = end;
                free
            }
            None => {
                lane_ends.push(end);
                lane_ends.len() - 1
            }
        };
        lanes[index] = lane;
    }

    trace!(items = items.len(), lanes = lane_ends.len(), "assigned lanes");

    LaneAssignment {
        lanes,
        lane_count: lane_ends.len(),
        order,
    }
}

/// Largest number of half-open intervals open at one instant.
///
/// Empty intervals occupy no time and are not counted.
pub fn max_concurrency<K, It>(intervals: It) -> usize
where
    K: Ord + Copy,
    It: IntoIterator<Item = (K, K)>,
{
    // Ends sort before starts at the same key: [9, 10) and [10, 11) never
    // count as concurrent.
    let mut edges: Vec<(K, i8)> = Vec::new();
    for (start, end) in intervals {
        if start < end {
            edges.push((start, 1));
            edges.push((end, -1));
        }
    }
    edges.sort();

    let mut open: i64 = 0;
    let mut peak: i64 = 0;
    for (_, delta) in edges {
        open += i64::from(delta);
        peak = peak.max(open);
    }
    peak as usize
}

/// Horizontal placement of a lane as fractions of the column width.
pub fn column_geometry(lane: usize, lane_count: usize) -> (f64, f64) {
    let total = lane_count.max(1) as f64;
    (lane as f64 / total, 1.0 / total)
}

/// Vertical placement in a time grid, in pixels.
///
/// Events shorter than `min_minutes` are drawn `min_minutes` tall.
pub fn time_geometry(
    start_minute: i64,
    end_minute: i64,
    pixels_per_minute: f64,
    min_minutes: i64,
) -> (f64, f64) {
    let minutes = (end_minute - start_minute).max(min_minutes).max(0);
    (
        start_minute as f64 * pixels_per_minute,
        minutes as f64 * pixels_per_minute,
    )
}

/// Vertical offset of a chip in a stacked row.
pub fn chip_top(lane: usize, chip_height_px: f64, chip_gap_px: f64) -> f64 {
    lane as f64 * (chip_height_px + chip_gap_px)
}

/// Paint order for a lane; later lanes sit above earlier ones.
pub fn z_index(lane: usize) -> u32 {
    u32::try_from(lane).map_or(u32::MAX, |lane| lane.saturating_add(1))
}
