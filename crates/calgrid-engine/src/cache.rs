//! Memoization of computed layouts.
//!
//! The engine itself is a pure function; this cache sits beside it and is
//! owned by whoever drives re-rendering. A layout is reused when nothing that
//! feeds it has changed: the event list version, the visible day range, the
//! display zone, and the view preferences.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::trace;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::event::CalendarEvent;
use crate::layout::{compute_layout, ViewLayout};
use crate::view::{range_key, visible_days, CalendarView, ViewSettings};

/// Everything a layout depends on, reduced to comparable values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    /// Bumped by the caller whenever its event list changes.
    pub events_version: u64,
    pub range_key: String,
    pub time_zone: String,
    pub preferences_key: String,
}

impl LayoutKey {
    /// # Errors
    ///
    /// Returns [`crate::LayoutError::InvalidSettings`] for an invalid week start.
    pub fn new(
        events_version: u64,
        view: &CalendarView,
        settings: &ViewSettings,
        config: &LayoutConfig,
    ) -> Result<Self> {
        let days = visible_days(view, settings)?;
        Ok(LayoutKey {
            events_version,
            range_key: range_key(&days),
            time_zone: settings.time_zone.clone(),
            preferences_key: format!(
                "{}:{}:{}",
                view.kind(),
                settings.preferences_key(),
                config.cache_key()
            ),
        })
    }
}

/// Bounded map of recent layouts, evicting the oldest insert first.
#[derive(Debug)]
pub struct LayoutCache {
    capacity: usize,
    entries: HashMap<LayoutKey, Arc<ViewLayout>>,
    insertion_order: VecDeque<LayoutKey>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        LayoutCache::new(8)
    }
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        LayoutCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Return the cached layout for these inputs, computing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`compute_layout`]; failures are not cached.
    pub fn get_or_compute(
        &mut self,
        events_version: u64,
        events: &[CalendarEvent],
        view: &CalendarView,
        settings: &ViewSettings,
        config: &LayoutConfig,
    ) -> Result<Arc<ViewLayout>> {
        let key = LayoutKey::new(events_version, view, settings, config)?;
        if let Some(hit) = self.entries.get(&key) {
            trace!(version = events_version, "layout cache hit");
            return Ok(Arc::clone(hit));
        }

        trace!(version = events_version, "layout cache miss");
        let layout = Arc::new(compute_layout(events, view, settings, config)?);
        self.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    fn insert(&mut self, key: LayoutKey, layout: Arc<ViewLayout>) {
        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, layout);
    }

    /// Drop every cached layout.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn week(d: u32) -> CalendarView {
        CalendarView::Week {
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
        }
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let mut cache = LayoutCache::default();
        let settings = ViewSettings::new("UTC");
        let config = LayoutConfig::default();
        let first = cache.get_or_compute(1, &[], &week(16), &settings, &config).unwrap();
        let second = cache.get_or_compute(1, &[], &week(18), &settings, &config).unwrap();
        // same week, same key
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_any_input_change_misses() {
        let mut cache = LayoutCache::default();
        let settings = ViewSettings::new("UTC");
        let config = LayoutConfig::default();
        let base = cache.get_or_compute(1, &[], &week(16), &settings, &config).unwrap();

        let bumped = cache.get_or_compute(2, &[], &week(16), &settings, &config).unwrap();
        assert!(!Arc::ptr_eq(&base, &bumped));

        let other_zone = ViewSettings::new("Europe/Paris");
        cache.get_or_compute(1, &[], &week(16), &other_zone, &config).unwrap();

        let no_weekends = settings.clone().with_weekends(false);
        cache.get_or_compute(1, &[], &week(16), &no_weekends, &config).unwrap();

        cache.get_or_compute(1, &[], &week(23), &settings, &config).unwrap();
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut cache = LayoutCache::new(2);
        let settings = ViewSettings::new("UTC");
        let config = LayoutConfig::default();
        let oldest = cache.get_or_compute(1, &[], &week(2), &settings, &config).unwrap();
        cache.get_or_compute(1, &[], &week(9), &settings, &config).unwrap();
        cache.get_or_compute(1, &[], &week(16), &settings, &config).unwrap();
        assert_eq!(cache.len(), 2);

        let again = cache.get_or_compute(1, &[], &week(2), &settings, &config).unwrap();
        assert!(!Arc::ptr_eq(&oldest, &again));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = LayoutCache::default();
        let bad = ViewSettings::new("Not/AZone");
        assert!(cache
            .get_or_compute(1, &[], &week(16), &bad, &LayoutConfig::default())
            .is_err());
        assert!(cache.is_empty());
    }
}
