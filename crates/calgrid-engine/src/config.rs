//! Pixel constants for layout geometry.
//!
//! The engine never measures anything: the caller hands these values in,
//! usually loaded once from its own settings file via [`LayoutConfig::from_json_str`].

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::overflow::OverflowOptions;

/// Geometry constants shared by the time grid and chip rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Height of one hour in the week/day time grid.
    pub hour_height_px: f64,
    /// Shortest duration an event occupies in the time grid, so zero-length
    /// events stay clickable and do not share a lane with their neighbours.
    pub min_event_minutes: i64,
    /// Height of one chip (month cells, all-day header row).
    pub chip_height_px: f64,
    /// Vertical gap between stacked chips.
    pub chip_gap_px: f64,
    /// Lanes that stay visible in a cell even when the measured height is smaller.
    pub min_visible_lanes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            hour_height_px: 48.0,
            min_event_minutes: 15,
            chip_height_px: 20.0,
            chip_gap_px: 2.0,
            min_visible_lanes: 0,
        }
    }
}

impl LayoutConfig {
    /// Parse and validate a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSettings`] for malformed JSON or
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig =
            serde_json::from_str(json).map_err(|e| LayoutError::InvalidSettings(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size is finite and usable.
    pub fn validate(&self) -> Result<()> {
        if !self.hour_height_px.is_finite() || self.hour_height_px <= 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "hourHeightPx must be positive, got {}",
                self.hour_height_px
            )));
        }
        if self.min_event_minutes < 0 {
            return Err(LayoutError::InvalidSettings(format!(
                "minEventMinutes must not be negative, got {}",
                self.min_event_minutes
            )));
        }
        if !self.chip_height_px.is_finite() || self.chip_height_px <= 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "chipHeightPx must be positive, got {}",
                self.chip_height_px
            )));
        }
        if !self.chip_gap_px.is_finite() || self.chip_gap_px < 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "chipGapPx must not be negative, got {}",
                self.chip_gap_px
            )));
        }
        Ok(())
    }

    /// Pixels per elapsed minute in the time grid.
    pub fn pixels_per_minute(&self) -> f64 {
        self.hour_height_px / 60.0
    }

    /// Overflow options for chip rows built from this config.
    pub fn overflow_options(&self) -> OverflowOptions {
        OverflowOptions {
            lane_height_px: self.chip_height_px,
            lane_gap_px: self.chip_gap_px,
            min_visible_lanes: self.min_visible_lanes,
        }
    }

    /// Stable textual key of every field, for cache keys.
    pub fn cache_key(&self) -> String {
        format!(
            "h{}:m{}:c{}:g{}:v{}",
            self.hour_height_px,
            self.min_event_minutes,
            self.chip_height_px,
            self.chip_gap_px,
            self.min_visible_lanes
        )
    }
}
