//! # calgrid-engine
//!
//! Deterministic layout for calendar views.
//!
//! The engine turns a list of calendar events into what a month, week, or
//! day view needs to draw: per-day buckets, non-overlapping lanes with pixel
//! geometry, "+N more" overflow for cells that are too short, and an
//! optimistic overlay for edits that the server has not confirmed yet. Every
//! step is a pure function of its inputs, evaluated in the viewer's timezone.
//!
//! ## Modules
//!
//! - [`temporal`]: date-only, instant, and zoned boundaries; conversion into the display zone
//! - [`event`]: the raw event record as delivered by providers
//! - [`collection`]: normalized, sortable items and the visible-range pre-filter
//! - [`view`]: view kinds, settings, and the visible day list
//! - [`partition`]: month buckets and time-grid columns
//! - [`lanes`]: greedy lane assignment and column geometry
//! - [`overflow`]: how many chip lanes fit in a measured cell
//! - [`optimistic`]: pending mutations over the confirmed collection
//! - [`layout`]: the end-to-end pipeline
//! - [`cache`]: memoized layouts keyed by their inputs
//! - [`config`]: pixel sizes and thresholds
//! - [`error`]: error types

pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod event;
pub mod lanes;
pub mod layout;
pub mod optimistic;
pub mod overflow;
pub mod partition;
pub mod temporal;
pub mod view;

pub use cache::{LayoutCache, LayoutKey};
pub use collection::{
    build_collection, build_item, filter_by_range, next_event, sort_items, EventCollectionItem,
};
pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use event::{Attendee, AttendeeStatus, CalendarEvent, Conference};
pub use lanes::{assign_lanes, max_concurrency, LaneAssignment};
pub use layout::{compute_layout, MonthLayout, ViewLayout};
pub use optimistic::{
    project, reduce, MutationId, MutationIntent, MutationStatus, OptimisticState, PendingAction,
};
pub use overflow::{
    max_visible_lanes, organize_events_with_overflow, ChipPlacement, EventCapacityInfo,
    OverflowOptions,
};
pub use partition::{
    partition_by_day, partition_for_columns, AllDaySpan, ColumnLayout, EventCollectionByDay,
    PositionedEvent,
};
pub use temporal::{parse_timezone, to_zoned_date_time, EventDate};
pub use view::{visible_days, visible_range, CalendarView, ViewSettings};
