//! Availability-slot scheduling engine.
//!
//! Translates grid selections into validated, persisted availability slots,
//! and reconciles availability windows with booked visits for calendar
//! display. The engine owns an in-memory slot collection that is appended to
//! optimistically on successful creates and merged by id against server
//! refetches.

pub mod cache;
pub mod display;
pub mod engine;

pub use cache::SlotCache;
pub use display::{merge_display_slots, property_color, DisplaySlot, SlotKind, ViewMode, PALETTE};
pub use engine::{SchedulerError, SchedulingEngine};

#[cfg(test)]
mod tests;
