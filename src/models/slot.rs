//! Availability and visit slot records.
//!
//! A [`ScheduleSlot`] is an agent-declared availability window on one
//! property. A [`Visit`] is a booked viewing created by the booking flow;
//! this backend only reads visits. Both carry raw UTC timestamps; any
//! display-time correction is applied at the rendering boundary, never here.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ClientId, PropertyId, SlotId, VisitId};

/// Lifecycle status of an availability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Cancelled,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SlotStatus::Available),
            "cancelled" => Ok(SlotStatus::Cancelled),
            other => Err(format!("Unknown slot status: {}", other)),
        }
    }
}

/// Agent-declared availability window for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: SlotId,
    pub property_id: PropertyId,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub status: SlotStatus,
}

impl ScheduleSlot {
    /// Inclusive-bound intersection test against a candidate range.
    ///
    /// Both boundaries count: a slot that merely touches the range at a
    /// single instant is reported as intersecting.
    pub fn intersects_inclusive(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_timestamp <= end && self.end_timestamp >= start
    }
}

/// Booked viewing on a property, created by the booking flow.
///
/// Read-only here; `client_name` is joined in by the repository when the
/// client record is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub property_id: PropertyId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

/// Candidate availability window produced from a grid selection.
///
/// Not persisted; becomes a [`ScheduleSlot`] only after the overlap check
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub property_id: PropertyId,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
}

impl SlotCandidate {
    /// Build a candidate from a drag selection of whole hours on one day.
    ///
    /// The two hours may arrive in either order; the range is normalized to
    /// `start = min(a, b)` and `end = max(a, b) + 1` so the end boundary is
    /// exclusive and selecting a single hour yields a one-hour window.
    pub fn from_hour_selection(
        property_id: PropertyId,
        date: NaiveDate,
        hour_a: u32,
        hour_b: u32,
    ) -> Result<Self, String> {
        if hour_a > 23 || hour_b > 23 {
            return Err(format!(
                "Selection hours must be within 0-23, got {} and {}",
                hour_a, hour_b
            ));
        }

        let start_hour = hour_a.min(hour_b);
        let end_hour = hour_a.max(hour_b) + 1;

        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        Ok(Self {
            property_id,
            start_timestamp: midnight + Duration::hours(i64::from(start_hour)),
            end_timestamp: midnight + Duration::hours(i64::from(end_hour)),
        })
    }

    /// Window length in whole hours.
    pub fn duration_hours(&self) -> i64 {
        (self.end_timestamp - self.start_timestamp).num_hours()
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod slot_tests;
