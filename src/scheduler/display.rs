//! Calendar display merge: colors, stacking, and the render-time shift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::PropertyId;
use crate::models::{Posting, ScheduleSlot, Visit};

/// Fixed palette cycled over properties by index.
pub const PALETTE: [&str; 8] = [
    "blue", "emerald", "amber", "rose", "violet", "cyan", "orange", "teal",
];

/// Display color for the property at `index` in the calendar's property
/// list; wraps past the palette size.
pub fn property_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Stored timestamps carry a UTC-3 wall-clock assumption; displayed times
/// are corrected by this fixed offset at the render boundary only. Persisted
/// values are never shifted.
const DISPLAY_SHIFT: i64 = 3;

fn shifted(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts + Duration::hours(DISPLAY_SHIFT)
}

/// Which slot sources the calendar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Available,
    Visits,
}

impl ViewMode {
    pub fn includes_availability(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Available)
    }

    pub fn includes_visits(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Visits)
    }
}

/// Kind of a merged display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Availability,
    Visit,
}

// Visits stack above availability windows so a booking is never hidden
// behind the window it was booked out of.
const Z_AVAILABILITY: i32 = 0;
const Z_VISIT: i32 = 10;

/// One renderable calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySlot {
    pub id: Uuid,
    pub property_id: PropertyId,
    pub kind: SlotKind,
    /// Render-time start; shifted, not the stored value.
    pub start_timestamp: DateTime<Utc>,
    /// Render-time end; shifted, not the stored value.
    pub end_timestamp: DateTime<Utc>,
    pub status: String,
    pub color: String,
    /// Visual stacking order; higher draws on top.
    pub z_index: i32,
    /// Solid "occupied" rendering for visits, translucent outline for
    /// availability.
    pub occupied: bool,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

fn color_for(property_id: PropertyId, properties: &[Posting]) -> String {
    properties
        .iter()
        .position(|p| p.id == property_id)
        .map(property_color)
        .unwrap_or(PALETTE[0])
        .to_string()
}

fn availability_entry(slot: &ScheduleSlot, properties: &[Posting]) -> DisplaySlot {
    DisplaySlot {
        id: slot.id.value(),
        property_id: slot.property_id,
        kind: SlotKind::Availability,
        start_timestamp: shifted(slot.start_timestamp),
        end_timestamp: shifted(slot.end_timestamp),
        status: slot.status.as_str().to_string(),
        color: color_for(slot.property_id, properties),
        z_index: Z_AVAILABILITY,
        occupied: false,
        label: "Available".to_string(),
        client_name: None,
    }
}

fn visit_entry(visit: &Visit, properties: &[Posting]) -> DisplaySlot {
    let label = match visit.client_name.as_deref() {
        Some(name) => format!("Visit - {}", name),
        None => "Visit".to_string(),
    };
    DisplaySlot {
        id: visit.id.value(),
        property_id: visit.property_id,
        kind: SlotKind::Visit,
        start_timestamp: shifted(visit.start_date),
        end_timestamp: shifted(visit.end_date),
        status: visit.status.clone(),
        color: color_for(visit.property_id, properties),
        z_index: Z_VISIT,
        occupied: true,
        label,
        client_name: visit.client_name.clone(),
    }
}

/// Merge availability slots and visits into one render sequence.
///
/// Availability entries come first, then visits, each in the order they were
/// fetched; stacking order, not position in the sequence, decides what draws
/// on top. The shift is applied here exactly once per call and the inputs
/// are left untouched.
pub fn merge_display_slots(
    properties: &[Posting],
    slots: &[ScheduleSlot],
    visits: &[Visit],
    view: ViewMode,
) -> Vec<DisplaySlot> {
    let mut merged = Vec::new();

    if view.includes_availability() {
        merged.extend(slots.iter().map(|s| availability_entry(s, properties)));
    }
    if view.includes_visits() {
        merged.extend(visits.iter().map(|v| visit_entry(v, properties)));
    }

    merged
}
