use super::*;
use crate::api::PropertyId;
use chrono::TimeZone;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
}

#[test]
fn test_selection_normalizes_ordered_pair() {
    let c = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 10, 12).unwrap();
    assert_eq!(c.start_timestamp, at(10));
    assert_eq!(c.end_timestamp, at(13));
    assert_eq!(c.duration_hours(), 3);
}

#[test]
fn test_selection_normalizes_reversed_pair() {
    let c = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 12, 10).unwrap();
    assert_eq!(c.start_timestamp, at(10));
    assert_eq!(c.end_timestamp, at(13));
}

#[test]
fn test_same_hour_selection_yields_one_hour() {
    let c = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 9, 9).unwrap();
    assert_eq!(c.start_timestamp, at(9));
    assert_eq!(c.end_timestamp, at(10));
    assert_eq!(c.duration_hours(), 1);
}

#[test]
fn test_last_hour_selection_crosses_midnight() {
    let c = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 23, 23).unwrap();
    assert_eq!(c.start_timestamp, at(23));
    assert_eq!(
        c.end_timestamp,
        Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_out_of_range_hour_is_rejected() {
    let result = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 24, 10);
    assert!(result.is_err());

    let result = SlotCandidate::from_hour_selection(PropertyId::generate(), day(), 10, 99);
    assert!(result.is_err());
}

#[test]
fn test_all_valid_pairs_have_positive_duration() {
    let property = PropertyId::generate();
    for a in 0..24 {
        for b in 0..24 {
            let c = SlotCandidate::from_hour_selection(property, day(), a, b).unwrap();
            assert!(
                c.duration_hours() >= 1,
                "pair ({}, {}) produced duration {}",
                a,
                b,
                c.duration_hours()
            );
            assert_eq!(
                c.duration_hours(),
                i64::from(a.max(b) - a.min(b) + 1),
                "pair ({}, {})",
                a,
                b
            );
        }
    }
}

fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleSlot {
    ScheduleSlot {
        id: crate::api::SlotId::generate(),
        property_id: PropertyId::generate(),
        start_timestamp: start,
        end_timestamp: end,
        status: SlotStatus::Available,
    }
}

#[test]
fn test_intersects_inclusive_overlapping_ranges() {
    let s = slot(at(10), at(12));
    assert!(s.intersects_inclusive(at(11), at(13)));
    assert!(s.intersects_inclusive(at(9), at(11)));
    assert!(s.intersects_inclusive(at(10), at(12)));
    assert!(s.intersects_inclusive(at(9), at(13)));
}

#[test]
fn test_intersects_inclusive_counts_touching_boundaries() {
    let s = slot(at(10), at(12));
    // Ranges that only share an endpoint still count as intersecting.
    assert!(s.intersects_inclusive(at(12), at(14)));
    assert!(s.intersects_inclusive(at(8), at(10)));
}

#[test]
fn test_intersects_inclusive_disjoint_ranges() {
    let s = slot(at(10), at(12));
    assert!(!s.intersects_inclusive(at(13), at(15)));
    assert!(!s.intersects_inclusive(at(7), at(9)));
}

#[test]
fn test_slot_status_roundtrip() {
    assert_eq!(SlotStatus::Available.as_str(), "available");
    assert_eq!(
        "available".parse::<SlotStatus>().unwrap(),
        SlotStatus::Available
    );
    assert_eq!(
        "cancelled".parse::<SlotStatus>().unwrap(),
        SlotStatus::Cancelled
    );
    assert!("booked".parse::<SlotStatus>().is_err());
}

#[test]
fn test_slot_status_serde_lowercase() {
    let json = serde_json::to_string(&SlotStatus::Available).unwrap();
    assert_eq!(json, "\"available\"");
}
