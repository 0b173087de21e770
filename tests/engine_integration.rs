//! End-to-end scheduling flows over the in-memory repository.

mod support;

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use support::posting_fixture;
use visita_rust::api::{AgentContext, AgentId, ClientId, VisitId};
use visita_rust::db::repositories::LocalRepository;
use visita_rust::db::repository::SlotRepository;
use visita_rust::models::Visit;
use visita_rust::scheduler::{SchedulerError, SchedulingEngine, SlotKind, ViewMode};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

#[tokio::test]
async fn test_overlap_scenario_matrix() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let posting = posting_fixture(agent, "depto-nunez");

    // Existing availability 10:00-12:00 (drag over hours 10 and 11).
    let base = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    engine.confirm_slot(Some(&ctx), base).await.unwrap();

    // 11:00-13:00 intersects and is rejected.
    let overlapping = engine.propose_slot(posting.id, day(), 11, 12).unwrap();
    assert!(matches!(
        engine.confirm_slot(Some(&ctx), overlapping).await,
        Err(SchedulerError::Overlap { .. })
    ));

    // 12:00-14:00 shares only the boundary instant 12:00 with the existing
    // slot; the inclusive-bound policy rejects it too.
    let touching = engine.propose_slot(posting.id, day(), 12, 13).unwrap();
    assert!(matches!(
        engine.confirm_slot(Some(&ctx), touching).await,
        Err(SchedulerError::Overlap { .. })
    ));

    // 13:00-15:00 is clear.
    let clear = engine.propose_slot(posting.id, day(), 13, 14).unwrap();
    assert!(engine.confirm_slot(Some(&ctx), clear).await.is_ok());

    // Exactly the surviving rows are persisted.
    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_pairwise_no_intersection_invariant_after_many_confirms() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let posting = posting_fixture(agent, "casa-flores");

    // Try a spread of drags, some colliding, some not. Confirm failures are
    // expected; what matters is what ends up stored.
    for (a, b) in [(9, 10), (10, 12), (13, 13), (15, 17), (16, 18), (20, 21)] {
        let candidate = engine.propose_slot(posting.id, day(), a, b).unwrap();
        let _ = engine.confirm_slot(Some(&ctx), candidate).await;
    }

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert!(!stored.is_empty());
    for (i, s1) in stored.iter().enumerate() {
        for s2 in stored.iter().skip(i + 1) {
            assert!(
                !(s1.start_timestamp <= s2.end_timestamp
                    && s2.start_timestamp <= s1.end_timestamp),
                "Stored slots intersect: {:?} and {:?}",
                s1,
                s2
            );
        }
    }
}

#[tokio::test]
async fn test_calendar_merge_counts_and_styles() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let first = posting_fixture(agent, "depto-uno");
    let second = posting_fixture(agent, "depto-dos");

    for posting in [&first, &second] {
        let c = engine.propose_slot(posting.id, day(), 9, 10).unwrap();
        engine.confirm_slot(Some(&ctx), c).await.unwrap();
    }
    repo.seed_visit(Visit {
        id: VisitId::generate(),
        property_id: first.id,
        start_date: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        status: "confirmed".to_string(),
        client_id: ClientId::generate(),
        client_name: Some("Laura Vidal".to_string()),
    });

    let properties = vec![first.clone(), second.clone()];
    let merged = engine
        .merge_for_display(&properties, ViewMode::All)
        .await
        .unwrap();
    assert_eq!(merged.len(), 3);

    // Colors follow list position; the visit inherits its property's color
    // but draws above the availability window.
    let first_slots: Vec<_> = merged
        .iter()
        .filter(|s| s.property_id == first.id)
        .collect();
    assert!(first_slots.iter().all(|s| s.color == "blue"));
    let visit = first_slots.iter().find(|s| s.kind == SlotKind::Visit).unwrap();
    let window = first_slots
        .iter()
        .find(|s| s.kind == SlotKind::Availability)
        .unwrap();
    assert!(visit.z_index > window.z_index);

    let second_window = merged
        .iter()
        .find(|s| s.property_id == second.id)
        .unwrap();
    assert_eq!(second_window.color, "emerald");
}

#[tokio::test]
async fn test_display_shift_exactly_three_hours_forward() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let posting = posting_fixture(agent, "ph-almagro");

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    let merged = engine
        .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
        .await
        .unwrap();
    assert_eq!(
        merged[0].start_timestamp,
        Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap()
    );
    assert_eq!(
        merged[0].end_timestamp,
        Utc.with_ymd_and_hms(2025, 6, 2, 15, 0, 0).unwrap()
    );

    // The stored row is untouched.
    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored[0].start_timestamp, slot.start_timestamp);
}

#[tokio::test]
async fn test_delete_drops_slot_from_subsequent_merges() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let posting = posting_fixture(agent, "loft-colegiales");

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    engine.delete_slot(Some(&ctx), slot.id).await.unwrap();

    let merged = engine
        .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
        .await
        .unwrap();
    assert!(merged.is_empty());
    assert!(repo
        .find_slots_for_properties(&[posting.id])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_update_then_create_still_checks_against_moved_slot() {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    let posting = posting_fixture(agent, "casa-saavedra");

    let candidate = engine.propose_slot(posting.id, day(), 8, 9).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    // Move 08:00-10:00 to the afternoon.
    engine
        .update_slot(
            Some(&ctx),
            slot.id,
            Utc.with_ymd_and_hms(2025, 6, 2, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    // A new candidate over the vacated morning range is accepted; one over
    // the moved-to range is rejected.
    let morning = engine.propose_slot(posting.id, day(), 8, 9).unwrap();
    assert!(engine.confirm_slot(Some(&ctx), morning).await.is_ok());

    let afternoon = engine.propose_slot(posting.id, day(), 16, 16).unwrap();
    assert!(matches!(
        engine.confirm_slot(Some(&ctx), afternoon).await,
        Err(SchedulerError::Overlap { .. })
    ));
}
