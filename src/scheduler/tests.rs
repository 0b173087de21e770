use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::api::{AgentContext, AgentId, ClientId, PropertyId, VisitId};
use crate::db::repositories::LocalRepository;
use crate::db::repository::SlotRepository;
use crate::models::{Posting, PostingStatus, SlotStatus, Visit};
use crate::scheduler::{SchedulerError, SchedulingEngine, SlotKind, ViewMode};

fn posting_for(agent: AgentId, title: &str) -> Posting {
    Posting {
        id: PropertyId::generate(),
        source_listing_id: title.to_string(),
        title: title.to_string(),
        operation_type: "Venta".to_string(),
        amount: 120_000,
        amount_currency: "USD".to_string(),
        expensas: None,
        expensas_currency: None,
        description: None,
        address: None,
        latitude: None,
        longitude: None,
        status: PostingStatus::Active,
        realestate_type_name: None,
        url: format!("https://www.argenprop.com/{}", title),
        whatsapp: None,
        created_date: None,
        modified_date: None,
        covered_area: None,
        total_area: None,
        uncovered_area: None,
        rooms: None,
        bedrooms: None,
        bathrooms: None,
        garages: None,
        floor: None,
        unit: None,
        neighborhood: None,
        city: None,
        state: None,
        country: None,
        has_video: false,
        has_tour: false,
        has_plans: false,
        reserved: false,
        source: "argenprop".to_string(),
        publisher_id: agent,
    }
}

fn setup() -> (Arc<LocalRepository>, SchedulingEngine, AgentContext, Posting) {
    let repo = Arc::new(LocalRepository::new());
    let engine = SchedulingEngine::new(repo.clone());
    let agent = AgentId::generate();
    let posting = posting_for(agent, "depto-palermo");
    (repo, engine, AgentContext::new(agent), posting)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

#[tokio::test]
async fn test_confirm_persists_and_appends_to_cache() {
    let (repo, engine, ctx, posting) = setup();

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    assert_eq!(slot.status, SlotStatus::Available);
    // Visible in the in-memory collection without any refetch.
    assert_eq!(engine.cached_slots().len(), 1);
    assert!(engine.slot_is_pending(slot.id));

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, slot.id);
}

#[tokio::test]
async fn test_confirm_rejects_contained_overlap() {
    let (repo, engine, ctx, posting) = setup();

    // Existing 10:00-12:00.
    let first = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    engine.confirm_slot(Some(&ctx), first).await.unwrap();

    // 11:00-13:00 intersects it.
    let second = engine.propose_slot(posting.id, day(), 11, 12).unwrap();
    let err = engine.confirm_slot(Some(&ctx), second).await.unwrap_err();

    match err {
        SchedulerError::Overlap { conflicts } => assert_eq!(conflicts.len(), 1),
        other => panic!("Expected Overlap, got {:?}", other),
    }

    // No second row was written.
    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(engine.cached_slots().len(), 1);
}

#[tokio::test]
async fn test_confirm_rejects_boundary_touching_candidate() {
    let (repo, engine, ctx, posting) = setup();

    // Existing 10:00-12:00.
    let first = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    engine.confirm_slot(Some(&ctx), first).await.unwrap();

    // 12:00-14:00 only touches the boundary instant, but the conflict test
    // is inclusive on both ends, so it is rejected as well.
    let adjacent = engine.propose_slot(posting.id, day(), 12, 13).unwrap();
    let err = engine.confirm_slot(Some(&ctx), adjacent).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Overlap { .. }));

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_confirm_allows_disjoint_slot() {
    let (_, engine, ctx, posting) = setup();

    let first = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    engine.confirm_slot(Some(&ctx), first).await.unwrap();

    // 13:00-15:00 is clear of 10:00-12:00.
    let later = engine.propose_slot(posting.id, day(), 13, 14).unwrap();
    assert!(engine.confirm_slot(Some(&ctx), later).await.is_ok());
    assert_eq!(engine.cached_slots().len(), 2);
}

#[tokio::test]
async fn test_confirm_same_range_other_property_is_allowed() {
    let (_, engine, ctx, posting) = setup();
    let other = posting_for(ctx.agent_id, "casa-caballito");

    let a = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    engine.confirm_slot(Some(&ctx), a).await.unwrap();

    let b = engine.propose_slot(other.id, day(), 10, 11).unwrap();
    assert!(engine.confirm_slot(Some(&ctx), b).await.is_ok());
}

#[tokio::test]
async fn test_confirm_without_agent_context_fails_before_write() {
    let (repo, engine, _, posting) = setup();

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let err = engine.confirm_slot(None, candidate).await.unwrap_err();
    assert!(matches!(err, SchedulerError::AuthMissing));

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert!(stored.is_empty());
    assert!(engine.cached_slots().is_empty());
}

#[tokio::test]
async fn test_propose_rejects_out_of_range_hours() {
    let (_, engine, _, posting) = setup();
    let err = engine.propose_slot(posting.id, day(), 7, 24).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSelection(_)));
}

#[tokio::test]
async fn test_update_rewrites_times_without_sibling_check() {
    let (repo, engine, ctx, posting) = setup();

    let first = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let kept = engine.confirm_slot(Some(&ctx), first).await.unwrap();
    let second = engine.propose_slot(posting.id, day(), 14, 15).unwrap();
    let moved = engine.confirm_slot(Some(&ctx), second).await.unwrap();

    // Move the second slot onto the first; no revalidation runs, so this
    // succeeds and leaves two overlapping rows behind.
    let updated = engine
        .update_slot(
            Some(&ctx),
            moved.id,
            kept.start_timestamp,
            kept.end_timestamp,
        )
        .await
        .unwrap();
    assert_eq!(updated.start_timestamp, kept.start_timestamp);

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].start_timestamp, stored[1].start_timestamp);
}

#[tokio::test]
async fn test_update_rejects_inverted_range() {
    let (_, engine, ctx, posting) = setup();
    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    let err = engine
        .update_slot(
            Some(&ctx),
            slot.id,
            slot.end_timestamp,
            slot.start_timestamp,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSelection(_)));
}

#[tokio::test]
async fn test_delete_removes_from_store_and_merge() {
    let (_, engine, ctx, posting) = setup();

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    let before = engine
        .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    engine.delete_slot(Some(&ctx), slot.id).await.unwrap();

    let after = engine
        .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
        .await
        .unwrap();
    assert!(after.is_empty());
    assert!(engine.cached_slots().is_empty());
}

#[tokio::test]
async fn test_delete_missing_slot_reports_repository_error() {
    let (_, engine, ctx, _) = setup();
    let err = engine
        .delete_slot(Some(&ctx), crate::api::SlotId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::Repository(e) if e.is_not_found()));
}

#[tokio::test]
async fn test_merge_counts_by_view_mode() {
    let (repo, engine, ctx, posting) = setup();

    for hours in [(9, 10), (13, 14)] {
        let c = engine
            .propose_slot(posting.id, day(), hours.0, hours.1)
            .unwrap();
        engine.confirm_slot(Some(&ctx), c).await.unwrap();
    }
    repo.seed_visit(Visit {
        id: VisitId::generate(),
        property_id: posting.id,
        start_date: Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap(),
        status: "confirmed".to_string(),
        client_id: ClientId::generate(),
        client_name: Some("Marta Paz".to_string()),
    });

    let properties = [posting];
    let all = engine
        .merge_for_display(&properties, ViewMode::All)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let available = engine
        .merge_for_display(&properties, ViewMode::Available)
        .await
        .unwrap();
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|s| s.kind == SlotKind::Availability));

    let visits = engine
        .merge_for_display(&properties, ViewMode::Visits)
        .await
        .unwrap();
    assert_eq!(visits.len(), 1);
    assert!(visits.iter().all(|s| s.kind == SlotKind::Visit));
}

#[tokio::test]
async fn test_merge_reconciles_optimistic_append_with_refetch() {
    let (_, engine, ctx, posting) = setup();

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();
    assert!(engine.slot_is_pending(slot.id));

    // The store already contains the row, so the refetch inside the merge
    // confirms the optimistic entry instead of duplicating it.
    let merged = engine
        .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
        .await
        .unwrap();
    assert_eq!(merged.len(), 1);
    assert!(!engine.slot_is_pending(slot.id));
}

#[tokio::test]
async fn test_merge_never_mutates_stored_timestamps() {
    let (repo, engine, ctx, posting) = setup();

    let candidate = engine.propose_slot(posting.id, day(), 10, 11).unwrap();
    let slot = engine.confirm_slot(Some(&ctx), candidate).await.unwrap();

    for _ in 0..3 {
        engine
            .merge_for_display(std::slice::from_ref(&posting), ViewMode::All)
            .await
            .unwrap();
    }

    let stored = repo.find_slots_for_properties(&[posting.id]).await.unwrap();
    assert_eq!(stored[0].start_timestamp, slot.start_timestamp);
    assert_eq!(stored[0].end_timestamp, slot.end_timestamp);
}
