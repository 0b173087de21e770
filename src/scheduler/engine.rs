//! The scheduling engine: slot lifecycle and display reconciliation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::api::{AgentContext, PropertyId, SlotId};
use crate::db::repository::{FullRepository, RepositoryError, SlotRepository, VisitRepository};
use crate::models::{Posting, ScheduleSlot, SlotCandidate};
use crate::scheduler::cache::SlotCache;
use crate::scheduler::display::{merge_display_slots, DisplaySlot, ViewMode};

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The grid selection cannot form a valid candidate.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// The candidate intersects at least one existing slot. Carries the
    /// conflicting slots; the caller surfaces the rejection and must not
    /// retry on its own.
    #[error("This time slot overlaps with existing schedules")]
    Overlap { conflicts: Vec<ScheduleSlot> },

    /// No authenticated agent on an operation that requires ownership.
    #[error("No authenticated agent for this operation")]
    AuthMissing,

    /// The underlying store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Per-property availability scheduling over an injected repository.
///
/// The engine keeps an in-memory slot collection: successful creates append
/// to it immediately (no refetch needed to see them), and
/// [`merge_for_display`](Self::merge_for_display) reconciles it against a
/// fresh server fetch by id.
pub struct SchedulingEngine {
    repository: Arc<dyn FullRepository>,
    cache: SlotCache,
}

impl SchedulingEngine {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            cache: SlotCache::new(),
        }
    }

    /// Build a candidate from a grid selection. Pure; persists nothing.
    pub fn propose_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<SlotCandidate, SchedulerError> {
        SlotCandidate::from_hour_selection(property_id, date, start_hour, end_hour)
            .map_err(SchedulerError::InvalidSelection)
    }

    /// Check a candidate against existing slots and persist it.
    ///
    /// The conflict query is inclusive on both bounds, so a candidate that
    /// only touches an existing slot at one instant is rejected too. On
    /// success the new slot is appended to the in-memory collection; on any
    /// failure the collection is left untouched.
    pub async fn confirm_slot(
        &self,
        ctx: Option<&AgentContext>,
        candidate: SlotCandidate,
    ) -> Result<ScheduleSlot, SchedulerError> {
        let ctx = ctx.ok_or(SchedulerError::AuthMissing)?;

        let conflicts = self
            .repository
            .find_intersecting_slots(
                candidate.property_id,
                candidate.start_timestamp,
                candidate.end_timestamp,
            )
            .await?;

        if !conflicts.is_empty() {
            warn!(
                property_id = %candidate.property_id,
                conflicts = conflicts.len(),
                "Rejected overlapping slot candidate"
            );
            return Err(SchedulerError::Overlap { conflicts });
        }

        let slot = self.repository.insert_slot(&candidate).await?;
        self.cache.append_pending(slot.clone());
        info!(
            slot_id = %slot.id,
            property_id = %slot.property_id,
            agent_id = %ctx.agent_id,
            "Created availability slot"
        );
        Ok(slot)
    }

    /// Rewrite the timestamps of an existing slot.
    ///
    /// Sibling slots are not consulted here, so an edit can move a slot onto
    /// a range that a fresh create would have rejected.
    pub async fn update_slot(
        &self,
        ctx: Option<&AgentContext>,
        slot_id: SlotId,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<ScheduleSlot, SchedulerError> {
        ctx.ok_or(SchedulerError::AuthMissing)?;
        if new_end <= new_start {
            return Err(SchedulerError::InvalidSelection(
                "Slot end must come after its start".to_string(),
            ));
        }

        let updated = self
            .repository
            .update_slot_times(slot_id, new_start, new_end)
            .await?;
        self.cache.update(updated.clone());
        Ok(updated)
    }

    /// Remove a slot from the store and the in-memory collection.
    pub async fn delete_slot(
        &self,
        ctx: Option<&AgentContext>,
        slot_id: SlotId,
    ) -> Result<(), SchedulerError> {
        ctx.ok_or(SchedulerError::AuthMissing)?;
        self.repository.delete_slot(slot_id).await?;
        self.cache.remove(slot_id);
        Ok(())
    }

    /// Merge availability slots and booked visits for calendar rendering.
    ///
    /// Availability comes from a fresh fetch reconciled into the in-memory
    /// collection (so an optimistic append survives a refetch that does not
    /// yet contain it); visits are read directly. The display shift happens
    /// inside the merge, never on stored values.
    pub async fn merge_for_display(
        &self,
        properties: &[Posting],
        view: ViewMode,
    ) -> Result<Vec<DisplaySlot>, SchedulerError> {
        let property_ids: Vec<PropertyId> = properties.iter().map(|p| p.id).collect();

        let slots = if view.includes_availability() {
            let fetched = self
                .repository
                .find_slots_for_properties(&property_ids)
                .await?;
            self.cache.reconcile(&property_ids, fetched);
            self.cache.slots_for(&property_ids)
        } else {
            Vec::new()
        };

        let visits = if view.includes_visits() {
            self.repository
                .find_visits_for_properties(&property_ids)
                .await?
        } else {
            Vec::new()
        };

        Ok(merge_display_slots(properties, &slots, &visits, view))
    }

    /// Current in-memory slot collection.
    pub fn cached_slots(&self) -> Vec<ScheduleSlot> {
        self.cache.snapshot()
    }

    /// Whether a slot is still awaiting confirmation by a server refetch.
    pub fn slot_is_pending(&self, slot_id: SlotId) -> bool {
        self.cache.is_pending(slot_id)
    }
}
