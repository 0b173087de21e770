//! In-memory slot collection with refetch reconciliation.
//!
//! Slots created locally are appended with a pending tag so that a server
//! refetch that does not yet contain them cannot wipe them out. Refetches
//! merge by id: server rows win for matching ids, pending local rows are
//! retained until the server echoes them back, and rows absent from both
//! sides are dropped.

use parking_lot::RwLock;

use crate::api::{PropertyId, SlotId};
use crate::models::ScheduleSlot;

#[derive(Debug, Clone)]
struct CachedSlot {
    slot: ScheduleSlot,
    /// Locally originated, not yet observed in a server refetch.
    pending: bool,
}

/// Shared slot collection backing the scheduling engine.
#[derive(Debug, Default)]
pub struct SlotCache {
    entries: RwLock<Vec<CachedSlot>>,
}

impl SlotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly persisted slot, tagged pending until a refetch
    /// confirms it.
    pub fn append_pending(&self, slot: ScheduleSlot) {
        self.entries.write().push(CachedSlot {
            slot,
            pending: true,
        });
    }

    /// Replace a slot in place after an edit.
    pub fn update(&self, slot: ScheduleSlot) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.iter_mut().find(|e| e.slot.id == slot.id) {
            entry.slot = slot;
        }
    }

    pub fn remove(&self, id: SlotId) {
        self.entries.write().retain(|e| e.slot.id != id);
    }

    /// Merge a server refetch covering `scope` into the collection.
    ///
    /// Entries outside the scope are untouched. Within the scope, server
    /// rows are taken in fetch order; a pending local entry missing from the
    /// server set survives at the tail, and anything else missing is
    /// dropped.
    pub fn reconcile(&self, scope: &[PropertyId], server_slots: Vec<ScheduleSlot>) {
        let mut entries = self.entries.write();

        let mut merged: Vec<CachedSlot> = Vec::with_capacity(server_slots.len());
        for slot in server_slots {
            merged.push(CachedSlot {
                slot,
                pending: false,
            });
        }

        for entry in entries.iter() {
            let in_scope = scope.contains(&entry.slot.property_id);
            if !in_scope {
                merged.push(entry.clone());
            } else if entry.pending && !merged.iter().any(|m| m.slot.id == entry.slot.id) {
                merged.push(entry.clone());
            }
        }

        *entries = merged;
    }

    /// Slots for the given properties, cache order.
    pub fn slots_for(&self, property_ids: &[PropertyId]) -> Vec<ScheduleSlot> {
        self.entries
            .read()
            .iter()
            .filter(|e| property_ids.contains(&e.slot.property_id))
            .map(|e| e.slot.clone())
            .collect()
    }

    /// Whole collection, cache order.
    pub fn snapshot(&self) -> Vec<ScheduleSlot> {
        self.entries.read().iter().map(|e| e.slot.clone()).collect()
    }

    /// Whether a slot is still awaiting server confirmation.
    pub fn is_pending(&self, id: SlotId) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.slot.id == id && e.pending)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
