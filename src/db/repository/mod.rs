//! Repository trait definitions.
//!
//! One trait per record family, combined into [`FullRepository`] for
//! consumers that need the whole store. Implementations must emit a
//! [`ChangeEvent`] on every successful mutation so subscribers can refetch
//! affected collections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::api::{AgentId, PropertyId, SessionId, SlotId};
use crate::models::{
    Agent, ChatSession, ListingImage, Message, NewMessage, Posting, ScheduleSlot, SlotCandidate,
    Visit,
};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Kind of mutation behind a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// Notification that a table changed. Carries no row data; subscribers
/// refetch what they display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub op: ChangeOp,
}

/// Availability-slot storage.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Persist a candidate as a new slot with status `available` and a
    /// generated id.
    async fn insert_slot(&self, candidate: &SlotCandidate) -> RepositoryResult<ScheduleSlot>;

    async fn find_slot(&self, id: SlotId) -> RepositoryResult<ScheduleSlot>;

    /// All slots belonging to any of the given properties, in storage order.
    async fn find_slots_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<ScheduleSlot>>;

    /// Slots of one property whose interval intersects `[start, end]`, both
    /// bounds inclusive: a slot that merely touches the range at one instant
    /// is returned.
    async fn find_intersecting_slots(
        &self,
        property_id: PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ScheduleSlot>>;

    /// Rewrite the timestamps of an existing slot.
    async fn update_slot_times(
        &self,
        id: SlotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<ScheduleSlot>;

    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<()>;
}

/// Booked-visit storage. Visits are written by the booking flow, not by this
/// backend; only reads are exposed.
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// All visits on the given properties with the client display name
    /// joined in, in storage order.
    async fn find_visits_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<Visit>>;
}

/// Imported-listing storage.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a posting together with its image rows.
    async fn insert_posting(
        &self,
        posting: &Posting,
        images: &[ListingImage],
    ) -> RepositoryResult<Posting>;

    /// Look up a posting by the provider-side listing id (import dedup).
    async fn find_posting_by_source_id(
        &self,
        source_listing_id: &str,
    ) -> RepositoryResult<Option<Posting>>;

    /// Postings published by one agent, newest created_date first.
    async fn list_postings_for_publisher(
        &self,
        publisher_id: AgentId,
    ) -> RepositoryResult<Vec<Posting>>;

    async fn delete_posting(&self, id: PropertyId) -> RepositoryResult<()>;

    /// Images of one posting ordered by order_index.
    async fn list_images(&self, listing_id: PropertyId) -> RepositoryResult<Vec<ListingImage>>;
}

/// Chat session and message storage.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Active sessions with the client joined in, most recent activity
    /// first.
    async fn list_active_sessions(&self) -> RepositoryResult<Vec<ChatSession>>;

    async fn find_session(&self, id: SessionId) -> RepositoryResult<ChatSession>;

    /// Most recent message of a session, if any.
    async fn latest_message(&self, session_id: SessionId) -> RepositoryResult<Option<Message>>;

    /// All messages of a session, oldest first.
    async fn messages_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Message>>;

    /// Insert a message; id and created_at are assigned by the store, and
    /// the session's last_message_at advances.
    async fn insert_message(&self, message: &NewMessage) -> RepositoryResult<Message>;
}

/// Agent profile storage.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Insert or update an agent keyed by id.
    async fn upsert_agent(&self, agent: &Agent) -> RepositoryResult<Agent>;

    async fn find_agent(&self, id: AgentId) -> RepositoryResult<Option<Agent>>;
}

/// Umbrella trait for consumers that need the whole store.
#[async_trait]
pub trait FullRepository:
    SlotRepository + VisitRepository + ListingRepository + ChatRepository + AgentRepository
{
    /// Subscribe to the change feed. Events may be dropped under lag; a
    /// subscriber that falls behind should refetch rather than replay.
    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
