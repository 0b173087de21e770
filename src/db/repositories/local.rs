//! In-memory repository for unit testing and local development.
//!
//! Rows live in plain vectors behind a single `parking_lot` lock, so fetch
//! order is insertion order. Every successful mutation emits a
//! [`ChangeEvent`]; the broadcast channel drops events for lagging
//! subscribers, which is acceptable because subscribers refetch instead of
//! replaying.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::api::{AgentId, ClientId, MessageId, PropertyId, SessionId, SlotId};
use crate::db::repository::{
    AgentRepository, ChangeEvent, ChangeOp, ChatRepository, ErrorContext, FullRepository,
    ListingRepository, RepositoryError, RepositoryResult, SlotRepository, VisitRepository,
};
use crate::models::{
    Agent, ChatSession, Client, ListingImage, Message, NewMessage, Posting, ScheduleSlot,
    SlotCandidate, SlotStatus, Visit,
};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Session row as stored; the client is joined at read time.
#[derive(Debug, Clone)]
struct SessionRow {
    id: SessionId,
    client_id: ClientId,
    active: bool,
    last_message_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    slots: Vec<ScheduleSlot>,
    visits: Vec<Visit>,
    postings: Vec<Posting>,
    images: Vec<ListingImage>,
    agents: Vec<Agent>,
    clients: Vec<Client>,
    sessions: Vec<SessionRow>,
    messages: Vec<Message>,
}

/// In-memory implementation of [`FullRepository`].
pub struct LocalRepository {
    store: RwLock<Store>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            store: RwLock::new(Store::default()),
            changes,
        }
    }

    fn emit(&self, table: &'static str, op: ChangeOp) {
        // Send fails only when nobody is subscribed.
        let _ = self.changes.send(ChangeEvent { table, op });
    }

    /// Seed a visit row. Visits are owned by the booking flow, so this is
    /// not part of the repository traits.
    pub fn seed_visit(&self, visit: Visit) {
        self.store.write().visits.push(visit);
        self.emit("property_visit", ChangeOp::Insert);
    }

    /// Seed a client record.
    pub fn seed_client(&self, client: Client) {
        self.store.write().clients.push(client);
    }

    /// Seed a conversation session.
    pub fn seed_session(
        &self,
        id: SessionId,
        client_id: ClientId,
        active: bool,
        last_message_at: DateTime<Utc>,
    ) {
        self.store.write().sessions.push(SessionRow {
            id,
            client_id,
            active,
            last_message_at,
            created_at: last_message_at,
        });
        self.emit("conversation_sessions", ChangeOp::Insert);
    }

    fn join_session(&self, store: &Store, row: &SessionRow) -> ChatSession {
        let client = store
            .clients
            .iter()
            .find(|c| c.id == row.client_id)
            .cloned();
        ChatSession {
            id: row.id,
            client_id: row.client_id,
            client,
            active: row.active,
            last_message_at: row.last_message_at,
            created_at: row.created_at,
            messages: Vec::new(),
        }
    }
}

#[async_trait]
impl SlotRepository for LocalRepository {
    async fn insert_slot(&self, candidate: &SlotCandidate) -> RepositoryResult<ScheduleSlot> {
        let slot = ScheduleSlot {
            id: SlotId::generate(),
            property_id: candidate.property_id,
            start_timestamp: candidate.start_timestamp,
            end_timestamp: candidate.end_timestamp,
            status: SlotStatus::Available,
        };
        self.store.write().slots.push(slot.clone());
        self.emit("property_schedules", ChangeOp::Insert);
        Ok(slot)
    }

    async fn find_slot(&self, id: SlotId) -> RepositoryResult<ScheduleSlot> {
        self.store
            .read()
            .slots
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Slot not found",
                    ErrorContext::new("find_slot").with_entity("slot").with_entity_id(id),
                )
            })
    }

    async fn find_slots_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<ScheduleSlot>> {
        Ok(self
            .store
            .read()
            .slots
            .iter()
            .filter(|s| property_ids.contains(&s.property_id))
            .cloned()
            .collect())
    }

    async fn find_intersecting_slots(
        &self,
        property_id: PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ScheduleSlot>> {
        Ok(self
            .store
            .read()
            .slots
            .iter()
            .filter(|s| s.property_id == property_id && s.intersects_inclusive(start, end))
            .cloned()
            .collect())
    }

    async fn update_slot_times(
        &self,
        id: SlotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<ScheduleSlot> {
        let mut store = self.store.write();
        let slot = store.slots.iter_mut().find(|s| s.id == id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Slot not found",
                ErrorContext::new("update_slot_times")
                    .with_entity("slot")
                    .with_entity_id(id),
            )
        })?;
        slot.start_timestamp = start;
        slot.end_timestamp = end;
        let updated = slot.clone();
        drop(store);
        self.emit("property_schedules", ChangeOp::Update);
        Ok(updated)
    }

    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let before = store.slots.len();
        store.slots.retain(|s| s.id != id);
        if store.slots.len() == before {
            return Err(RepositoryError::not_found_with_context(
                "Slot not found",
                ErrorContext::new("delete_slot")
                    .with_entity("slot")
                    .with_entity_id(id),
            ));
        }
        drop(store);
        self.emit("property_schedules", ChangeOp::Delete);
        Ok(())
    }
}

#[async_trait]
impl VisitRepository for LocalRepository {
    async fn find_visits_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<Visit>> {
        let store = self.store.read();
        Ok(store
            .visits
            .iter()
            .filter(|v| property_ids.contains(&v.property_id))
            .map(|v| {
                let mut visit = v.clone();
                if visit.client_name.is_none() {
                    visit.client_name = store
                        .clients
                        .iter()
                        .find(|c| c.id == v.client_id)
                        .map(|c| c.display_name());
                }
                visit
            })
            .collect())
    }
}

#[async_trait]
impl ListingRepository for LocalRepository {
    async fn insert_posting(
        &self,
        posting: &Posting,
        images: &[ListingImage],
    ) -> RepositoryResult<Posting> {
        let mut store = self.store.write();
        store.postings.push(posting.clone());
        store.images.extend_from_slice(images);
        drop(store);
        self.emit("postings", ChangeOp::Insert);
        if !images.is_empty() {
            self.emit("listing_images", ChangeOp::Insert);
        }
        Ok(posting.clone())
    }

    async fn find_posting_by_source_id(
        &self,
        source_listing_id: &str,
    ) -> RepositoryResult<Option<Posting>> {
        Ok(self
            .store
            .read()
            .postings
            .iter()
            .find(|p| p.source_listing_id == source_listing_id)
            .cloned())
    }

    async fn list_postings_for_publisher(
        &self,
        publisher_id: AgentId,
    ) -> RepositoryResult<Vec<Posting>> {
        let mut postings: Vec<Posting> = self
            .store
            .read()
            .postings
            .iter()
            .filter(|p| p.publisher_id == publisher_id)
            .cloned()
            .collect();
        postings.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        Ok(postings)
    }

    async fn delete_posting(&self, id: PropertyId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let before = store.postings.len();
        store.postings.retain(|p| p.id != id);
        if store.postings.len() == before {
            return Err(RepositoryError::not_found_with_context(
                "Posting not found",
                ErrorContext::new("delete_posting")
                    .with_entity("posting")
                    .with_entity_id(id),
            ));
        }
        store.images.retain(|i| i.listing_id != id);
        drop(store);
        self.emit("postings", ChangeOp::Delete);
        Ok(())
    }

    async fn list_images(&self, listing_id: PropertyId) -> RepositoryResult<Vec<ListingImage>> {
        let mut images: Vec<ListingImage> = self
            .store
            .read()
            .images
            .iter()
            .filter(|i| i.listing_id == listing_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.order_index);
        Ok(images)
    }
}

#[async_trait]
impl ChatRepository for LocalRepository {
    async fn list_active_sessions(&self) -> RepositoryResult<Vec<ChatSession>> {
        let store = self.store.read();
        let mut sessions: Vec<ChatSession> = store
            .sessions
            .iter()
            .filter(|s| s.active)
            .map(|row| self.join_session(&store, row))
            .collect();
        sessions.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(sessions)
    }

    async fn find_session(&self, id: SessionId) -> RepositoryResult<ChatSession> {
        let store = self.store.read();
        store
            .sessions
            .iter()
            .find(|s| s.id == id)
            .map(|row| self.join_session(&store, row))
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Session not found",
                    ErrorContext::new("find_session")
                        .with_entity("session")
                        .with_entity_id(id),
                )
            })
    }

    async fn latest_message(&self, session_id: SessionId) -> RepositoryResult<Option<Message>> {
        Ok(self
            .store
            .read()
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn messages_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .store
            .read()
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn insert_message(&self, message: &NewMessage) -> RepositoryResult<Message> {
        let mut store = self.store.write();
        if !store.sessions.iter().any(|s| s.id == message.session_id) {
            return Err(RepositoryError::not_found_with_context(
                "Session not found",
                ErrorContext::new("insert_message")
                    .with_entity("session")
                    .with_entity_id(message.session_id),
            ));
        }

        let now = Utc::now();
        let stored = Message {
            id: MessageId::generate(),
            session_id: message.session_id,
            client_id: message.client_id,
            agent_id: message.agent_id,
            direction: message.direction,
            channel: message.channel.clone(),
            content: message.content.clone(),
            read: false,
            created_at: now,
        };
        store.messages.push(stored.clone());
        if let Some(session) = store
            .sessions
            .iter_mut()
            .find(|s| s.id == message.session_id)
        {
            session.last_message_at = now;
        }
        drop(store);
        self.emit("messages", ChangeOp::Insert);
        Ok(stored)
    }
}

#[async_trait]
impl AgentRepository for LocalRepository {
    async fn upsert_agent(&self, agent: &Agent) -> RepositoryResult<Agent> {
        let mut store = self.store.write();
        match store.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent.clone(),
            None => store.agents.push(agent.clone()),
        }
        drop(store);
        self.emit("agents", ChangeOp::Update);
        Ok(agent.clone())
    }

    async fn find_agent(&self, id: AgentId) -> RepositoryResult<Option<Agent>> {
        Ok(self.store.read().agents.iter().find(|a| a.id == id).cloned())
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
