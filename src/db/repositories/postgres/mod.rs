//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database.
//! Diesel is synchronous, so every operation runs on the blocking pool via
//! `tokio::task::spawn_blocking` with a connection checked out of an r2d2
//! pool. Pending migrations are applied at connect time.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task;
use uuid::Uuid;

use crate::api::{AgentId, PropertyId, SessionId, SlotId};
use crate::db::repository::{
    AgentRepository, ChangeEvent, ChangeOp, ChatRepository, ErrorContext, FullRepository,
    ListingRepository, RepositoryError, RepositoryResult, SlotRepository, VisitRepository,
};
use crate::models::{
    Agent, ChatSession, Client, ListingImage, Message, NewMessage, Posting, ScheduleSlot,
    SlotCandidate, SlotStatus, Visit,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
pub struct PostgresRepository {
    pool: PgPool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl PostgresRepository {
    /// Build the connection pool and apply pending migrations.
    pub async fn connect(config: &PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)
            .map_err(RepositoryError::from)?;

        let migration_pool = pool.clone();
        task::spawn_blocking(move || -> RepositoryResult<()> {
            let mut conn = migration_pool.get()?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| RepositoryError::configuration(format!("Migration failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { pool, changes })
    }

    fn emit(&self, table: &'static str, op: ChangeOp) {
        let _ = self.changes.send(ChangeEvent { table, op });
    }

    /// Run a closure with a pooled connection on the blocking pool.
    async fn interact<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl SlotRepository for PostgresRepository {
    async fn insert_slot(&self, candidate: &SlotCandidate) -> RepositoryResult<ScheduleSlot> {
        let slot = ScheduleSlot {
            id: SlotId::generate(),
            property_id: candidate.property_id,
            start_timestamp: candidate.start_timestamp,
            end_timestamp: candidate.end_timestamp,
            status: SlotStatus::Available,
        };
        let row = SlotRow::from(&slot);
        self.interact(move |conn| {
            diesel::insert_into(property_schedules::table)
                .values(&row)
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(())
        })
        .await?;
        self.emit("property_schedules", ChangeOp::Insert);
        Ok(slot)
    }

    async fn find_slot(&self, id: SlotId) -> RepositoryResult<ScheduleSlot> {
        let raw: Uuid = id.value();
        let row = self
            .interact(move |conn| {
                property_schedules::table
                    .find(raw)
                    .first::<SlotRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await
            .map_err(|e| e.with_operation("find_slot"))?;
        row.try_into()
    }

    async fn find_slots_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<ScheduleSlot>> {
        let raw: Vec<Uuid> = property_ids.iter().map(|p| p.value()).collect();
        let rows = self
            .interact(move |conn| {
                property_schedules::table
                    .filter(property_schedules::property_id.eq_any(raw))
                    .order(property_schedules::start_timestamp.asc())
                    .load::<SlotRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_intersecting_slots(
        &self,
        property_id: PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ScheduleSlot>> {
        let raw = property_id.value();
        let rows = self
            .interact(move |conn| {
                // Inclusive on both bounds: slots touching the range at a
                // single instant are conflicts.
                property_schedules::table
                    .filter(property_schedules::property_id.eq(raw))
                    .filter(property_schedules::start_timestamp.le(end))
                    .filter(property_schedules::end_timestamp.ge(start))
                    .load::<SlotRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_slot_times(
        &self,
        id: SlotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<ScheduleSlot> {
        let raw = id.value();
        let row = self
            .interact(move |conn| {
                diesel::update(property_schedules::table.find(raw))
                    .set((
                        property_schedules::start_timestamp.eq(start),
                        property_schedules::end_timestamp.eq(end),
                    ))
                    .get_result::<SlotRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await
            .map_err(|e| e.with_operation("update_slot_times"))?;
        self.emit("property_schedules", ChangeOp::Update);
        row.try_into()
    }

    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<()> {
        let raw = id.value();
        let deleted = self
            .interact(move |conn| {
                diesel::delete(property_schedules::table.find(raw))
                    .execute(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        if deleted == 0 {
            return Err(RepositoryError::not_found_with_context(
                "Slot not found",
                ErrorContext::new("delete_slot")
                    .with_entity("slot")
                    .with_entity_id(id),
            ));
        }
        self.emit("property_schedules", ChangeOp::Delete);
        Ok(())
    }
}

#[async_trait]
impl VisitRepository for PostgresRepository {
    async fn find_visits_for_properties(
        &self,
        property_ids: &[PropertyId],
    ) -> RepositoryResult<Vec<Visit>> {
        let raw: Vec<Uuid> = property_ids.iter().map(|p| p.value()).collect();
        let rows = self
            .interact(move |conn| {
                property_visit::table
                    .left_join(clients::table)
                    .filter(property_visit::property_id.eq_any(raw))
                    .order(property_visit::start_date.asc())
                    .load::<(VisitRow, Option<ClientRow>)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows
            .into_iter()
            .map(|(visit, client)| {
                let name = client.map(|c| Client::from(c).display_name());
                visit.into_visit(name)
            })
            .collect())
    }
}

#[async_trait]
impl ListingRepository for PostgresRepository {
    async fn insert_posting(
        &self,
        posting: &Posting,
        images: &[ListingImage],
    ) -> RepositoryResult<Posting> {
        let posting_row = PostingRow::from(posting);
        let image_rows: Vec<ImageRow> = images.iter().map(ImageRow::from).collect();
        let had_images = !image_rows.is_empty();
        self.interact(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                diesel::insert_into(postings::table)
                    .values(&posting_row)
                    .execute(conn)?;
                if !image_rows.is_empty() {
                    diesel::insert_into(listing_images::table)
                        .values(&image_rows)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await?;
        self.emit("postings", ChangeOp::Insert);
        if had_images {
            self.emit("listing_images", ChangeOp::Insert);
        }
        Ok(posting.clone())
    }

    async fn find_posting_by_source_id(
        &self,
        source_listing_id: &str,
    ) -> RepositoryResult<Option<Posting>> {
        let key = source_listing_id.to_string();
        let row = self
            .interact(move |conn| {
                postings::table
                    .filter(postings::source_listing_id.eq(key))
                    .first::<PostingRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_postings_for_publisher(
        &self,
        publisher_id: AgentId,
    ) -> RepositoryResult<Vec<Posting>> {
        let raw = publisher_id.value();
        let rows = self
            .interact(move |conn| {
                postings::table
                    .filter(postings::publisher_id.eq(raw))
                    .order(postings::created_date.desc())
                    .load::<PostingRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_posting(&self, id: PropertyId) -> RepositoryResult<()> {
        let raw = id.value();
        let deleted = self
            .interact(move |conn| {
                conn.transaction::<_, RepositoryError, _>(|conn| {
                    diesel::delete(
                        listing_images::table.filter(listing_images::listing_id.eq(raw)),
                    )
                    .execute(conn)?;
                    diesel::delete(postings::table.find(raw))
                        .execute(conn)
                        .map_err(RepositoryError::from)
                })
            })
            .await?;
        if deleted == 0 {
            return Err(RepositoryError::not_found_with_context(
                "Posting not found",
                ErrorContext::new("delete_posting")
                    .with_entity("posting")
                    .with_entity_id(id),
            ));
        }
        self.emit("postings", ChangeOp::Delete);
        Ok(())
    }

    async fn list_images(&self, listing_id: PropertyId) -> RepositoryResult<Vec<ListingImage>> {
        let raw = listing_id.value();
        let rows = self
            .interact(move |conn| {
                listing_images::table
                    .filter(listing_images::listing_id.eq(raw))
                    .order(listing_images::order_index.asc())
                    .load::<ImageRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ChatRepository for PostgresRepository {
    async fn list_active_sessions(&self) -> RepositoryResult<Vec<ChatSession>> {
        let rows = self
            .interact(move |conn| {
                conversation_sessions::table
                    .left_join(clients::table)
                    .filter(conversation_sessions::active.eq(true))
                    .order(conversation_sessions::last_message_at.desc())
                    .load::<(SessionRow, Option<ClientRow>)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows
            .into_iter()
            .map(|(session, client)| ChatSession {
                id: SessionId::new(session.id),
                client_id: crate::api::ClientId::new(session.client_id),
                client: client.map(Into::into),
                active: session.active,
                last_message_at: session.last_message_at,
                created_at: session.created_at,
                messages: Vec::new(),
            })
            .collect())
    }

    async fn find_session(&self, id: SessionId) -> RepositoryResult<ChatSession> {
        let raw = id.value();
        let (session, client) = self
            .interact(move |conn| {
                conversation_sessions::table
                    .left_join(clients::table)
                    .filter(conversation_sessions::id.eq(raw))
                    .first::<(SessionRow, Option<ClientRow>)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await
            .map_err(|e| e.with_operation("find_session"))?;
        Ok(ChatSession {
            id: SessionId::new(session.id),
            client_id: crate::api::ClientId::new(session.client_id),
            client: client.map(Into::into),
            active: session.active,
            last_message_at: session.last_message_at,
            created_at: session.created_at,
            messages: Vec::new(),
        })
    }

    async fn latest_message(&self, session_id: SessionId) -> RepositoryResult<Option<Message>> {
        let raw = session_id.value();
        let row = self
            .interact(move |conn| {
                messages::table
                    .filter(messages::session_id.eq(raw))
                    .order(messages::created_at.desc())
                    .first::<MessageRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn messages_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Message>> {
        let raw = session_id.value();
        let rows = self
            .interact(move |conn| {
                messages::table
                    .filter(messages::session_id.eq(raw))
                    .order(messages::created_at.asc())
                    .load::<MessageRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_message(&self, message: &NewMessage) -> RepositoryResult<Message> {
        let now = Utc::now();
        let row = MessageRow {
            id: Uuid::new_v4(),
            session_id: message.session_id.value(),
            client_id: message.client_id.value(),
            agent_id: message.agent_id.map(|a| a.value()),
            direction: match message.direction {
                crate::models::Direction::Incoming => "incoming".to_string(),
                crate::models::Direction::Outgoing => "outgoing".to_string(),
            },
            channel: message.channel.clone(),
            content: message.content.clone(),
            read: false,
            created_at: now,
        };
        let session_raw = message.session_id.value();
        let inserted = row.clone();
        self.interact(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                diesel::insert_into(messages::table)
                    .values(&inserted)
                    .execute(conn)?;
                diesel::update(conversation_sessions::table.find(session_raw))
                    .set(conversation_sessions::last_message_at.eq(now))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await?;
        self.emit("messages", ChangeOp::Insert);
        row.try_into()
    }
}

#[async_trait]
impl AgentRepository for PostgresRepository {
    async fn upsert_agent(&self, agent: &Agent) -> RepositoryResult<Agent> {
        let row = AgentRow::from(agent);
        self.interact(move |conn| {
            diesel::insert_into(agents::table)
                .values(&row)
                .on_conflict(agents::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(())
        })
        .await?;
        self.emit("agents", ChangeOp::Update);
        Ok(agent.clone())
    }

    async fn find_agent(&self, id: AgentId) -> RepositoryResult<Option<Agent>> {
        let raw = id.value();
        let row = self
            .interact(move |conn| {
                agents::table
                    .find(raw)
                    .first::<AgentRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.interact(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(true)
        })
        .await
    }
}
