use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    agents, clients, conversation_sessions, listing_images, messages, postings,
    property_schedules, property_visit,
};
use crate::api::{AgentId, ClientId, ImageId, MessageId, PropertyId, SessionId, SlotId, VisitId};
use crate::db::repository::RepositoryError;
use crate::models::{
    Agent, Client, Direction, ListingImage, Message, Posting, PostingStatus, ScheduleSlot,
    SlotStatus, Visit,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = property_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SlotRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub status: String,
}

impl TryFrom<SlotRow> for ScheduleSlot {
    type Error = RepositoryError;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        let status: SlotStatus = row
            .status
            .parse()
            .map_err(RepositoryError::validation)?;
        Ok(ScheduleSlot {
            id: SlotId::new(row.id),
            property_id: PropertyId::new(row.property_id),
            start_timestamp: row.start_timestamp,
            end_timestamp: row.end_timestamp,
            status,
        })
    }
}

impl From<&ScheduleSlot> for SlotRow {
    fn from(slot: &ScheduleSlot) -> Self {
        SlotRow {
            id: slot.id.value(),
            property_id: slot.property_id.value(),
            start_timestamp: slot.start_timestamp,
            end_timestamp: slot.end_timestamp,
            status: slot.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = property_visit)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VisitRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub client_id: Uuid,
}

impl VisitRow {
    pub fn into_visit(self, client_name: Option<String>) -> Visit {
        Visit {
            id: VisitId::new(self.id),
            property_id: PropertyId::new(self.property_id),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            client_id: ClientId::new(self.client_id),
            client_name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClientRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversation_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub direction: String,
    pub channel: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let direction = match row.direction.as_str() {
            "incoming" => Direction::Incoming,
            "outgoing" => Direction::Outgoing,
            other => {
                return Err(RepositoryError::validation(format!(
                    "Unknown message direction: {}",
                    other
                )))
            }
        };
        Ok(Message {
            id: MessageId::new(row.id),
            session_id: SessionId::new(row.session_id),
            client_id: ClientId::new(row.client_id),
            agent_id: row.agent_id.map(AgentId::new),
            direction,
            channel: row.channel,
            content: row.content,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: Option<String>,
    pub active: bool,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent {
            id: AgentId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            specialization: row.specialization,
            active: row.active,
        }
    }
}

impl From<&Agent> for AgentRow {
    fn from(agent: &Agent) -> Self {
        AgentRow {
            id: agent.id.value(),
            first_name: agent.first_name.clone(),
            last_name: agent.last_name.clone(),
            email: agent.email.clone(),
            phone: agent.phone.clone(),
            specialization: agent.specialization.clone(),
            active: agent.active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = postings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostingRow {
    pub id: Uuid,
    pub source_listing_id: String,
    pub title: String,
    pub operation_type: String,
    pub amount: i64,
    pub amount_currency: String,
    pub expensas: Option<i64>,
    pub expensas_currency: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub realestate_type_name: Option<String>,
    pub url: String,
    pub whatsapp: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
    pub covered_area: Option<f64>,
    pub total_area: Option<f64>,
    pub uncovered_area: Option<f64>,
    pub rooms: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub garages: Option<i32>,
    pub floor: Option<String>,
    pub unit: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub has_video: bool,
    pub has_tour: bool,
    pub has_plans: bool,
    pub reserved: bool,
    pub source: String,
    pub publisher_id: Uuid,
}

impl TryFrom<PostingRow> for Posting {
    type Error = RepositoryError;

    fn try_from(row: PostingRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "ACTIVE" => PostingStatus::Active,
            "INACTIVE" => PostingStatus::Inactive,
            other => {
                return Err(RepositoryError::validation(format!(
                    "Unknown posting status: {}",
                    other
                )))
            }
        };
        Ok(Posting {
            id: PropertyId::new(row.id),
            source_listing_id: row.source_listing_id,
            title: row.title,
            operation_type: row.operation_type,
            amount: row.amount,
            amount_currency: row.amount_currency,
            expensas: row.expensas,
            expensas_currency: row.expensas_currency,
            description: row.description,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            status,
            realestate_type_name: row.realestate_type_name,
            url: row.url,
            whatsapp: row.whatsapp,
            created_date: row.created_date,
            modified_date: row.modified_date,
            covered_area: row.covered_area,
            total_area: row.total_area,
            uncovered_area: row.uncovered_area,
            rooms: row.rooms,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            garages: row.garages,
            floor: row.floor,
            unit: row.unit,
            neighborhood: row.neighborhood,
            city: row.city,
            state: row.state,
            country: row.country,
            has_video: row.has_video,
            has_tour: row.has_tour,
            has_plans: row.has_plans,
            reserved: row.reserved,
            source: row.source,
            publisher_id: AgentId::new(row.publisher_id),
        })
    }
}

impl From<&Posting> for PostingRow {
    fn from(posting: &Posting) -> Self {
        PostingRow {
            id: posting.id.value(),
            source_listing_id: posting.source_listing_id.clone(),
            title: posting.title.clone(),
            operation_type: posting.operation_type.clone(),
            amount: posting.amount,
            amount_currency: posting.amount_currency.clone(),
            expensas: posting.expensas,
            expensas_currency: posting.expensas_currency.clone(),
            description: posting.description.clone(),
            address: posting.address.clone(),
            latitude: posting.latitude,
            longitude: posting.longitude,
            status: posting.status.as_str().to_string(),
            realestate_type_name: posting.realestate_type_name.clone(),
            url: posting.url.clone(),
            whatsapp: posting.whatsapp.clone(),
            created_date: posting.created_date,
            modified_date: posting.modified_date,
            covered_area: posting.covered_area,
            total_area: posting.total_area,
            uncovered_area: posting.uncovered_area,
            rooms: posting.rooms,
            bedrooms: posting.bedrooms,
            bathrooms: posting.bathrooms,
            garages: posting.garages,
            floor: posting.floor.clone(),
            unit: posting.unit.clone(),
            neighborhood: posting.neighborhood.clone(),
            city: posting.city.clone(),
            state: posting.state.clone(),
            country: posting.country.clone(),
            has_video: posting.has_video,
            has_tour: posting.has_tour,
            has_plans: posting.has_plans,
            reserved: posting.reserved,
            source: posting.source.clone(),
            publisher_id: posting.publisher_id.value(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = listing_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImageRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub url: String,
    pub order_index: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub title: Option<String>,
}

impl From<ImageRow> for ListingImage {
    fn from(row: ImageRow) -> Self {
        ListingImage {
            id: ImageId::new(row.id),
            listing_id: PropertyId::new(row.listing_id),
            url: row.url,
            order_index: row.order_index,
            width: row.width,
            height: row.height,
            title: row.title,
        }
    }
}

impl From<&ListingImage> for ImageRow {
    fn from(image: &ListingImage) -> Self {
        ImageRow {
            id: image.id.value(),
            listing_id: image.listing_id.value(),
            url: image.url.clone(),
            order_index: image.order_index,
            width: image.width,
            height: image.height,
            title: image.title.clone(),
        }
    }
}
