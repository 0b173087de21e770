//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Domain records already derive Serialize/Deserialize and are re-exported
//! from the api module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Re-export existing DTOs that are already serializable
pub use crate::api::{
    // Chat
    ChatSession, Client, Direction, Message,
    // Calendar
    DisplaySlot, ScheduleSlot, SlotKind, ViewMode, Visit,
    // Listings
    ListingImage, Posting, PostingStatus,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage backend status
    pub database: String,
}

/// Request body for importing a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Provider listing URL ending in `--{digits}`
    pub url: String,
}

/// Posting with its image rows attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingWithImages {
    #[serde(flatten)]
    pub posting: Posting,
    pub images: Vec<ListingImage>,
}

/// Posting list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingListResponse {
    pub postings: Vec<PostingWithImages>,
    pub total: usize,
}

/// Request body for creating an availability slot from a grid selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    pub property_id: crate::api::PropertyId,
    /// Day the selection was made on
    pub date: NaiveDate,
    /// First hour of the drag, 0-23
    pub start_hour: u32,
    /// Last hour of the drag, 0-23 (inclusive; the slot ends one hour after)
    pub end_hour: u32,
}

/// Request body for rewriting a slot's time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotRequest {
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
}

/// Query parameters for the calendar endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarQuery {
    /// Which slot sources to include (default: all)
    #[serde(default)]
    pub view: Option<ViewMode>,
    /// Restrict to a single property
    #[serde(default)]
    pub property_id: Option<crate::api::PropertyId>,
}

/// Calendar response: one merged render sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub slots: Vec<DisplaySlot>,
    pub total: usize,
}

/// Chat session list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<ChatSession>,
    pub total: usize,
}

/// Message list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

/// Request body for sending a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}
