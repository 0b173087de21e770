//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! scheduling engine or the service layer for business logic. Agent identity
//! arrives in the `x-agent-id` header; handlers pass it down as an optional
//! context so ownership-requiring operations can reject its absence.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use uuid::Uuid;

use super::dto::{
    CalendarQuery, CalendarResponse, CreateSlotRequest, HealthResponse, ImportRequest,
    MessageListResponse, PostingListResponse, PostingWithImages, SendMessageRequest,
    SessionListResponse, UpdateSlotRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{AgentContext, AgentId, PropertyId, ScheduleSlot, SessionId, SlotId};
use crate::db::repository::{FullRepository, ListingRepository};
use crate::models::Message;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying the authenticated agent id.
pub const AGENT_ID_HEADER: &str = "x-agent-id";

fn agent_context(headers: &HeaderMap) -> Option<AgentContext> {
    headers
        .get(AGENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<Uuid>().ok())
        .map(|id| AgentContext::new(AgentId::new(id)))
}

fn require_agent(headers: &HeaderMap) -> Result<AgentContext, AppError> {
    agent_context(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid x-agent-id header".to_string()))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Postings
// =============================================================================

/// GET /v1/postings
///
/// Postings published by the authenticated agent, newest first, images
/// included.
pub async fn list_postings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<PostingListResponse> {
    let ctx = require_agent(&headers)?;

    let postings = state
        .repository
        .list_postings_for_publisher(ctx.agent_id)
        .await?;

    let mut with_images = Vec::with_capacity(postings.len());
    for posting in postings {
        let images = state.repository.list_images(posting.id).await?;
        with_images.push(PostingWithImages { posting, images });
    }

    let total = with_images.len();
    Ok(Json(PostingListResponse {
        postings: with_images,
        total,
    }))
}

/// POST /v1/postings/import
///
/// Import a listing from the provider URL submitted by the agent.
pub async fn import_posting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ImportRequest>,
) -> Result<(axum::http::StatusCode, Json<PostingWithImages>), AppError> {
    let ctx = agent_context(&headers);

    let posting = state
        .importer
        .import_from_url(ctx.as_ref(), &request.url)
        .await?;
    let images = state.repository.list_images(posting.id).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(PostingWithImages { posting, images }),
    ))
}

/// DELETE /v1/postings/{id}
pub async fn delete_posting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    require_agent(&headers)?;
    state.repository.delete_posting(PropertyId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Calendar
// =============================================================================

/// GET /v1/calendar
///
/// Merged availability + visit slots for the agent's properties, colored per
/// property and shifted for display.
pub async fn get_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> HandlerResult<CalendarResponse> {
    let ctx = require_agent(&headers)?;
    let view = query.view.unwrap_or_default();

    let mut properties = state
        .repository
        .list_postings_for_publisher(ctx.agent_id)
        .await?;
    if let Some(property_id) = query.property_id {
        properties.retain(|p| p.id == property_id);
    }

    let slots = state.engine.merge_for_display(&properties, view).await?;
    let total = slots.len();
    Ok(Json(CalendarResponse { slots, total }))
}

// =============================================================================
// Availability Slots
// =============================================================================

/// POST /v1/slots
///
/// Propose and confirm an availability slot from a grid selection. Returns
/// 409 when the range intersects an existing slot.
pub async fn create_slot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(axum::http::StatusCode, Json<ScheduleSlot>), AppError> {
    let ctx = agent_context(&headers);

    let candidate = state.engine.propose_slot(
        request.property_id,
        request.date,
        request.start_hour,
        request.end_hour,
    )?;
    let slot = state.engine.confirm_slot(ctx.as_ref(), candidate).await?;

    Ok((axum::http::StatusCode::CREATED, Json(slot)))
}

/// PATCH /v1/slots/{id}
///
/// Rewrite the time range of an existing slot.
pub async fn update_slot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSlotRequest>,
) -> HandlerResult<ScheduleSlot> {
    let ctx = agent_context(&headers);

    let slot = state
        .engine
        .update_slot(
            ctx.as_ref(),
            SlotId::new(id),
            request.start_timestamp,
            request.end_timestamp,
        )
        .await?;
    Ok(Json(slot))
}

/// DELETE /v1/slots/{id}
pub async fn delete_slot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let ctx = agent_context(&headers);
    state.engine.delete_slot(ctx.as_ref(), SlotId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Chat
// =============================================================================

/// GET /v1/chat/sessions
///
/// Active conversation sessions, most recent activity first, latest message
/// included.
pub async fn list_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<SessionListResponse> {
    require_agent(&headers)?;

    let sessions = services::list_sessions_with_latest(state.repository.as_ref()).await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// GET /v1/chat/sessions/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> HandlerResult<MessageListResponse> {
    require_agent(&headers)?;

    let messages =
        services::session_messages(state.repository.as_ref(), SessionId::new(id)).await?;
    let total = messages.len();
    Ok(Json(MessageListResponse { messages, total }))
}

/// POST /v1/chat/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(axum::http::StatusCode, Json<Message>), AppError> {
    let ctx = agent_context(&headers);

    let message = services::send_message(
        state.repository.as_ref(),
        ctx.as_ref(),
        SessionId::new(id),
        &request.content,
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(message)))
}

// =============================================================================
// Change Feed
// =============================================================================

/// GET /v1/changes/stream
///
/// Stream repository change events via Server-Sent Events (SSE). Clients
/// refetch the affected list when an event for its table arrives.
pub async fn stream_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.repository.subscribe_changes();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    let data = serde_json::to_string(&change).unwrap_or_default();
                    yield Ok(Event::default().data(data));
                }
                // Dropped events are fine; subscribers refetch on the next
                // event rather than replaying history.
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    )
}
