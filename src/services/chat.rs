//! Chat relay: conversation sessions and message exchange.
//!
//! Thin orchestration over the repository. Realtime behavior comes from the
//! store's change feed: subscribers refetch the affected list when a
//! `messages` or `conversation_sessions` event arrives.

use tracing::info;

use crate::api::{AgentContext, SessionId};
use crate::db::repository::{ChatRepository, FullRepository, RepositoryError};
use crate::models::{ChatSession, Direction, Message, NewMessage};

/// Channel recorded on messages sent from this dashboard.
pub const DASHBOARD_CHANNEL: &str = "dashboard";

/// Errors surfaced by chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("No authenticated agent for this operation")]
    AuthMissing,

    #[error("Message content must not be empty")]
    EmptyMessage,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Active sessions, most recent activity first, each carrying its latest
/// message for the inbox preview.
pub async fn list_sessions_with_latest(
    repository: &dyn FullRepository,
) -> Result<Vec<ChatSession>, RepositoryError> {
    let mut sessions = repository.list_active_sessions().await?;
    for session in &mut sessions {
        if let Some(latest) = repository.latest_message(session.id).await? {
            session.messages = vec![latest];
        }
    }
    Ok(sessions)
}

/// All messages of one session, oldest first.
pub async fn session_messages(
    repository: &dyn FullRepository,
    session_id: SessionId,
) -> Result<Vec<Message>, RepositoryError> {
    repository.messages_for_session(session_id).await
}

/// Send an outgoing dashboard message into a session.
pub async fn send_message(
    repository: &dyn FullRepository,
    ctx: Option<&AgentContext>,
    session_id: SessionId,
    content: &str,
) -> Result<Message, ChatError> {
    let ctx = ctx.ok_or(ChatError::AuthMissing)?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let session = repository.find_session(session_id).await?;
    let message = repository
        .insert_message(&NewMessage {
            session_id,
            client_id: session.client_id,
            agent_id: Some(ctx.agent_id),
            direction: Direction::Outgoing,
            channel: DASHBOARD_CHANNEL.to_string(),
            content: trimmed.to_string(),
        })
        .await?;

    info!(session_id = %session_id, message_id = %message.id, "Sent dashboard message");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AgentId, ClientId};
    use crate::db::repositories::LocalRepository;
    use crate::models::Client;
    use chrono::{Duration, Utc};

    fn seed_session(repo: &LocalRepository, minutes_ago: i64) -> (SessionId, ClientId) {
        let client_id = ClientId::generate();
        repo.seed_client(Client {
            id: client_id,
            first_name: "Ana".to_string(),
            last_name: "Suárez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+54 11 5555-0000".to_string(),
        });
        let session_id = SessionId::generate();
        repo.seed_session(
            session_id,
            client_id,
            true,
            Utc::now() - Duration::minutes(minutes_ago),
        );
        (session_id, client_id)
    }

    #[tokio::test]
    async fn test_list_sessions_orders_by_recency_and_joins_client() {
        let repo = LocalRepository::new();
        let (older, _) = seed_session(&repo, 60);
        let (newer, _) = seed_session(&repo, 5);

        let sessions = list_sessions_with_latest(&repo).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, newer);
        assert_eq!(sessions[1].id, older);
        assert!(sessions[0].client.is_some());
    }

    #[tokio::test]
    async fn test_list_sessions_carries_latest_message_only() {
        let repo = LocalRepository::new();
        let ctx = AgentContext::new(AgentId::generate());
        let (session_id, _) = seed_session(&repo, 10);

        send_message(&repo, Some(&ctx), session_id, "first").await.unwrap();
        send_message(&repo, Some(&ctx), session_id, "second").await.unwrap();

        let sessions = list_sessions_with_latest(&repo).await.unwrap();
        assert_eq!(sessions[0].messages.len(), 1);
        assert_eq!(sessions[0].messages[0].content, "second");
    }

    #[tokio::test]
    async fn test_send_message_records_agent_and_channel() {
        let repo = LocalRepository::new();
        let ctx = AgentContext::new(AgentId::generate());
        let (session_id, client_id) = seed_session(&repo, 10);

        let message = send_message(&repo, Some(&ctx), session_id, "  hola!  ")
            .await
            .unwrap();
        assert_eq!(message.content, "hola!");
        assert_eq!(message.direction, Direction::Outgoing);
        assert_eq!(message.channel, DASHBOARD_CHANNEL);
        assert_eq!(message.agent_id, Some(ctx.agent_id));
        assert_eq!(message.client_id, client_id);

        let messages = session_messages(&repo, session_id).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_requires_agent_context() {
        let repo = LocalRepository::new();
        let (session_id, _) = seed_session(&repo, 10);

        let err = send_message(&repo, None, session_id, "hola")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::AuthMissing));
        assert!(session_messages(&repo, session_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_rejects_blank_content() {
        let repo = LocalRepository::new();
        let ctx = AgentContext::new(AgentId::generate());
        let (session_id, _) = seed_session(&repo, 10);

        let err = send_message(&repo, Some(&ctx), session_id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_send_message_to_unknown_session_fails() {
        let repo = LocalRepository::new();
        let ctx = AgentContext::new(AgentId::generate());

        let err = send_message(&repo, Some(&ctx), SessionId::generate(), "hola")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Repository(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_send_message_advances_session_recency() {
        let repo = LocalRepository::new();
        let ctx = AgentContext::new(AgentId::generate());
        let (stale, _) = seed_session(&repo, 120);
        let (_fresh, _) = seed_session(&repo, 5);

        send_message(&repo, Some(&ctx), stale, "reactivated")
            .await
            .unwrap();

        let sessions = list_sessions_with_latest(&repo).await.unwrap();
        assert_eq!(sessions[0].id, stale);
    }
}
