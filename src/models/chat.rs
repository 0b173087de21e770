//! Chat inbox records: conversation sessions and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AgentId, ClientId, MessageId, SessionId};

/// Client a conversation belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Client {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Message direction relative to the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Single message within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub direction: Direction,
    /// Originating channel, e.g. `whatsapp` or `dashboard`.
    pub channel: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new message; id and timestamp are assigned by the
/// repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub client_id: ClientId,
    pub agent_id: Option<AgentId>,
    pub direction: Direction,
    pub channel: String,
    pub content: String,
}

/// Conversation session with a client.
///
/// `client` is joined in by the repository; `messages` carries only the
/// latest message when listing sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    pub client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    pub active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_display_name() {
        let client = Client {
            id: ClientId::generate(),
            first_name: "Ana".to_string(),
            last_name: "Suárez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+54 11 5555-0000".to_string(),
        };
        assert_eq!(client.display_name(), "Ana Suárez");
    }

    #[test]
    fn test_direction_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Direction::Outgoing).unwrap(),
            "\"outgoing\""
        );
        let parsed: Direction = serde_json::from_str("\"incoming\"").unwrap();
        assert_eq!(parsed, Direction::Incoming);
    }
}
