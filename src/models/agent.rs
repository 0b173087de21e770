//! Agent profile record.

use serde::{Deserialize, Serialize};

use crate::api::AgentId;

/// Real-estate agent using the dashboard. Mirrors the identity owned by the
/// external auth provider; upserted on first use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub active: bool,
}
