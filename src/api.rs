//! Public API surface for the Rust backend.
//!
//! This file consolidates the identifier newtypes and re-exports the DTO
//! types for the HTTP API. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::models::agent::Agent;
pub use crate::models::chat::ChatSession;
pub use crate::models::chat::Client;
pub use crate::models::chat::Direction;
pub use crate::models::chat::Message;
pub use crate::models::listing::ArgenpropNotice;
pub use crate::models::listing::ListingImage;
pub use crate::models::listing::Posting;
pub use crate::models::listing::PostingStatus;
pub use crate::models::slot::ScheduleSlot;
pub use crate::models::slot::SlotCandidate;
pub use crate::models::slot::SlotStatus;
pub use crate::models::slot::Visit;
pub use crate::scheduler::display::DisplaySlot;
pub use crate::scheduler::display::SlotKind;
pub use crate::scheduler::display::ViewMode;

use crate::define_uuid_id;

define_uuid_id!(PropertyId);
define_uuid_id!(SlotId);
define_uuid_id!(VisitId);
define_uuid_id!(ClientId);
define_uuid_id!(SessionId);
define_uuid_id!(MessageId);
define_uuid_id!(AgentId);
define_uuid_id!(ImageId);

/// Authenticated agent identity attached to a request.
///
/// Operations that create or mutate agent-owned records require this context;
/// they fail before any repository call when it is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentContext {
    pub agent_id: AgentId,
}

impl AgentContext {
    pub fn new(agent_id: AgentId) -> Self {
        Self { agent_id }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
