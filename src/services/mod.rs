//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository: the listing
//! import pipeline and the chat relay. The scheduling core lives in
//! [`crate::scheduler`].

pub mod chat;
pub mod listing_import;

pub use chat::{list_sessions_with_latest, send_message, session_messages, ChatError};
pub use listing_import::{extract_notice_id, ImportError, ImportService};
