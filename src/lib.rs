//! # Visita Rust Backend
//!
//! Backend for a real-estate agent dashboard: property listings imported from
//! an external provider, per-property visit scheduling, and a client chat
//! inbox. The scheduling core validates agent-declared availability windows
//! against existing slots and merges them with booked visits for calendar
//! display.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and the public DTO surface
//! - [`models`]: Domain records (slots, visits, postings, chat)
//! - [`db`]: Repository trait, storage backends, and the change feed
//! - [`scheduler`]: Availability-slot engine and display merge
//! - [`services`]: Listing import and chat relay orchestration
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! Storage backends are selected by feature: `local-repo` (in-memory, the
//! default) or `postgres-repo` (Diesel). All consumers receive the repository
//! by injection; there is no process-global storage handle.

pub mod api;

pub mod db;
pub mod models;

pub mod scheduler;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
