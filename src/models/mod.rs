pub mod agent;
pub mod chat;
pub mod listing;
pub mod macros;
pub mod slot;

pub use agent::*;
pub use chat::*;
pub use listing::*;
pub use slot::*;
