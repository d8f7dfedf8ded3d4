pub mod commands;
pub mod events;
pub mod types;

pub use commands::{BackendCommand, ChatEndpoint, ChatRequest, SessionToken};
pub use events::BackendEvent;
pub use types::{ChatMessage, Identity, Record, RecordId, Sender, TraceReport, UserRole};
