use crate::network::{ApiError, ApiReply};

use super::commands::SessionToken;
use super::types::{Record, RecordId, TraceReport};

/// Results the backend worker posts back to the UI.
#[derive(Debug)]
pub enum BackendEvent {
    ChatReply {
        token: SessionToken,
        outcome: Result<ApiReply, ApiError>,
    },
    RecordsLoaded(Result<Vec<Record>, ApiError>),
    TraceLoaded {
        id: RecordId,
        outcome: Result<TraceReport, ApiError>,
    },
}
