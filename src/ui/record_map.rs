use std::collections::HashMap;

use crate::common::{Record, RecordId, TraceReport};
use crate::network::ApiError;

/// Dashboard load status.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Record>),
    Failed(String),
}

/// Trace history of one record, fetched on demand from its popup.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceState {
    Loading,
    Loaded(TraceReport),
    Failed(String),
}

/// Records shown on the map plus the popup the user has open.
pub struct RecordMap {
    load: LoadState,
    selected: Option<RecordId>,
    traces: HashMap<RecordId, TraceState>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self {
            load: LoadState::Loading,
            selected: None,
            traces: HashMap::new(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Replace the record set with the result of the dashboard fetch.
    pub fn apply_load(&mut self, outcome: Result<Vec<Record>, ApiError>) {
        self.load = match outcome {
            Ok(records) => LoadState::Loaded(records),
            Err(err) => LoadState::Failed(err.to_string()),
        };
        self.selected = None;
    }

    /// Records to draw. Empty unless the load succeeded.
    pub fn markers(&self) -> &[Record] {
        match &self.load {
            LoadState::Loaded(records) => records,
            LoadState::Loading | LoadState::Failed(_) => &[],
        }
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.markers().iter().find(|record| record.id == id)
    }

    pub fn select(&mut self, id: RecordId) {
        if self.record(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Record> {
        self.selected.and_then(|id| self.record(id))
    }

    /// Hand the full record to `open_chat` and close its popup.
    ///
    /// Unknown ids are ignored; the callback runs at most once.
    pub fn chat_about<F>(&mut self, id: RecordId, open_chat: F) -> bool
    where
        F: FnOnce(&Record),
    {
        let Some(record) = self.record(id) else {
            return false;
        };
        open_chat(record);
        self.selected = None;
        true
    }

    /// Mark a trace as pending. Returns `false` when one is already loading
    /// or loaded, so the caller does not fetch it twice.
    pub fn begin_trace(&mut self, id: RecordId) -> bool {
        match self.traces.get(&id) {
            Some(TraceState::Loading | TraceState::Loaded(_)) => false,
            Some(TraceState::Failed(_)) | None => {
                self.traces.insert(id, TraceState::Loading);
                true
            }
        }
    }

    pub fn apply_trace(&mut self, id: RecordId, outcome: Result<TraceReport, ApiError>) {
        let state = match outcome {
            Ok(report) => TraceState::Loaded(report),
            Err(err) => TraceState::Failed(err.to_string()),
        };
        self.traces.insert(id, state);
    }

    pub fn trace(&self, id: RecordId) -> Option<&TraceState> {
        self.traces.get(&id)
    }
}

impl Default for RecordMap {
    fn default() -> Self {
        Self::new()
    }
}
