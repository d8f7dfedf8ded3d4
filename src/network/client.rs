use std::sync::Arc;

use tokio::sync::mpsc;

use crate::common::{BackendCommand, BackendEvent};

use super::api::AyurApi;

/// Background worker that owns the HTTP side of the app.
///
/// Every command is served by its own task, so a slow chat reply never holds
/// up the dashboard load. Each command produces exactly one event.
pub struct BackendClient {
    api: Arc<dyn AyurApi>,
    event_sender: mpsc::Sender<BackendEvent>,
    command_receiver: mpsc::Receiver<BackendCommand>,
}

impl BackendClient {
    pub fn new(
        api: Arc<dyn AyurApi>,
        event_sender: mpsc::Sender<BackendEvent>,
        command_receiver: mpsc::Receiver<BackendCommand>,
    ) -> Self {
        Self {
            api,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        log::info!("Backend worker started");
        while let Some(command) = self.command_receiver.recv().await {
            self.dispatch(command);
        }
        log::info!("Command channel closed; backend worker stopping");
    }

    fn dispatch(&self, command: BackendCommand) {
        let api = Arc::clone(&self.api);
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            let event = handle_command(api.as_ref(), command).await;
            if let Err(err) = event_sender.send(event).await {
                log::warn!("Failed to notify UI: {err}");
            }
        });
    }
}

async fn handle_command(api: &dyn AyurApi, command: BackendCommand) -> BackendEvent {
    match command {
        BackendCommand::SendQuery(request) => {
            let outcome = api.send_query(&request).await;
            if let Err(err) = &outcome {
                log::warn!("Chat request to {} failed: {err}", request.endpoint.path());
            }
            BackendEvent::ChatReply {
                token: request.token,
                outcome,
            }
        }
        BackendCommand::LoadRecords => {
            let outcome = api.fetch_records().await;
            match &outcome {
                Ok(records) => log::info!("Loaded {} herb records", records.len()),
                Err(err) => log::error!("Error fetching herb records: {err}"),
            }
            BackendEvent::RecordsLoaded(outcome)
        }
        BackendCommand::TraceRecord(id) => {
            let outcome = api.trace_record(id).await;
            if let Err(err) = &outcome {
                log::warn!("Trace for record {id} failed: {err}");
            }
            BackendEvent::TraceLoaded { id, outcome }
        }
    }
}
