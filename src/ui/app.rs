use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{BackendCommand, BackendEvent, Identity, RecordId, UserRole};
use crate::config::AppConfig;
use crate::network::ApiError;

use super::chat_session::ChatSession;
use super::components::{chat_panel, map_view};
use super::projection::MapViewport;
use super::record_map::RecordMap;
use super::theme::Theme;

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct AyurTraceApp {
    chat: ChatSession,
    map: RecordMap,
    viewport: MapViewport,
    theme: Theme,
    identity: Identity,
    command_sender: mpsc::Sender<BackendCommand>,
    event_receiver: mpsc::Receiver<BackendEvent>,
}

impl AyurTraceApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        command_sender: mpsc::Sender<BackendCommand>,
        event_receiver: mpsc::Receiver<BackendEvent>,
    ) -> Self {
        let theme = Theme::from_config(&config.theme, config.dark_mode);
        cc.egui_ctx.set_visuals(if theme.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let identity = config.identity();
        let mut app = Self {
            chat: ChatSession::new(identity.clone(), config.location_name.clone()),
            map: RecordMap::new(),
            viewport: MapViewport::default(),
            theme,
            identity,
            command_sender,
            event_receiver,
        };
        if let Err(err) = send_command(&app.command_sender, BackendCommand::LoadRecords) {
            app.map.apply_load(Err(err));
        }
        app
    }

    fn handle_backend_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                BackendEvent::ChatReply { token, outcome } => {
                    self.chat.apply_reply(token, outcome);
                }
                BackendEvent::RecordsLoaded(outcome) => self.map.apply_load(outcome),
                BackendEvent::TraceLoaded { id, outcome } => self.map.apply_trace(id, outcome),
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("AyurTrace").color(self.theme.primary_green).strong());
            ui.separator();
            ui.label(format!("Signed in as {}", self.identity.display_name()));

            let mut role = self.identity.role;
            egui::ComboBox::from_id_salt("role_selector")
                .selected_text(role.as_str())
                .show_ui(ui, |ui| {
                    for option in UserRole::ALL {
                        ui.selectable_value(&mut role, option, option.as_str());
                    }
                });
            if role != self.identity.role {
                log::info!("Role changed to {role}");
                self.identity.role = role;
                self.chat.set_identity(self.identity.clone());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{} herb records", self.map.markers().len())).weak(),
                );
            });
        });
    }
}

impl eframe::App for AyurTraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_backend_events();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.top_bar(ui));

        let actions = egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| map_view::render(ui, &mut self.map, &mut self.viewport, &self.theme))
            .inner;

        if let Some(id) = actions.chat_about {
            let chat = &mut self.chat;
            self.map.chat_about(id, |record| chat.open_for_record(record));
        }
        if let Some(id) = actions.trace {
            request_trace(&mut self.map, &self.command_sender, id);
        }

        if chat_panel::render_toggle(ctx, self.chat.is_open(), &self.theme) {
            self.chat.toggle();
        }
        if self.chat.is_open() && chat_panel::render_window(ctx, &mut self.chat, &self.theme) {
            submit_chat(&mut self.chat, &self.command_sender);
        }

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

/// Hand a command to the worker. A full or closed channel comes back as a
/// transport error.
fn send_command(sender: &mpsc::Sender<BackendCommand>, command: BackendCommand) -> Result<(), ApiError> {
    sender.try_send(command).map_err(|err| {
        log::warn!("Failed to send command to backend worker: {err}");
        ApiError::Transport(format!("backend worker unavailable ({err})"))
    })
}

fn submit_chat(chat: &mut ChatSession, sender: &mpsc::Sender<BackendCommand>) {
    if let Some(request) = chat.submit() {
        let token = request.token;
        if let Err(err) = send_command(sender, BackendCommand::SendQuery(request)) {
            chat.apply_reply(token, Err(err));
        }
    }
}

fn request_trace(map: &mut RecordMap, sender: &mpsc::Sender<BackendCommand>, id: RecordId) {
    if map.begin_trace(id) {
        if let Err(err) = send_command(sender, BackendCommand::TraceRecord(id)) {
            map.apply_trace(id, Err(err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Record, Sender};
    use crate::ui::record_map::TraceState;

    fn closed_channel() -> mpsc::Sender<BackendCommand> {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        tx
    }

    fn tulsi() -> Record {
        Record {
            id: 1,
            name: "Tulsi".to_string(),
            latitude: 20.0,
            longitude: 77.0,
            verified_species: None,
            confidence_score: None,
            timestamp: None,
            farmer: None,
        }
    }

    #[test]
    fn chat_recovers_when_worker_is_gone() {
        let sender = closed_channel();
        let mut chat = ChatSession::new(Identity::default(), "India");
        chat.open();

        chat.input_text = "What is Tulsi?".to_string();
        submit_chat(&mut chat, &sender);

        assert!(!chat.is_loading());
        let last = chat.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert!(last.text.starts_with("I'm having trouble connecting right now"));
        assert!(last.text.contains("backend worker unavailable"));

        chat.input_text = "again".to_string();
        assert!(chat.submit().is_some());
    }

    #[test]
    fn chat_query_reaches_a_live_worker() {
        let (sender, mut receiver) = mpsc::channel(1);
        let mut chat = ChatSession::new(Identity::default(), "India");
        chat.open();

        chat.input_text = "hi".to_string();
        submit_chat(&mut chat, &sender);

        assert!(chat.is_loading());
        assert!(matches!(
            receiver.try_recv(),
            Ok(BackendCommand::SendQuery(request)) if request.query == "hi"
        ));
    }

    #[test]
    fn trace_can_be_retried_after_a_failed_send() {
        let sender = closed_channel();
        let mut map = RecordMap::new();
        map.apply_load(Ok(vec![tulsi()]));

        request_trace(&mut map, &sender, 1);
        assert!(matches!(
            map.trace(1),
            Some(TraceState::Failed(reason)) if reason.contains("backend worker unavailable")
        ));
        assert!(map.begin_trace(1));
    }

    #[test]
    fn full_channel_is_a_transport_error() {
        let (sender, _receiver) = mpsc::channel(1);
        send_command(&sender, BackendCommand::LoadRecords).unwrap();

        let err = send_command(&sender, BackendCommand::LoadRecords).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
