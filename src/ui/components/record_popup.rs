use chrono::DateTime;
use eframe::egui::{self, Color32, RichText};

use crate::common::Record;
use crate::ui::record_map::TraceState;
use crate::ui::theme::Theme;

const CHAT_BUTTON_FILL: Color32 = Color32::from_rgb(0x16, 0xa3, 0x4a);
const POPUP_WIDTH: f32 = 240.0;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PopupActions {
    pub chat: bool,
    pub trace: bool,
    pub close: bool,
}

pub fn format_timestamp(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|time| time.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

/// Popup anchored next to a marker.
pub fn render(
    ctx: &egui::Context,
    record: &Record,
    anchor: egui::Pos2,
    trace: Option<&TraceState>,
    theme: &Theme,
) -> PopupActions {
    let mut actions = PopupActions::default();

    egui::Area::new(egui::Id::new(("record_popup", record.id)))
        .fixed_pos(anchor + egui::vec2(14.0, -14.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(POPUP_WIDTH);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&record.name).size(17.0).strong().color(theme.primary_green));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                        if ui.small_button("✕").clicked() {
                            actions.close = true;
                        }
                    });
                });

                ui.label(format!(
                    "Species: {}",
                    record.verified_species.as_deref().unwrap_or("Unverified")
                ));
                match record.confidence_score {
                    Some(score) => ui.label(format!("Confidence: {score}")),
                    None => ui.label("Confidence: n/a"),
                };
                if let Some(farmer) = &record.farmer {
                    ui.label(RichText::new(format!("Farmer: {farmer}")).weak());
                }
                if let Some(timestamp) = record.timestamp {
                    ui.label(RichText::new(format!("Registered: {}", format_timestamp(timestamp))).weak());
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let chat = egui::Button::new(RichText::new("Chat about this herb").color(Color32::WHITE))
                        .fill(CHAT_BUTTON_FILL);
                    if ui.add(chat).clicked() {
                        actions.chat = true;
                    }
                    let tracing = matches!(trace, Some(TraceState::Loading));
                    if ui.add_enabled(!tracing, egui::Button::new("Trace history")).clicked() {
                        actions.trace = true;
                    }
                });

                if let Some(trace) = trace {
                    ui.separator();
                    trace_section(ui, trace);
                }
            });
        });

    actions
}

fn trace_section(ui: &mut egui::Ui, trace: &TraceState) {
    match trace {
        TraceState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading history...");
            });
        }
        TraceState::Failed(reason) => {
            ui.colored_label(Color32::from_rgb(0xdc, 0x26, 0x26), format!("Trace failed: {reason}"));
        }
        TraceState::Loaded(report) => {
            let origin = &report.origin;
            ui.label(
                RichText::new(format!(
                    "Origin: {:.4}, {:.4}{}",
                    origin.latitude,
                    origin.longitude,
                    origin
                        .farmer
                        .as_deref()
                        .map(|farmer| format!(" by {farmer}"))
                        .unwrap_or_default()
                ))
                .weak(),
            );
            if report.processing_history.is_empty() {
                ui.label(RichText::new("No processing steps recorded yet.").italics());
                return;
            }
            ui.label(RichText::new("Processing history").strong());
            for step in &report.processing_history {
                let when = step.timestamp.map(format_timestamp).unwrap_or_default();
                ui.label(format!("• {} (batch {}) {when}", step.action, step.batch_number));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13 UTC");
    }
}
