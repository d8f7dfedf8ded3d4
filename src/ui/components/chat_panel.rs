use eframe::egui::{self, Align, Align2, Color32, CornerRadius, Layout, Margin, RichText, Stroke, vec2};

use crate::common::{ChatMessage, Sender};
use crate::ui::chat_session::ChatSession;
use crate::ui::theme::Theme;

use super::{input_bar, markdown, record_popup};

const WINDOW_SIZE: [f32; 2] = [380.0, 520.0];
const BUBBLE_MAX_WIDTH: f32 = 250.0;
const AVATAR_SIZE: f32 = 28.0;

/// Round floating button in the bottom-right corner. Returns true if clicked.
pub fn render_toggle(ctx: &egui::Context, is_open: bool, theme: &Theme) -> bool {
    egui::Area::new(egui::Id::new("chat_toggle"))
        .anchor(Align2::RIGHT_BOTTOM, vec2(-32.0, -32.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let glyph = if is_open { "✕" } else { "✨" };
            let button = egui::Button::new(RichText::new(glyph).size(26.0).color(Color32::WHITE))
                .fill(theme.primary_green)
                .corner_radius(32.0)
                .min_size(vec2(64.0, 64.0));
            ui.add(button).on_hover_text("AyurBot").clicked()
        })
        .inner
}

/// The chat window, shown above the toggle while the session is open.
/// Returns true when the user asked to send the current input.
pub fn render_window(ctx: &egui::Context, session: &mut ChatSession, theme: &Theme) -> bool {
    let frame = egui::Frame::window(&ctx.style())
        .fill(theme.card_background)
        .stroke(Stroke::new(1.0, theme.primary_faint()))
        .corner_radius(16.0)
        .inner_margin(Margin::ZERO);

    let mut send = false;
    egui::Window::new("AyurBot")
        .id(egui::Id::new("ayurbot_window"))
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::RIGHT_BOTTOM, vec2(-32.0, -112.0))
        .fixed_size(WINDOW_SIZE)
        .frame(frame)
        .show(ctx, |ui| {
            egui::TopBottomPanel::top("chat_header")
                .frame(
                    egui::Frame::new()
                        .fill(theme.primary_green)
                        .inner_margin(Margin::same(12)),
                )
                .show_inside(ui, |ui| header(ui, session));

            egui::TopBottomPanel::bottom("chat_input")
                .frame(egui::Frame::new().inner_margin(Margin::same(12)))
                .show_inside(ui, |ui| {
                    let enabled = !session.is_loading();
                    send = input_bar::render(ui, &mut session.input_text, enabled, theme);
                });

            egui::CentralPanel::default()
                .frame(egui::Frame::new().inner_margin(Margin::symmetric(12, 8)))
                .show_inside(ui, |ui| transcript(ui, session, theme));
        });

    send
}

fn header(ui: &mut egui::Ui, session: &ChatSession) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("🤖").size(22.0).color(Color32::WHITE));
        ui.vertical(|ui| {
            ui.label(RichText::new("AyurBot").size(18.0).strong().color(Color32::WHITE));
            ui.label(
                RichText::new(format!("Ayurvedic Support ({})", session.identity().role))
                    .size(12.0)
                    .color(Color32::from_white_alpha(230)),
            );
            if let Some(herb) = session.herb_context() {
                ui.label(
                    RichText::new(format!("About: {herb}"))
                        .size(11.0)
                        .color(Color32::from_white_alpha(200)),
                );
            }
        });
    });
}

fn transcript(ui: &mut egui::Ui, session: &mut ChatSession, theme: &Theme) {
    let scroll = session.take_scroll_request();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in session.messages() {
                message_row(ui, message, theme);
                ui.add_space(6.0);
            }
            if session.is_loading() {
                typing_indicator(ui, theme);
            }
            if scroll {
                ui.scroll_to_cursor(Some(Align::BOTTOM));
            }
        });
}

fn message_row(ui: &mut egui::Ui, message: &ChatMessage, theme: &Theme) {
    match message.sender {
        Sender::Bot => {
            ui.horizontal_top(|ui| {
                avatar(ui, theme.accent, "A");
                bubble(ui, message, theme.bot_bubble(), theme, CornerRadius { nw: 12, ne: 12, sw: 2, se: 12 });
            });
        }
        Sender::User => {
            ui.with_layout(Layout::right_to_left(Align::TOP), |ui| {
                avatar(ui, Color32::from_gray(0xd1), "U");
                bubble(ui, message, theme.user_bubble(), theme, CornerRadius { nw: 12, ne: 12, sw: 12, se: 2 });
            });
        }
    }
}

fn bubble(ui: &mut egui::Ui, message: &ChatMessage, fill: Color32, theme: &Theme, corners: CornerRadius) {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(corners)
        .inner_margin(Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.set_max_width(BUBBLE_MAX_WIDTH);
            ui.push_id(message.id, |ui| match message.sender {
                Sender::Bot => markdown::render(ui, &message.text, theme.bubble_text()),
                Sender::User => {
                    ui.label(RichText::new(&message.text).color(theme.bubble_text()));
                }
            });
        })
        .response
        .on_hover_text(record_popup::format_timestamp(message.timestamp));
}

fn avatar(ui: &mut egui::Ui, fill: Color32, glyph: &str) {
    let (rect, _) = ui.allocate_exact_size(vec2(AVATAR_SIZE, AVATAR_SIZE), egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), AVATAR_SIZE / 2.0, fill);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        glyph,
        egui::FontId::proportional(13.0),
        Color32::WHITE,
    );
}

fn typing_indicator(ui: &mut egui::Ui, theme: &Theme) {
    let time = ui.input(|i| i.time) as f32;
    ui.horizontal_top(|ui| {
        avatar(ui, theme.accent, "A");
        egui::Frame::new()
            .fill(theme.bot_bubble())
            .corner_radius(CornerRadius { nw: 12, ne: 12, sw: 2, se: 12 })
            .inner_margin(Margin::symmetric(14, 10))
            .show(ui, |ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(36.0, 12.0), egui::Sense::hover());
                for dot in 0..3 {
                    let phase = time * 6.0 - dot as f32 * 1.2;
                    let lift = phase.sin().max(0.0) * 4.0;
                    let center = egui::pos2(rect.left() + 6.0 + dot as f32 * 12.0, rect.center().y - lift);
                    ui.painter().circle_filled(center, 4.0, Color32::from_gray(0x6b));
                }
            });
    });
}
