use eframe::egui;

use crate::ui::theme::Theme;

const PLACEHOLDER: &str = "Ask about herbs, cultivation, or benefits...";

/// Text field plus send button. Returns true when the user asked to send;
/// whether anything is actually sent is up to the chat session.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool, theme: &Theme) -> bool {
    let mut send = false;
    ui.horizontal(|ui| {
        let button_width = 40.0;
        let field = egui::TextEdit::singleline(input_text)
            .hint_text(PLACEHOLDER)
            .desired_width(ui.available_width() - button_width - ui.spacing().item_spacing.x);
        let response = ui.add_enabled(enabled, field);

        let button = egui::Button::new(egui::RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .fill(theme.primary_green)
            .corner_radius(20.0)
            .min_size(egui::vec2(button_width, button_width));
        if ui.add_enabled(enabled, button).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    send
}
