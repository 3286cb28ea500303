use egui::Ui;
use uuid::Uuid;

use crate::state::{AppState, ChatMessage, ChatRole};

/// What the user asked for; the app layer executes it (submission
/// involves spawning a network task, which panels do not do).
pub enum ChatAction {
    Submit,
    Retry(Uuid),
    Enhance,
    ExportBundle,
}

pub fn show(ui: &mut Ui, state: &mut AppState) -> Option<ChatAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading("Chat");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if !state.chat.messages.is_empty() {
                if ui
                    .small_button("Clear")
                    .on_hover_text("Clear the conversation")
                    .clicked()
                {
                    state.chat.clear();
                }
                if ui
                    .small_button("Export")
                    .on_hover_text("Download the conversation as JSON")
                    .clicked()
                {
                    action = Some(ChatAction::ExportBundle);
                }
            }
        });
    });
    ui.separator();

    let scroll_height = (ui.available_height() - 36.0).max(60.0);
    egui::ScrollArea::vertical()
        .id_salt("chat_scroll")
        .max_height(scroll_height)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            if state.chat.messages.is_empty() {
                ui.add_space(10.0);
                ui.vertical_centered(|ui| {
                    ui.weak("Describe a model to generate it.");
                    ui.add_space(6.0);
                    ui.weak("  \"a rectangular plate with a notch\"");
                    ui.weak("  \"a cube 10x10x10\"");
                });
            }

            for msg in &state.chat.messages {
                if let Some(retry_id) = show_message(ui, msg) {
                    action = Some(ChatAction::Retry(retry_id));
                }
            }

            if state.chat.is_in_flight() {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Generating...");
                });
            }
        });

    // Input area
    ui.add_space(2.0);
    ui.horizontal(|ui| {
        let available_w = ui.available_width() - 80.0;
        let input_resp = ui.add_sized(
            [available_w.max(40.0), 22.0],
            egui::TextEdit::singleline(&mut state.chat.input)
                .hint_text("Describe a model...")
                .interactive(!state.chat.enhancing)
                .desired_width(available_w.max(40.0)),
        );

        let enter_pressed =
            input_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let has_text = !state.chat.input.trim().is_empty();
        let can_send = !state.chat.is_in_flight() && !state.chat.enhancing && has_text;

        let send_clicked = ui
            .add_enabled(can_send, egui::Button::new(">>"))
            .on_hover_text("Send")
            .clicked();

        if ui
            .add_enabled(can_send, egui::Button::new("✨"))
            .on_hover_text("Rewrite the prompt with more detail")
            .clicked()
        {
            action = Some(ChatAction::Enhance);
        } else if (send_clicked || enter_pressed) && can_send {
            action = Some(ChatAction::Submit);
        }
    });

    action
}

/// Render a single chat message. Returns the message id if its retry
/// button was clicked.
fn show_message(ui: &mut Ui, msg: &ChatMessage) -> Option<Uuid> {
    let mut retry_clicked = None;

    let (prefix, color, bg) = if msg.is_error {
        (
            "AI",
            egui::Color32::from_rgb(255, 130, 130),
            egui::Color32::from_rgba_premultiplied(80, 30, 30, 200),
        )
    } else {
        match msg.role {
            ChatRole::User => (
                "You",
                egui::Color32::from_rgb(130, 190, 255),
                egui::Color32::from_rgba_premultiplied(40, 60, 90, 200),
            ),
            ChatRole::Assistant => (
                "AI",
                egui::Color32::from_rgb(130, 255, 170),
                egui::Color32::from_rgba_premultiplied(30, 60, 40, 200),
            ),
        }
    };

    ui.add_space(3.0);
    egui::Frame::NONE
        .fill(bg)
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.colored_label(color, prefix);
                ui.weak(msg.timestamp.format("%H:%M").to_string());
            });
            ui.label(&msg.text);
            if msg.mesh.is_some() {
                ui.weak("Model attached");
            }
            if msg.is_error && msg.retry.is_some() {
                if ui.small_button("Retry").clicked() {
                    retry_clicked = Some(msg.id);
                }
            }
        });

    retry_clicked
}
