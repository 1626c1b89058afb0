use eframe::egui;

/// Single-line composer. Returns the trimmed text when the user sends
/// something other than whitespace.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 60.0),
        );
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    if !send {
        return None;
    }

    let message = input_text.trim().to_string();
    if message.is_empty() {
        return None;
    }
    input_text.clear();
    Some(message)
}
