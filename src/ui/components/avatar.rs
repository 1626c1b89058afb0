use eframe::egui;

use rust_chat_client::common::ProfileImage;

const SIZE: f32 = 24.0;

/// Draws a round avatar marker. Unknown and absent pictures render hollow.
pub fn render(ui: &mut egui::Ui, image: Option<&ProfileImage>) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(SIZE, SIZE), egui::Sense::hover());
    let painter = ui.painter();
    let radius = SIZE / 2.0 - 1.0;

    match image {
        Some(image) if image.is_present() => {
            painter.circle_filled(rect.center(), radius, egui::Color32::from_rgb(90, 140, 220));
            response.on_hover_text("Profile picture")
        }
        Some(_) => {
            painter.circle_stroke(rect.center(), radius, ui.visuals().widgets.inactive.fg_stroke);
            response.on_hover_text("No profile picture")
        }
        None => {
            painter.circle_stroke(rect.center(), radius, ui.visuals().widgets.noninteractive.bg_stroke);
            response
        }
    }
}
