use eframe::egui;

use crate::ui::screens::{Route, Transition};

const ENTRIES: [(&str, Route); 4] = [
    ("Chats", Route::Chats),
    ("Search", Route::Search),
    ("Requests", Route::Notifications),
    ("Profile", Route::Profile),
];

pub fn render(ui: &mut egui::Ui, current: &Route) -> Option<Transition> {
    let mut transition = None;
    ui.horizontal(|ui| {
        for (label, route) in ENTRIES {
            let selected = match current {
                Route::Thread(_) => route == Route::Chats,
                other => *other == route,
            };
            if ui.selectable_label(selected, label).clicked() && !selected {
                transition = Some(Transition::Go(route));
            }
        }
    });
    transition
}
