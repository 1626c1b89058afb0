use eframe::egui;

use rust_chat_client::error::{ClientError, Result};
use rust_chat_client::reconcile::Mount;

use super::{Route, Transition};
use crate::ui::app::AppContext;

pub struct SignUpScreen {
    username: String,
    email: String,
    password: String,
    error: Option<String>,
    busy: bool,
    mount: Mount<Result<()>>,
}

impl SignUpScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            error: None,
            busy: false,
            mount: Mount::new(ctx.runtime.clone(), None),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;

        for result in self.mount.drain_results() {
            self.busy = false;
            match result {
                Ok(()) => transition = Some(Transition::Go(Route::SignIn)),
                Err(ClientError::Rejected(detail)) => self.error = Some(detail),
                Err(err) => {
                    log::warn!("Sign-up failed: {err}");
                    self.error = Some(format!("Sign-up failed: {err}"));
                }
            }
        }

        ui.heading("Create an account");
        ui.separator();
        ui.label("Username");
        ui.text_edit_singleline(&mut self.username);
        ui.label("Email address");
        ui.text_edit_singleline(&mut self.email);
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut self.password).password(true));

        let ready = !self.busy
            && !self.username.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.password.is_empty();
        if ui.add_enabled(ready, egui::Button::new("Sign up")).clicked() {
            self.busy = true;
            self.error = None;
            let api = ctx.api.clone();
            let username = self.username.trim().to_string();
            let email = self.email.trim().to_string();
            let password = self.password.clone();
            self.mount
                .spawn(async move { api.signup(&username, &email, &password).await });
        }

        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        ui.separator();
        if ui.link("Already have an account? Sign in").clicked() {
            transition = Some(Transition::Go(Route::SignIn));
        }

        transition
    }
}
