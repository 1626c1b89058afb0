use eframe::egui;

use rust_chat_client::common::Session;
use rust_chat_client::error::{ClientError, Result};
use rust_chat_client::reconcile::Mount;

use super::{Route, Transition};
use crate::ui::app::AppContext;

pub struct SignInScreen {
    email: String,
    password: String,
    error: Option<String>,
    busy: bool,
    mount: Mount<Result<Session>>,
}

impl SignInScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            error: None,
            busy: false,
            mount: Mount::new(ctx.runtime.clone(), None),
        }
    }

    fn submit(&mut self, ctx: &AppContext) {
        self.busy = true;
        self.error = None;
        let api = ctx.api.clone();
        let email = self.email.trim().to_string();
        let password = self.password.clone();
        self.mount.spawn(async move {
            let credential = api.signin(&email, &password).await?;
            let me = api.me(&credential).await?;
            Ok(Session {
                credential,
                username: me.username,
            })
        });
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;

        for result in self.mount.drain_results() {
            self.busy = false;
            match result {
                Ok(session) => transition = Some(Transition::SignedIn(session)),
                Err(ClientError::InvalidCredentials) => {
                    self.error = Some("Invalid email or password".to_string());
                }
                Err(err) => {
                    log::warn!("Sign-in failed: {err}");
                    self.error = Some(format!("Sign-in failed: {err}"));
                }
            }
        }

        ui.heading("Sign in to your account");
        ui.separator();
        ui.label("Email address");
        ui.text_edit_singleline(&mut self.email);
        ui.label("Password");
        let password = ui.add(egui::TextEdit::singleline(&mut self.password).password(true));

        let ready = !self.busy && !self.email.trim().is_empty() && !self.password.is_empty();
        let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.add_enabled(ready, egui::Button::new("Sign in")).clicked() || submitted) && ready {
            self.submit(ctx);
        }

        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Not a member?");
            if ui.link("Sign up").clicked() {
                transition = Some(Transition::Go(Route::SignUp));
            }
        });

        transition
    }
}
