use std::path::PathBuf;

use eframe::egui;

use rust_chat_client::common::{MeSnapshot, ProfileImage, Session};
use rust_chat_client::error::{ClientError, Result};
use rust_chat_client::reconcile::Mount;
use rust_chat_client::reconcile::profile::{self, ProfileState};

use super::{Transition, settle};
use crate::ui::app::AppContext;
use crate::ui::components::avatar;

enum Loaded {
    Snapshot(Result<MeSnapshot>),
    Uploaded(Result<ProfileImage>),
}

pub struct ProfileScreen {
    state: ProfileState,
    image_path: String,
    error: Option<String>,
    mount: Mount<Loaded>,
}

impl ProfileScreen {
    pub fn new(ctx: &AppContext, session: &Session) -> Self {
        let mut mount = Mount::new(ctx.runtime.clone(), ctx.connection());
        mount.subscribe(&profile::TOPICS);

        let (api, credential) = (ctx.api.clone(), session.credential.clone());
        mount.spawn(async move { Loaded::Snapshot(api.me(&credential).await) });

        Self {
            state: ProfileState::new(session.username.clone()),
            image_path: String::new(),
            error: None,
            mount,
        }
    }

    fn upload(&mut self, ctx: &AppContext) {
        let Some(session) = &ctx.session else {
            return;
        };
        let path = PathBuf::from(self.image_path.trim());
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());

        self.state.begin_upload();
        self.error = None;

        let api = ctx.api.clone();
        let credential = session.credential.clone();
        self.mount.spawn(async move {
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => api.upload_profile(&credential, &file_name, bytes).await,
                Err(err) => Err(ClientError::from(err)),
            };
            Loaded::Uploaded(result)
        });
    }

    fn reconcile(&mut self, transition: &mut Option<Transition>) {
        for event in self.mount.drain_events() {
            self.state.apply(&event);
        }

        for loaded in self.mount.drain_results() {
            match loaded {
                Loaded::Snapshot(result) => {
                    if let Some(snapshot) = settle("Loading profile", result, transition) {
                        self.state.apply_snapshot(&snapshot);
                    }
                }
                Loaded::Uploaded(result) => {
                    let image = settle("Uploading profile picture", result, transition);
                    if image.is_none() {
                        self.error = Some("Upload failed".to_string());
                    }
                    self.state.finish_upload(image);
                }
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;
        self.reconcile(&mut transition);

        ui.horizontal(|ui| {
            avatar::render(ui, self.state.image());
            ui.heading(self.state.username().unwrap_or("..."));
        });
        ui.label(format!("Friends: {}", self.state.friend_count()));
        ui.separator();

        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.image_path).hint_text("Image path"));
            let ready = !self.state.is_uploading() && !self.image_path.trim().is_empty();
            if ui.add_enabled(ready, egui::Button::new("Upload")).clicked() {
                self.upload(ctx);
            }
            if self.state.is_uploading() {
                ui.spinner();
            }
        });
        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        ui.separator();
        if ui.button("Sign out").clicked() {
            transition = Some(Transition::SignOut);
        }

        transition
    }
}
