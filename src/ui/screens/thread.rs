use std::path::PathBuf;

use eframe::egui;
use uuid::Uuid;

use rust_chat_client::common::{
    DeliveryStatus, Direction, MeSnapshot, OutgoingMessage, PublicProfile, Session,
};
use rust_chat_client::error::{ClientError, Result};
use rust_chat_client::network::api::base64_encode;
use rust_chat_client::reconcile::thread::{self, ThreadEffect, ThreadState};
use rust_chat_client::reconcile::Mount;
use rust_chat_client::timestamp;

use super::{Transition, settle};
use crate::ui::app::AppContext;
use crate::ui::components::{avatar, input_bar};

enum Loaded {
    Snapshot(Result<MeSnapshot>),
    Friend(Result<PublicProfile>),
    MarkedRead(Result<()>),
    ImageRead(Result<OutgoingMessage>),
    Sent { id: Uuid, result: Result<()> },
}

pub struct ThreadScreen {
    state: ThreadState,
    input: String,
    image_path: String,
    mount: Mount<Loaded>,
}

impl ThreadScreen {
    pub fn new(ctx: &AppContext, session: &Session, friend: String) -> Self {
        let mut mount = Mount::new(ctx.runtime.clone(), ctx.connection());
        mount.subscribe(&thread::TOPICS);

        let state = ThreadState::new(session.username.clone(), friend.clone());

        let (api, credential) = (ctx.api.clone(), session.credential.clone());
        mount.spawn(async move { Loaded::Snapshot(api.me(&credential).await) });

        let (api, credential, name) = (ctx.api.clone(), session.credential.clone(), friend.clone());
        mount.spawn(async move { Loaded::Friend(api.him(&credential, &name).await) });

        let (api, credential) = (ctx.api.clone(), session.credential.clone());
        mount.spawn(async move { Loaded::MarkedRead(api.mark_read(&credential, &friend).await) });

        mount.emit(state.read_receipt());

        Self {
            state,
            input: String::new(),
            image_path: String::new(),
            mount,
        }
    }

    pub fn friend(&self) -> &str {
        self.state.friend()
    }

    fn send(&mut self, ctx: &AppContext, outgoing: OutgoingMessage) {
        let Some(session) = &ctx.session else {
            return;
        };
        let id = self.state.push_outgoing(&outgoing);
        let api = ctx.api.clone();
        let credential = session.credential.clone();
        let friend = self.state.friend().to_string();
        self.mount.spawn(async move {
            let result = api.send_message(&credential, &friend, &outgoing).await;
            Loaded::Sent { id, result }
        });
    }

    fn attach_image(&mut self) {
        let path = PathBuf::from(self.image_path.trim());
        self.image_path.clear();
        self.mount.spawn(async move {
            let result = tokio::fs::read(&path).await.map_err(ClientError::from).map(|bytes| {
                OutgoingMessage::image(format!(
                    "data:{};base64,{}",
                    image_mime(&path),
                    base64_encode(&bytes)
                ))
            });
            Loaded::ImageRead(result)
        });
    }

    fn reconcile(&mut self, ctx: &AppContext, transition: &mut Option<Transition>) {
        for event in self.mount.drain_events() {
            for effect in self.state.apply(&event) {
                match effect {
                    ThreadEffect::ReadReceipt(receipt) => self.mount.emit(receipt),
                }
            }
        }

        for loaded in self.mount.drain_results() {
            match loaded {
                Loaded::Snapshot(result) => {
                    if let Some(snapshot) = settle("Loading thread", result, transition) {
                        self.state.apply_snapshot(&snapshot);
                    }
                }
                Loaded::Friend(result) => {
                    if let Some(profile) = settle("Loading friend", result, transition) {
                        self.state.apply_profile(&profile);
                    }
                }
                Loaded::MarkedRead(result) => {
                    settle("Marking thread read", result, transition);
                }
                Loaded::ImageRead(result) => {
                    if let Some(outgoing) = settle("Reading image", result, transition) {
                        self.send(ctx, outgoing);
                    }
                }
                Loaded::Sent { id, result } => {
                    if settle("Sending message", result, transition).is_none() {
                        self.state.mark_failed(id);
                    }
                }
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;
        self.reconcile(ctx, &mut transition);

        ui.horizontal(|ui| {
            avatar::render(ui, self.state.friend_image());
            ui.heading(self.state.title());
        });
        ui.separator();

        let footer_height = 64.0;
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false; 2])
            .max_height(ui.available_height() - footer_height)
            .show(ui, |ui| {
                for message in self.state.sorted() {
                    let layout = match message.direction {
                        Direction::Sent => egui::Layout::right_to_left(egui::Align::TOP),
                        Direction::Received => egui::Layout::left_to_right(egui::Align::TOP),
                    };
                    ui.with_layout(layout, |ui| {
                        let body = if message.is_image {
                            format!("[image, {} bytes]", message.body.len())
                        } else {
                            message.body.clone()
                        };
                        ui.label(body);
                        ui.label(
                            egui::RichText::new(timestamp::format_clock(&message.time))
                                .small()
                                .weak(),
                        );
                        if message.status == DeliveryStatus::Failed {
                            ui.colored_label(egui::Color32::RED, "not delivered");
                        }
                    });
                }
            });

        ui.separator();
        if let Some(text) = input_bar::render(ui, &mut self.input) {
            self.send(ctx, OutgoingMessage::text(text));
        }
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.image_path).hint_text("Image file path"));
            if ui.button("Attach").clicked() && !self.image_path.trim().is_empty() {
                self.attach_image();
            }
        });

        transition
    }
}

fn image_mime(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
