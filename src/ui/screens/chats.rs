use eframe::egui;

use rust_chat_client::common::{ChatSummary, ProfileImage, Session, UserEntry};
use rust_chat_client::error::Result;
use rust_chat_client::reconcile::chat_list::{self, ChatListEffect, ChatListState};
use rust_chat_client::reconcile::{Mount, Revision};

use super::{Route, Transition, settle};
use crate::ui::app::AppContext;
use crate::ui::components::avatar;

enum Loaded {
    Chats(Result<Vec<ChatSummary>>),
    PendingRequests(Result<u32>),
    Users {
        result: Result<Vec<UserEntry>>,
        since: Revision,
    },
    Profile {
        username: String,
        result: Result<ProfileImage>,
        since: Revision,
    },
}

pub struct ChatsScreen {
    state: ChatListState,
    filter: String,
    mount: Mount<Loaded>,
}

impl ChatsScreen {
    pub fn new(ctx: &AppContext, session: &Session) -> Self {
        let mut mount = Mount::new(ctx.runtime.clone(), ctx.connection());
        mount.subscribe(&chat_list::TOPICS);

        let state = ChatListState::new(Some(session.username.clone()));
        let screen_ctx = (ctx.api.clone(), session.credential.clone());

        let (api, credential) = screen_ctx.clone();
        let username = session.username.clone();
        mount.spawn(async move { Loaded::Chats(api.chats(&credential, &username).await) });

        let (api, credential) = screen_ctx.clone();
        mount.spawn(async move {
            Loaded::PendingRequests(api.notification_count(&credential).await)
        });

        let (api, credential) = screen_ctx;
        let since = state.image_revision();
        mount.spawn(async move {
            Loaded::Users {
                result: api.users(&credential).await,
                since,
            }
        });

        Self {
            state,
            filter: String::new(),
            mount,
        }
    }

    fn run_effects(&self, ctx: &AppContext, effects: Vec<ChatListEffect>) {
        let Some(session) = &ctx.session else {
            return;
        };
        for effect in effects {
            match effect {
                ChatListEffect::FetchProfileImage { username, since } => {
                    let api = ctx.api.clone();
                    let credential = session.credential.clone();
                    self.mount.spawn(async move {
                        let result = api
                            .him(&credential, &username)
                            .await
                            .map(|profile| profile.image());
                        Loaded::Profile {
                            username,
                            result,
                            since,
                        }
                    });
                }
            }
        }
    }

    fn reconcile(&mut self, ctx: &AppContext, transition: &mut Option<Transition>) {
        for event in self.mount.drain_events() {
            let effects = self.state.apply(&event);
            self.run_effects(ctx, effects);
        }

        for loaded in self.mount.drain_results() {
            match loaded {
                Loaded::Chats(result) => {
                    if let Some(chats) = settle("Loading chats", result, transition) {
                        self.state.apply_snapshot(chats);
                    }
                }
                Loaded::PendingRequests(result) => {
                    if let Some(count) = settle("Loading request count", result, transition) {
                        self.state.set_pending_requests(count);
                    }
                }
                Loaded::Users { result, since } => {
                    if let Some(users) = settle("Loading users", result, transition) {
                        self.state.apply_user_listing(users, since);
                    }
                }
                Loaded::Profile {
                    username,
                    result,
                    since,
                } => {
                    // a failed fetch still marks the friend as known
                    let image = settle("Loading profile", result, transition)
                        .unwrap_or(ProfileImage::Absent);
                    self.state.apply_profile_fetched(&username, image, since);
                }
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;
        self.reconcile(ctx, &mut transition);

        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.filter).hint_text("Search chats..."));
            let pending = self.state.pending_requests();
            let bell = if pending > 0 {
                format!("Requests ({pending})")
            } else {
                "Requests".to_string()
            };
            if ui.button(bell).clicked() {
                transition = Some(Transition::Go(Route::Notifications));
            }
        });
        ui.separator();

        let visible = self.state.filtered(&self.filter);
        if visible.is_empty() {
            ui.label(egui::RichText::new("No chats found").weak());
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for chat in visible {
                ui.horizontal(|ui| {
                    avatar::render(ui, self.state.images().get(&chat.friend_username));
                    if ui.link(&chat.friend_username).clicked() {
                        transition = Some(Transition::Go(Route::Thread(chat.friend_username.clone())));
                    }
                    if chat.unseen_count > 0 {
                        ui.colored_label(
                            egui::Color32::from_rgb(79, 70, 229),
                            format!("({})", chat.unseen_count),
                        );
                    }
                });
            }
        });

        transition
    }
}
