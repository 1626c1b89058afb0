use eframe::egui;
use tokio_util::sync::CancellationToken;

use rust_chat_client::common::{ClientEvent, MeSnapshot, Session, UserEntry};
use rust_chat_client::error::Result;
use rust_chat_client::reconcile::search::{self, SearchRequest, SearchState};
use rust_chat_client::reconcile::Mount;

use super::{Transition, settle};
use crate::ui::app::AppContext;
use crate::ui::components::avatar;

enum Loaded {
    Snapshot(Result<MeSnapshot>),
    Results {
        generation: u64,
        result: Result<Vec<UserEntry>>,
    },
    RequestSent {
        to: String,
        result: Result<()>,
    },
}

pub struct SearchScreen {
    me: String,
    state: SearchState,
    input: String,
    notice: Option<String>,
    in_flight: Option<CancellationToken>,
    mount: Mount<Loaded>,
}

impl SearchScreen {
    pub fn new(ctx: &AppContext, session: &Session) -> Self {
        let mut mount = Mount::new(ctx.runtime.clone(), ctx.connection());
        mount.subscribe(&search::TOPICS);

        let (api, credential) = (ctx.api.clone(), session.credential.clone());
        mount.spawn(async move { Loaded::Snapshot(api.me(&credential).await) });

        Self {
            me: session.username.clone(),
            state: SearchState::new(),
            input: String::new(),
            notice: None,
            in_flight: None,
            mount,
        }
    }

    fn query(&mut self, ctx: &AppContext, request: SearchRequest) {
        let Some(session) = &ctx.session else {
            return;
        };
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        let token = self.mount.child_token();
        self.in_flight = Some(token.clone());

        let api = ctx.api.clone();
        let credential = session.credential.clone();
        let debounce = ctx.search_debounce;
        self.mount.spawn_with(token, async move {
            tokio::time::sleep(debounce).await;
            Loaded::Results {
                generation: request.generation,
                result: api.search_users(&credential, &request.query).await,
            }
        });
    }

    fn send_request(&self, ctx: &AppContext, to: String) {
        let Some(session) = &ctx.session else {
            return;
        };
        let api = ctx.api.clone();
        let credential = session.credential.clone();
        self.mount.spawn(async move {
            let result = api.send_request(&credential, &to).await;
            Loaded::RequestSent { to, result }
        });
    }

    fn reconcile(&mut self, transition: &mut Option<Transition>) {
        for event in self.mount.drain_events() {
            self.state.apply(&event);
        }

        for loaded in self.mount.drain_results() {
            match loaded {
                Loaded::Snapshot(result) => {
                    if let Some(snapshot) = settle("Loading friends", result, transition) {
                        self.state
                            .apply_friends(snapshot.friends.into_iter().map(|thread| thread.name));
                    }
                }
                Loaded::Results { generation, result } => {
                    if let Some(users) = settle("Searching users", result, transition) {
                        self.state.apply_results(generation, users);
                    }
                }
                Loaded::RequestSent { to, result } => {
                    match settle("Sending friend request", result, transition) {
                        Some(()) => {
                            self.state.mark_requested(&to);
                            self.mount.emit(ClientEvent::FriendRequestSent {
                                from: self.me.clone(),
                                to: to.clone(),
                            });
                            self.notice = Some(format!("Friend request sent to {to}"));
                        }
                        None => self.notice = Some("Failed to send friend request".to_string()),
                    }
                }
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;
        self.reconcile(&mut transition);

        let response =
            ui.add(egui::TextEdit::singleline(&mut self.input).hint_text("Search users..."));
        if response.changed() {
            let input = self.input.clone();
            match self.state.set_query(&input) {
                Some(request) => self.query(ctx, request),
                None => {
                    if let Some(previous) = self.in_flight.take() {
                        previous.cancel();
                    }
                }
            }
        }

        if let Some(notice) = &self.notice {
            ui.label(egui::RichText::new(notice).italics());
        }
        ui.separator();

        let mut request_to = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for user in self.state.results() {
                ui.horizontal(|ui| {
                    avatar::render(ui, Some(&user.image()));
                    ui.strong(&user.username);
                    if self.state.is_friend(&user.username) {
                        ui.label(egui::RichText::new("friend").weak());
                    } else if self.state.was_requested(&user.username) {
                        ui.label(egui::RichText::new("requested").weak());
                    } else if ui.button("Request").clicked() {
                        request_to = Some(user.username.clone());
                    }
                });
            }
        });

        if let Some(to) = request_to {
            self.send_request(ctx, to);
        }

        transition
    }
}
