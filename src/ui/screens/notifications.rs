use eframe::egui;

use rust_chat_client::common::{MeSnapshot, Session};
use rust_chat_client::error::Result;
use rust_chat_client::reconcile::Mount;
use rust_chat_client::reconcile::notifications::{self, NotificationsState};

use super::{Transition, settle};
use crate::ui::app::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Accept,
    Reject,
}

enum Loaded {
    Snapshot(Result<MeSnapshot>),
    Resolved {
        requester: String,
        decision: Decision,
        result: Result<()>,
    },
}

pub struct NotificationsScreen {
    state: NotificationsState,
    error: Option<String>,
    mount: Mount<Loaded>,
}

impl NotificationsScreen {
    pub fn new(ctx: &AppContext, session: &Session) -> Self {
        let mut mount = Mount::new(ctx.runtime.clone(), ctx.connection());
        mount.subscribe(&notifications::TOPICS);

        let (api, credential) = (ctx.api.clone(), session.credential.clone());
        mount.spawn(async move { Loaded::Snapshot(api.me(&credential).await) });

        Self {
            state: NotificationsState::new(),
            error: None,
            mount,
        }
    }

    fn decide(&self, ctx: &AppContext, requester: String, decision: Decision) {
        let Some(session) = &ctx.session else {
            return;
        };
        let api = ctx.api.clone();
        let credential = session.credential.clone();
        self.mount.spawn(async move {
            let result = match decision {
                Decision::Accept => api.accept_request(&credential, &requester).await,
                Decision::Reject => api.reject_request(&credential, &requester).await,
            };
            Loaded::Resolved {
                requester,
                decision,
                result,
            }
        });
    }

    fn reconcile(&mut self, transition: &mut Option<Transition>) {
        for event in self.mount.drain_events() {
            self.state.apply(&event);
        }

        for loaded in self.mount.drain_results() {
            match loaded {
                Loaded::Snapshot(result) => {
                    if let Some(snapshot) = settle("Loading friend requests", result, transition) {
                        self.state.apply_snapshot(snapshot.requests);
                    }
                }
                Loaded::Resolved {
                    requester,
                    decision,
                    result,
                } => match settle("Answering friend request", result, transition) {
                    Some(()) => {
                        self.state.resolve(&requester);
                        self.error = None;
                    }
                    None => {
                        let verb = match decision {
                            Decision::Accept => "accept",
                            Decision::Reject => "reject",
                        };
                        self.error = Some(format!("Could not {verb} request from {requester}"));
                    }
                },
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        let mut transition = None;
        self.reconcile(&mut transition);

        ui.heading("Friend requests");
        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }
        ui.separator();

        if self.state.requests().is_empty() {
            ui.label(egui::RichText::new("No pending requests").weak());
            return transition;
        }

        let mut decided = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for requester in self.state.requests() {
                ui.horizontal(|ui| {
                    ui.strong(requester);
                    if ui.button("Accept").clicked() {
                        decided = Some((requester.clone(), Decision::Accept));
                    }
                    if ui.button("Reject").clicked() {
                        decided = Some((requester.clone(), Decision::Reject));
                    }
                });
            }
        });

        if let Some((requester, decision)) = decided {
            self.decide(ctx, requester, decision);
        }

        transition
    }
}
