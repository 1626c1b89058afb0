use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Handle;

use rust_chat_client::common::{ClientEvent, Session};
use rust_chat_client::network::{ApiClient, ConnectionHandle, ConnectionManager};
use rust_chat_client::storage::SessionStore;

use super::components::nav_bar;
use super::screens::{Route, Screen, Transition};

/// Everything the screens share, threaded explicitly into each of them.
pub struct AppContext {
    pub api: ApiClient,
    pub connections: Arc<ConnectionManager>,
    pub runtime: Handle,
    pub store: Option<SessionStore>,
    pub session: Option<Session>,
    pub search_debounce: Duration,
}

impl AppContext {
    /// The shared connection, opened with the session credential on first use.
    pub fn connection(&self) -> Option<ConnectionHandle> {
        self.connections
            .obtain(self.session.as_ref().map(|session| &session.credential))
    }

    fn begin_session(&mut self, session: Session) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&session) {
                log::warn!("Failed to persist session: {err}");
            }
        }
        let username = session.username.clone();
        self.session = Some(session);
        if let Some(connection) = self.connection() {
            connection.emit(ClientEvent::UserConnected { username });
        }
    }

    fn end_session(&mut self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                log::warn!("Failed to clear stored session: {err}");
            }
        }
        self.session = None;
    }
}

pub struct ChatApp {
    ctx: AppContext,
    screen: Screen,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, ctx: AppContext) -> Self {
        let route = if ctx.session.is_some() {
            Route::Chats
        } else {
            Route::SignIn
        };
        if let Some(session) = &ctx.session {
            log::info!("Restored session for {}", session.username);
            if let Some(connection) = ctx.connection() {
                connection.emit(ClientEvent::UserConnected {
                    username: session.username.clone(),
                });
            }
        }
        let screen = Screen::open(route, &ctx);
        Self { ctx, screen }
    }

    fn apply(&mut self, transition: Transition) {
        let route = match transition {
            Transition::Go(route) => route,
            Transition::SignedIn(session) => {
                log::info!("Signed in as {}", session.username);
                self.ctx.begin_session(session);
                Route::Chats
            }
            Transition::SignOut => {
                log::info!("Signing out");
                self.ctx.end_session();
                Route::SignIn
            }
        };
        // replacing the screen drops the old one, which unmounts it
        self.screen = Screen::open(route, &self.ctx);
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        if self.ctx.session.is_some() {
            egui::TopBottomPanel::bottom("nav_bar").show(ctx, |ui| {
                transition = nav_bar::render(ui, &self.screen.route());
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(next) = self.screen.show(ui, &self.ctx) {
                transition = Some(next);
            }
        });

        if let Some(transition) = transition {
            self.apply(transition);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
