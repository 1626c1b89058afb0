mod chats;
mod notifications;
mod profile;
mod search;
mod signin;
mod signup;
mod thread;

use eframe::egui;

use rust_chat_client::common::Session;
use rust_chat_client::error::Result;

use super::app::AppContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Chats,
    Thread(String),
    Search,
    Notifications,
    Profile,
}

pub enum Transition {
    Go(Route),
    SignedIn(Session),
    SignOut,
}

pub enum Screen {
    SignIn(signin::SignInScreen),
    SignUp(signup::SignUpScreen),
    Chats(chats::ChatsScreen),
    Thread(thread::ThreadScreen),
    Search(search::SearchScreen),
    Notifications(notifications::NotificationsScreen),
    Profile(profile::ProfileScreen),
}

impl Screen {
    /// Mounts the screen for `route`. Signed-in routes fall back to sign-in
    /// when there is no session.
    pub fn open(route: Route, ctx: &AppContext) -> Screen {
        let Some(session) = ctx.session.as_ref() else {
            return match route {
                Route::SignUp => Screen::SignUp(signup::SignUpScreen::new(ctx)),
                _ => Screen::SignIn(signin::SignInScreen::new(ctx)),
            };
        };

        match route {
            Route::SignIn => Screen::SignIn(signin::SignInScreen::new(ctx)),
            Route::SignUp => Screen::SignUp(signup::SignUpScreen::new(ctx)),
            Route::Chats => Screen::Chats(chats::ChatsScreen::new(ctx, session)),
            Route::Thread(friend) => Screen::Thread(thread::ThreadScreen::new(ctx, session, friend)),
            Route::Search => Screen::Search(search::SearchScreen::new(ctx, session)),
            Route::Notifications => {
                Screen::Notifications(notifications::NotificationsScreen::new(ctx, session))
            }
            Route::Profile => Screen::Profile(profile::ProfileScreen::new(ctx, session)),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Screen::SignIn(_) => Route::SignIn,
            Screen::SignUp(_) => Route::SignUp,
            Screen::Chats(_) => Route::Chats,
            Screen::Thread(screen) => Route::Thread(screen.friend().to_string()),
            Screen::Search(_) => Route::Search,
            Screen::Notifications(_) => Route::Notifications,
            Screen::Profile(_) => Route::Profile,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &AppContext) -> Option<Transition> {
        match self {
            Screen::SignIn(screen) => screen.show(ui, ctx),
            Screen::SignUp(screen) => screen.show(ui, ctx),
            Screen::Chats(screen) => screen.show(ui, ctx),
            Screen::Thread(screen) => screen.show(ui, ctx),
            Screen::Search(screen) => screen.show(ui, ctx),
            Screen::Notifications(screen) => screen.show(ui, ctx),
            Screen::Profile(screen) => screen.show(ui, ctx),
        }
    }
}

/// Logs a failed request and keeps the last-known-good state.
///
/// A rejected credential turns into a sign-out.
fn settle<T>(what: &str, result: Result<T>, transition: &mut Option<Transition>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_auth_failure() => {
            log::warn!("{what}: credential rejected");
            *transition = Some(Transition::SignOut);
            None
        }
        Err(err) => {
            log::warn!("{what} failed: {err}");
            None
        }
    }
}
