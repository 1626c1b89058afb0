mod app;
mod components;
mod screens;

pub use app::{AppContext, ChatApp};
