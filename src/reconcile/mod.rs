pub mod chat_list;
pub mod image_cache;
pub mod mount;
pub mod notifications;
pub mod profile;
pub mod search;
pub mod thread;

pub use chat_list::{ChatListEffect, ChatListState};
pub use image_cache::{ImageCache, Revision};
pub use mount::Mount;
pub use notifications::NotificationsState;
pub use profile::ProfileState;
pub use search::{SearchRequest, SearchState};
pub use thread::{ThreadEffect, ThreadState};
