pub mod commands;
pub mod events;
pub mod types;

pub use commands::ClientEvent;
pub use events::{PushEvent, Topic};
pub use types::{
    ChatSummary, Credential, DeliveryStatus, Direction, MeSnapshot, Message, OutgoingMessage,
    ProfileImage, PublicProfile, Session, UserEntry,
};
