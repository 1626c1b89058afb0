use serde_json::{Value, json};

/// Events the client emits on the shared connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The thread with `friend` is open; the server resets its unseen count.
    ChatRead { me: String, friend: String },
    /// Binds this connection to `username` on the server side.
    UserConnected { username: String },
    FriendRequestSent { from: String, to: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ChatRead { .. } => "chat_read",
            ClientEvent::UserConnected { .. } => "user_connected",
            ClientEvent::FriendRequestSent { .. } => "friend_request_sent",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ClientEvent::ChatRead { me, friend } => json!({ "me": me, "friend": friend }),
            ClientEvent::UserConnected { username } => json!({ "username": username }),
            ClientEvent::FriendRequestSent { from, to } => json!({ "from": from, "to": to }),
        }
    }
}
