use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque bearer token handed out by sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// A signed-in user: the credential plus the username `/me` resolved it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
    pub username: String,
}

/// One row of the chat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub friend_username: String,
    #[serde(default)]
    pub unseen_count: u32,
}

impl ChatSummary {
    pub fn new(friend_username: impl Into<String>, unseen_count: u32) -> Self {
        Self {
            friend_username: friend_username.into(),
            unseen_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Read,
    Unread,
    /// Local only: the send call failed after the optimistic append.
    Failed,
}

/// A message inside one thread. `id` is assigned locally and never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    /// Text body, or a data URI when `is_image` is set.
    pub body: String,
    pub is_image: bool,
    pub time: String,
    pub direction: Direction,
    pub status: DeliveryStatus,
}

impl Message {
    pub fn received(body: String, is_image: bool, time: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            body,
            is_image,
            time,
            direction: Direction::Received,
            status: DeliveryStatus::Read,
        }
    }

    pub fn sent(body: String, is_image: bool, time: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            body,
            is_image,
            time,
            direction: Direction::Sent,
            status: DeliveryStatus::Read,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFlag {
    #[serde(rename = "Yes")]
    Yes,
    #[default]
    #[serde(rename = "No", other)]
    No,
}

/// Message as the backend stores it inside `/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: ImageFlag,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(default)]
    pub status: DeliveryStatus,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: stored.text,
            is_image: stored.image == ImageFlag::Yes,
            time: stored.time,
            direction: stored.direction,
            status: stored.status,
        }
    }
}

/// Profile picture as known to the client.
///
/// `Absent` means "known user, no picture"; an unknown user has no entry at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileImage {
    Encoded(String),
    Absent,
}

impl ProfileImage {
    /// The backend encodes "no image" as an empty string.
    pub fn from_wire(encoded: &str) -> Self {
        if encoded.is_empty() {
            ProfileImage::Absent
        } else {
            ProfileImage::Encoded(encoded.to_string())
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ProfileImage::Encoded(_))
    }
}

/// Entry of `/users` and `/users/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: String,
}

impl UserEntry {
    pub fn image(&self) -> ProfileImage {
        ProfileImage::from_wire(&self.profile)
    }
}

/// Answer of `/him`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub name: String,
    #[serde(default)]
    pub profile: String,
}

impl PublicProfile {
    pub fn image(&self) -> ProfileImage {
        ProfileImage::from_wire(&self.profile)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendThread {
    pub name: String,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

/// Answer of `/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeSnapshot {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub friends: Vec<FriendThread>,
    #[serde(default)]
    pub requests: Vec<String>,
}

impl MeSnapshot {
    pub fn thread_with(&self, friend: &str) -> Option<&FriendThread> {
        self.friends.iter().find(|thread| thread.name == friend)
    }
}

/// Body of `POST /chat/{friend}/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn image(data_uri: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            image: Some(data_uri.into()),
        }
    }

    pub fn is_image(&self) -> bool {
        self.image.is_some()
    }

    /// What the local feed shows for this message.
    pub fn display_body(&self) -> &str {
        self.image.as_deref().unwrap_or(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_message_maps_backend_flags() {
        let stored: StoredMessage = serde_json::from_str(
            r#"{"text":"hi","image":"No","time":"2025-08-14T05:05:00Z","type":"received","status":"unread"}"#,
        )
        .unwrap();
        let message = Message::from(stored);
        assert!(!message.is_image);
        assert_eq!(message.direction, Direction::Received);
        assert_eq!(message.status, DeliveryStatus::Unread);
    }

    #[test]
    fn unknown_image_flag_reads_as_no() {
        let stored: StoredMessage =
            serde_json::from_str(r#"{"text":"x","image":"maybe","type":"sent"}"#).unwrap();
        assert_eq!(stored.image, ImageFlag::No);
        assert_eq!(stored.status, DeliveryStatus::Read);
    }

    #[test]
    fn empty_profile_is_absent_not_unknown() {
        assert_eq!(ProfileImage::from_wire(""), ProfileImage::Absent);
        assert!(ProfileImage::from_wire("aGk=").is_present());
    }

    #[test]
    fn credential_debug_hides_token() {
        let credential = Credential::new("secret-token");
        assert!(!format!("{credential:?}").contains("secret"));
    }

    #[test]
    fn outgoing_image_serializes_empty_text() {
        let body = serde_json::to_value(OutgoingMessage::image("data:image/png;base64,AA==")).unwrap();
        assert_eq!(body["text"], "");
        assert_eq!(body["image"], "data:image/png;base64,AA==");
        let text = serde_json::to_value(OutgoingMessage::text("yo")).unwrap();
        assert!(text.get("image").is_none());
    }
}
