use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Push topics the server delivers over the shared connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    MessageNew,
    UnseenUpdate,
    NotificationsCount,
    FriendAdded,
    ProfileUpdated,
    UserCreated,
    RequestNew,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::MessageNew,
        Topic::UnseenUpdate,
        Topic::NotificationsCount,
        Topic::FriendAdded,
        Topic::ProfileUpdated,
        Topic::UserCreated,
        Topic::RequestNew,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::MessageNew => "message:new",
            Topic::UnseenUpdate => "chat:unseen_update",
            Topic::NotificationsCount => "notifications:count",
            Topic::FriendAdded => "friend:added",
            Topic::ProfileUpdated => "profile:updated",
            Topic::UserCreated => "user:created",
            Topic::RequestNew => "request:new",
        }
    }

    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|topic| topic.as_str() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message body carried by `message:new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: bool,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub from: String,
    pub to: String,
    pub message: WireMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnseenUpdate {
    pub friend_username: String,
    pub unseen_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub username: String,
    #[serde(default)]
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CountPayload {
    #[serde(default)]
    count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FriendPayload {
    friend_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RequestPayload {
    from: String,
}

/// A decoded push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    MessageNew(IncomingMessage),
    UnseenUpdate(UnseenUpdate),
    NotificationsCount(u32),
    FriendAdded { friend_username: String },
    ProfileUpdated(ProfilePatch),
    UserCreated(ProfilePatch),
    RequestNew { from: String },
}

impl PushEvent {
    pub fn topic(&self) -> Topic {
        match self {
            PushEvent::MessageNew(_) => Topic::MessageNew,
            PushEvent::UnseenUpdate(_) => Topic::UnseenUpdate,
            PushEvent::NotificationsCount(_) => Topic::NotificationsCount,
            PushEvent::FriendAdded { .. } => Topic::FriendAdded,
            PushEvent::ProfileUpdated(_) => Topic::ProfileUpdated,
            PushEvent::UserCreated(_) => Topic::UserCreated,
            PushEvent::RequestNew { .. } => Topic::RequestNew,
        }
    }

    /// Decodes the payload of a named event.
    ///
    /// Returns `Ok(None)` for event names the client does not consume.
    pub fn decode(name: &str, payload: Value) -> Result<Option<PushEvent>> {
        let Some(topic) = Topic::from_name(name) else {
            return Ok(None);
        };

        let event = match topic {
            Topic::MessageNew => PushEvent::MessageNew(serde_json::from_value(payload)?),
            Topic::UnseenUpdate => PushEvent::UnseenUpdate(serde_json::from_value(payload)?),
            Topic::NotificationsCount => {
                let CountPayload { count } = serde_json::from_value(payload)?;
                PushEvent::NotificationsCount(count.unwrap_or(0))
            }
            Topic::FriendAdded => {
                let FriendPayload { friend_username } = serde_json::from_value(payload)?;
                PushEvent::FriendAdded { friend_username }
            }
            Topic::ProfileUpdated => PushEvent::ProfileUpdated(serde_json::from_value(payload)?),
            Topic::UserCreated => PushEvent::UserCreated(serde_json::from_value(payload)?),
            Topic::RequestNew => {
                let RequestPayload { from } = serde_json::from_value(payload)?;
                PushEvent::RequestNew { from }
            }
        };

        Ok(Some(event))
    }

    /// Encodes the event back into its wire name and payload.
    pub fn encode(&self) -> Result<(&'static str, Value)> {
        let payload = match self {
            PushEvent::MessageNew(message) => serde_json::to_value(message)?,
            PushEvent::UnseenUpdate(update) => serde_json::to_value(update)?,
            PushEvent::NotificationsCount(count) => serde_json::json!({ "count": count }),
            PushEvent::FriendAdded { friend_username } => {
                serde_json::json!({ "friendUsername": friend_username })
            }
            PushEvent::ProfileUpdated(patch) | PushEvent::UserCreated(patch) => {
                serde_json::to_value(patch)?
            }
            PushEvent::RequestNew { from } => serde_json::json!({ "from": from }),
        };
        Ok((self.topic().as_str(), payload))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_backend_payloads() {
        let event = PushEvent::decode(
            "message:new",
            json!({"from": "bob", "to": "alice", "message": {"text": "hey", "image": false, "time": "2025-08-14T05:05:00Z"}}),
        )
        .unwrap()
        .unwrap();
        match event {
            PushEvent::MessageNew(incoming) => {
                assert_eq!(incoming.from, "bob");
                assert_eq!(incoming.message.time.as_deref(), Some("2025-08-14T05:05:00Z"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let update = PushEvent::decode(
            "chat:unseen_update",
            json!({"friendUsername": "bob", "unseenCount": 5}),
        )
        .unwrap();
        assert_eq!(
            update,
            Some(PushEvent::UnseenUpdate(UnseenUpdate {
                friend_username: "bob".into(),
                unseen_count: 5
            }))
        );
    }

    #[test]
    fn null_count_reads_as_zero() {
        let event = PushEvent::decode("notifications:count", json!({"count": null})).unwrap();
        assert_eq!(event, Some(PushEvent::NotificationsCount(0)));
    }

    #[test]
    fn unknown_topic_is_skipped() {
        assert_eq!(PushEvent::decode("typing", json!({})).unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(PushEvent::decode("friend:added", json!({"name": "x"})).is_err());
    }

    #[test]
    fn topic_names_are_unique() {
        for topic in Topic::ALL {
            assert_eq!(Topic::from_name(topic.as_str()), Some(topic));
        }
    }
}
