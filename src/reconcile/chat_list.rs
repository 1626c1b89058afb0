//! Chat list: summaries ordered most recently active first.

use std::collections::HashSet;

use crate::common::events::{IncomingMessage, ProfilePatch, UnseenUpdate};
use crate::common::{ChatSummary, ProfileImage, PushEvent, Topic, UserEntry};

use super::image_cache::{ImageCache, Revision};

pub const TOPICS: [Topic; 6] = [
    Topic::MessageNew,
    Topic::UnseenUpdate,
    Topic::NotificationsCount,
    Topic::FriendAdded,
    Topic::ProfileUpdated,
    Topic::UserCreated,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatListEffect {
    /// Fetch the picture of a new friend and hand it to `apply_profile_fetched`.
    FetchProfileImage { username: String, since: Revision },
}

#[derive(Debug, Clone, Default)]
pub struct ChatListState {
    me: Option<String>,
    chats: Vec<ChatSummary>,
    pending_requests: u32,
    images: ImageCache,
}

impl ChatListState {
    pub fn new(me: Option<String>) -> Self {
        Self {
            me,
            ..Self::default()
        }
    }

    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn pending_requests(&self) -> u32 {
        self.pending_requests
    }

    pub fn set_pending_requests(&mut self, count: u32) {
        self.pending_requests = count;
    }

    pub fn unseen(&self, friend: &str) -> Option<u32> {
        self.position(friend).map(|index| self.chats[index].unseen_count)
    }

    fn position(&self, friend: &str) -> Option<usize> {
        self.chats
            .iter()
            .position(|chat| chat.friend_username == friend)
    }

    /// Replaces the baseline with a fetched list, keeping the first entry per friend.
    pub fn apply_snapshot(&mut self, chats: Vec<ChatSummary>) {
        let mut seen = HashSet::new();
        self.chats = chats
            .into_iter()
            .filter(|chat| seen.insert(chat.friend_username.clone()))
            .collect();
    }

    pub fn apply(&mut self, event: &PushEvent) -> Vec<ChatListEffect> {
        match event {
            PushEvent::MessageNew(incoming) => {
                self.on_message(incoming);
                Vec::new()
            }
            PushEvent::UnseenUpdate(update) => {
                self.on_unseen_update(update);
                Vec::new()
            }
            PushEvent::NotificationsCount(count) => {
                self.pending_requests = *count;
                Vec::new()
            }
            PushEvent::FriendAdded { friend_username } => self.on_friend_added(friend_username),
            PushEvent::ProfileUpdated(patch) | PushEvent::UserCreated(patch) => {
                self.on_profile(patch);
                Vec::new()
            }
            PushEvent::RequestNew { .. } => Vec::new(),
        }
    }

    fn on_message(&mut self, incoming: &IncomingMessage) {
        if self.me.as_deref() != Some(incoming.to.as_str()) {
            return;
        }

        let entry = match self.position(&incoming.from) {
            Some(index) => {
                let mut entry = self.chats.remove(index);
                entry.unseen_count += 1;
                entry
            }
            None => ChatSummary::new(incoming.from.clone(), 1),
        };
        self.chats.insert(0, entry);
    }

    fn on_unseen_update(&mut self, update: &UnseenUpdate) {
        match self.position(&update.friend_username) {
            Some(index) => self.chats[index].unseen_count = update.unseen_count,
            None => self.chats.push(ChatSummary::new(
                update.friend_username.clone(),
                update.unseen_count,
            )),
        }
    }

    fn on_friend_added(&mut self, friend: &str) -> Vec<ChatListEffect> {
        if self.position(friend).is_some() {
            return Vec::new();
        }
        self.chats.push(ChatSummary::new(friend, 0));
        vec![ChatListEffect::FetchProfileImage {
            username: friend.to_string(),
            since: self.images.revision(),
        }]
    }

    fn on_profile(&mut self, patch: &ProfilePatch) {
        self.images
            .patch(&patch.username, ProfileImage::from_wire(&patch.profile));
    }

    pub fn apply_profile_fetched(
        &mut self,
        username: &str,
        image: ProfileImage,
        since: Revision,
    ) -> bool {
        self.images.apply_fetched(username, image, since)
    }

    /// Seeds the image cache from a `/users` listing fetched at `since`.
    pub fn apply_user_listing(&mut self, users: Vec<UserEntry>, since: Revision) -> usize {
        self.images.apply_listing(
            users.into_iter().map(|user| {
                let image = user.image();
                (user.username, image)
            }),
            since,
        )
    }

    pub fn image_revision(&self) -> Revision {
        self.images.revision()
    }

    /// Chats whose friend name contains `query`, case-insensitively.
    pub fn filtered(&self, query: &str) -> Vec<&ChatSummary> {
        let needle = query.trim().to_lowercase();
        self.chats
            .iter()
            .filter(|chat| chat.friend_username.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::events::WireMessage;

    fn message(from: &str, to: &str) -> PushEvent {
        PushEvent::MessageNew(IncomingMessage {
            from: from.to_string(),
            to: to.to_string(),
            message: WireMessage {
                text: "hi".into(),
                image: false,
                time: None,
            },
        })
    }

    fn state() -> ChatListState {
        let mut state = ChatListState::new(Some("alice".into()));
        state.apply_snapshot(vec![
            ChatSummary::new("bob", 0),
            ChatSummary::new("carol", 2),
            ChatSummary::new("dave", 0),
        ]);
        state
    }

    fn names(state: &ChatListState) -> Vec<&str> {
        state
            .chats()
            .iter()
            .map(|chat| chat.friend_username.as_str())
            .collect()
    }

    #[test]
    fn message_bumps_and_moves_to_front() {
        let mut state = state();
        state.apply(&message("carol", "alice"));
        assert_eq!(names(&state), ["carol", "bob", "dave"]);
        assert_eq!(state.unseen("carol"), Some(3));

        state.apply(&message("dave", "alice"));
        assert_eq!(names(&state), ["dave", "carol", "bob"]);
        assert_eq!(state.unseen("dave"), Some(1));
    }

    #[test]
    fn message_from_stranger_is_inserted_first() {
        let mut state = state();
        state.apply(&message("erin", "alice"));
        assert_eq!(names(&state)[0], "erin");
        assert_eq!(state.unseen("erin"), Some(1));
    }

    #[test]
    fn message_for_someone_else_is_ignored() {
        let mut state = state();
        state.apply(&message("carol", "zoe"));
        assert_eq!(names(&state), ["bob", "carol", "dave"]);
        assert_eq!(state.unseen("carol"), Some(2));
    }

    #[test]
    fn authoritative_count_overwrites_local_increments() {
        let mut state = ChatListState::new(Some("alice".into()));
        state.apply_snapshot(vec![ChatSummary::new("k", 2)]);
        state.apply(&PushEvent::UnseenUpdate(UnseenUpdate {
            friend_username: "k".into(),
            unseen_count: 5,
        }));
        assert_eq!(state.unseen("k"), Some(5));

        state.apply(&PushEvent::UnseenUpdate(UnseenUpdate {
            friend_username: "new".into(),
            unseen_count: 0,
        }));
        assert_eq!(names(&state), ["k", "new"]);
    }

    #[test]
    fn sender_stays_first_after_any_other_event() {
        let followers = [
            PushEvent::UnseenUpdate(UnseenUpdate {
                friend_username: "carol".into(),
                unseen_count: 0,
            }),
            PushEvent::UnseenUpdate(UnseenUpdate {
                friend_username: "zed".into(),
                unseen_count: 4,
            }),
            PushEvent::NotificationsCount(3),
            PushEvent::FriendAdded {
                friend_username: "erin".into(),
            },
            PushEvent::FriendAdded {
                friend_username: "bob".into(),
            },
            PushEvent::ProfileUpdated(ProfilePatch {
                username: "carol".into(),
                profile: "p".into(),
            }),
            PushEvent::UserCreated(ProfilePatch {
                username: "newbie".into(),
                profile: String::new(),
            }),
            PushEvent::RequestNew {
                from: "frank".into(),
            },
            message("dave", "zoe"),
        ];

        for follower in followers {
            let mut state = state();
            state.apply(&message("carol", "alice"));
            state.apply(&follower);
            assert_eq!(names(&state)[0], "carol", "after {follower:?}");
        }

        let mut state = state();
        state.apply(&message("dave", "alice"));
        assert_eq!(state.unseen("dave"), Some(1));
        state.apply(&PushEvent::FriendAdded {
            friend_username: "erin".into(),
        });
        assert_eq!(names(&state), ["dave", "bob", "carol", "erin"]);
    }

    #[test]
    fn friend_added_is_idempotent() {
        let mut state = state();
        let event = PushEvent::FriendAdded {
            friend_username: "erin".into(),
        };
        let effects = state.apply(&event);
        assert_eq!(effects.len(), 1);
        for _ in 0..3 {
            assert!(state.apply(&event).is_empty());
        }
        assert_eq!(
            state
                .chats()
                .iter()
                .filter(|chat| chat.friend_username == "erin")
                .count(),
            1
        );
    }

    #[test]
    fn friend_fetch_loses_to_newer_push() {
        let mut state = state();
        let effects = state.apply(&PushEvent::FriendAdded {
            friend_username: "erin".into(),
        });
        let ChatListEffect::FetchProfileImage { username, since } = effects[0].clone();

        state.apply(&PushEvent::ProfileUpdated(ProfilePatch {
            username: "erin".into(),
            profile: "fresh".into(),
        }));
        assert!(!state.apply_profile_fetched(&username, ProfileImage::Absent, since));
        assert_eq!(
            state.images().get("erin"),
            Some(&ProfileImage::Encoded("fresh".into()))
        );
    }

    #[test]
    fn user_created_without_picture_is_known() {
        let mut state = state();
        state.apply(&PushEvent::UserCreated(ProfilePatch {
            username: "newbie".into(),
            profile: String::new(),
        }));
        assert_eq!(state.images().get("newbie"), Some(&ProfileImage::Absent));
    }

    #[test]
    fn snapshot_drops_duplicate_keys() {
        let mut state = ChatListState::new(Some("alice".into()));
        state.apply_snapshot(vec![
            ChatSummary::new("bob", 1),
            ChatSummary::new("bob", 4),
        ]);
        assert_eq!(state.chats(), &[ChatSummary::new("bob", 1)]);
    }

    #[test]
    fn filter_does_not_mutate() {
        let state = state();
        let visible = state.filtered("CAR");
        assert_eq!(visible.len(), 1);
        assert_eq!(state.chats().len(), 3);
        assert_eq!(state.filtered("").len(), 3);
    }

    #[test]
    fn notifications_count_replaces_badge() {
        let mut state = state();
        state.apply(&PushEvent::NotificationsCount(4));
        state.apply(&PushEvent::NotificationsCount(1));
        assert_eq!(state.pending_requests(), 1);
    }
}
