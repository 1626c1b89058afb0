//! One open conversation: an append-only feed.

use uuid::Uuid;

use crate::common::{
    ClientEvent, DeliveryStatus, MeSnapshot, Message, OutgoingMessage, ProfileImage,
    PublicProfile, PushEvent, Topic,
};
use crate::timestamp;

pub const TOPICS: [Topic; 2] = [Topic::MessageNew, Topic::ProfileUpdated];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEffect {
    /// Tell the server the thread has been seen.
    ReadReceipt(ClientEvent),
}

#[derive(Debug, Clone)]
pub struct ThreadState {
    me: String,
    friend: String,
    messages: Vec<Message>,
    /// Leading entries of `messages` that came from the last snapshot.
    baseline: usize,
    friend_name: Option<String>,
    friend_image: Option<ProfileImage>,
}

impl ThreadState {
    pub fn new(me: impl Into<String>, friend: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            friend: friend.into(),
            messages: Vec::new(),
            baseline: 0,
            friend_name: None,
            friend_image: None,
        }
    }

    pub fn friend(&self) -> &str {
        &self.friend
    }

    pub fn title(&self) -> &str {
        self.friend_name.as_deref().unwrap_or(&self.friend)
    }

    pub fn friend_image(&self) -> Option<&ProfileImage> {
        self.friend_image.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn read_receipt(&self) -> ClientEvent {
        ClientEvent::ChatRead {
            me: self.me.clone(),
            friend: self.friend.clone(),
        }
    }

    /// Takes this friend's messages from a `/me` snapshot as the baseline.
    ///
    /// Messages sent or received since the view opened are kept after it.
    pub fn apply_snapshot(&mut self, snapshot: &MeSnapshot) {
        let local = self.messages.split_off(self.baseline.min(self.messages.len()));
        self.messages = snapshot
            .thread_with(&self.friend)
            .map(|thread| thread.messages.iter().cloned().map(Message::from).collect())
            .unwrap_or_default();
        self.baseline = self.messages.len();
        self.messages.extend(local);
    }

    pub fn apply_profile(&mut self, profile: &PublicProfile) {
        self.friend_name = Some(profile.name.clone());
        self.friend_image = Some(profile.image());
    }

    pub fn apply(&mut self, event: &PushEvent) -> Vec<ThreadEffect> {
        match event {
            PushEvent::MessageNew(incoming)
                if incoming.from == self.friend && incoming.to == self.me =>
            {
                let time = incoming
                    .message
                    .time
                    .clone()
                    .unwrap_or_else(timestamp::now);
                self.messages.push(Message::received(
                    incoming.message.text.clone(),
                    incoming.message.image,
                    time,
                ));
                vec![ThreadEffect::ReadReceipt(self.read_receipt())]
            }
            PushEvent::ProfileUpdated(patch) if patch.username == self.friend => {
                self.friend_image = Some(ProfileImage::from_wire(&patch.profile));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Appends an outgoing message before the send call resolves.
    pub fn push_outgoing(&mut self, outgoing: &OutgoingMessage) -> Uuid {
        let message = Message::sent(
            outgoing.display_body().to_string(),
            outgoing.is_image(),
            timestamp::now(),
        );
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Flags an optimistic message whose send call failed. It stays in the feed.
    pub fn mark_failed(&mut self, id: Uuid) -> bool {
        match self.messages.iter_mut().find(|message| message.id == id) {
            Some(message) => {
                message.status = DeliveryStatus::Failed;
                true
            }
            None => false,
        }
    }

    /// Messages in timestamp order; unparseable timestamps come first.
    pub fn sorted(&self) -> Vec<&Message> {
        let mut sorted: Vec<&Message> = self.messages.iter().collect();
        sorted.sort_by_key(|message| timestamp::sort_key(&message.time));
        sorted
    }
}
