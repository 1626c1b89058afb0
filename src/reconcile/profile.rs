use crate::common::{MeSnapshot, ProfileImage, PushEvent, Topic};

pub const TOPICS: [Topic; 2] = [Topic::ProfileUpdated, Topic::FriendAdded];

/// The signed-in user's own profile page.
#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    username: Option<String>,
    image: Option<ProfileImage>,
    /// A push patch landed; the snapshot's picture is older.
    image_patched: bool,
    friends: Vec<String>,
    uploading: bool,
}

impl ProfileState {
    /// State for the signed-in `username`, before `/me` has answered.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn image(&self) -> Option<&ProfileImage> {
        self.image.as_ref()
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn apply_snapshot(&mut self, snapshot: &MeSnapshot) {
        self.username = Some(snapshot.username.clone());
        if !self.image_patched {
            self.image = Some(ProfileImage::from_wire(&snapshot.profile));
        }
        for thread in &snapshot.friends {
            if !self.friends.contains(&thread.name) {
                self.friends.push(thread.name.clone());
            }
        }
    }

    pub fn begin_upload(&mut self) {
        self.uploading = true;
    }

    /// Ends an upload; `None` when it failed and the old picture stays.
    pub fn finish_upload(&mut self, image: Option<ProfileImage>) {
        self.uploading = false;
        if let Some(image) = image {
            self.image = Some(image);
            self.image_patched = true;
        }
    }

    pub fn apply(&mut self, event: &PushEvent) {
        match event {
            PushEvent::ProfileUpdated(patch) if self.username() == Some(patch.username.as_str()) => {
                self.image = Some(ProfileImage::from_wire(&patch.profile));
                self.image_patched = true;
            }
            PushEvent::FriendAdded { friend_username } => {
                if !self.friends.contains(friend_username) {
                    self.friends.push(friend_username.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::events::ProfilePatch;

    fn snapshot() -> MeSnapshot {
        serde_json::from_value(serde_json::json!({
            "username": "alice",
            "profile": "",
            "friends": [{"name": "bob", "messages": []}],
            "requests": []
        }))
        .unwrap()
    }

    #[test]
    fn own_profile_patch_only() {
        let mut state = ProfileState::new("alice");
        state.apply_snapshot(&snapshot());
        assert_eq!(state.image(), Some(&ProfileImage::Absent));

        state.apply(&PushEvent::ProfileUpdated(ProfilePatch {
            username: "bob".into(),
            profile: "b".into(),
        }));
        assert_eq!(state.image(), Some(&ProfileImage::Absent));

        state.apply(&PushEvent::ProfileUpdated(ProfilePatch {
            username: "alice".into(),
            profile: "a".into(),
        }));
        assert_eq!(state.image(), Some(&ProfileImage::Encoded("a".into())));
    }

    #[test]
    fn own_patch_before_snapshot_is_kept() {
        let mut state = ProfileState::new("alice");
        state.apply(&PushEvent::ProfileUpdated(ProfilePatch {
            username: "alice".into(),
            profile: "new".into(),
        }));
        state.apply(&PushEvent::FriendAdded {
            friend_username: "carol".into(),
        });
        assert_eq!(state.image(), Some(&ProfileImage::Encoded("new".into())));

        state.apply_snapshot(&snapshot());
        assert_eq!(state.image(), Some(&ProfileImage::Encoded("new".into())));
        assert_eq!(state.username(), Some("alice"));
        assert_eq!(state.friend_count(), 2);
    }

    #[test]
    fn friend_count_ignores_repeats() {
        let mut state = ProfileState::new("alice");
        state.apply_snapshot(&snapshot());
        for name in ["carol", "carol", "bob"] {
            state.apply(&PushEvent::FriendAdded {
                friend_username: name.into(),
            });
        }
        assert_eq!(state.friend_count(), 2);
    }

    #[test]
    fn failed_upload_keeps_picture() {
        let mut state = ProfileState::new("alice");
        state.apply_snapshot(&snapshot());
        state.begin_upload();
        state.finish_upload(None);
        assert!(!state.is_uploading());
        assert_eq!(state.image(), Some(&ProfileImage::Absent));
    }
}
