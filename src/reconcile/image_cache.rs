use std::collections::HashMap;

use crate::common::ProfileImage;

/// Cache revision observed when an out-of-band fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revision(u64);

#[derive(Debug, Clone)]
struct Entry {
    image: ProfileImage,
    written_at: u64,
}

/// Username -> profile image, with an explicit marker for "no picture".
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means the user is unknown; `Some(ProfileImage::Absent)` means
    /// the user is known to have no picture.
    pub fn get(&self, username: &str) -> Option<&ProfileImage> {
        self.entries.get(username).map(|entry| &entry.image)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks the start of a fetch whose result will be applied later.
    pub fn revision(&self) -> Revision {
        Revision(self.clock)
    }

    /// Unconditional write, used for push events.
    pub fn patch(&mut self, username: &str, image: ProfileImage) {
        self.clock += 1;
        self.entries.insert(
            username.to_string(),
            Entry {
                image,
                written_at: self.clock,
            },
        );
    }

    /// Applies the result of a fetch started at `since`.
    ///
    /// Skipped when the key was written after the fetch started. Returns
    /// whether the entry was written.
    pub fn apply_fetched(&mut self, username: &str, image: ProfileImage, since: Revision) -> bool {
        if let Some(entry) = self.entries.get(username) {
            if entry.written_at > since.0 {
                log::debug!("Discarding stale profile image for {username}");
                return false;
            }
        }
        self.patch(username, image);
        true
    }

    /// Applies a bulk listing fetched at `since`, entry by entry.
    pub fn apply_listing<I>(&mut self, listing: I, since: Revision) -> usize
    where
        I: IntoIterator<Item = (String, ProfileImage)>,
    {
        let mut written = 0;
        for (username, image) in listing {
            if self.apply_fetched(&username, image, since) {
                written += 1;
            }
        }
        written
    }
}
