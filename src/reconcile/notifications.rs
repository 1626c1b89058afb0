use std::collections::HashSet;

use crate::common::{PushEvent, Topic};

pub const TOPICS: [Topic; 1] = [Topic::RequestNew];

/// Pending friend requests, newest first, one entry per requester.
#[derive(Debug, Clone, Default)]
pub struct NotificationsState {
    requests: Vec<String>,
}

impl NotificationsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn contains(&self, requester: &str) -> bool {
        self.requests.iter().any(|entry| entry == requester)
    }

    pub fn apply_snapshot(&mut self, requests: Vec<String>) {
        let mut seen = HashSet::new();
        self.requests = requests
            .into_iter()
            .filter(|requester| seen.insert(requester.clone()))
            .collect();
    }

    pub fn apply(&mut self, event: &PushEvent) {
        if let PushEvent::RequestNew { from } = event {
            if !self.contains(from) {
                self.requests.insert(0, from.clone());
            }
        }
    }

    /// Drops a request once the accept/reject call succeeded.
    pub fn resolve(&mut self, requester: &str) -> bool {
        match self.requests.iter().position(|entry| entry == requester) {
            Some(index) => {
                self.requests.remove(index);
                true
            }
            None => false,
        }
    }
}
