//! User search: debounced queries, friend-aware results.

use std::collections::HashSet;

use crate::common::{PushEvent, Topic, UserEntry};

pub const TOPICS: [Topic; 1] = [Topic::FriendAdded];

/// A query that should be sent once the debounce delay has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    generation: u64,
    results: Vec<UserEntry>,
    friends: HashSet<String>,
    requested: HashSet<String>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[UserEntry] {
        &self.results
    }

    pub fn is_friend(&self, username: &str) -> bool {
        self.friends.contains(username)
    }

    pub fn was_requested(&self, username: &str) -> bool {
        self.requested.contains(username)
    }

    /// Seeds the friend set from `/me`.
    pub fn apply_friends<I: IntoIterator<Item = String>>(&mut self, friends: I) {
        self.friends.extend(friends);
    }

    /// Records a new query text. Returns the request to issue, if any.
    ///
    /// Every call supersedes results of earlier generations; a blank query
    /// clears the results without a request.
    pub fn set_query(&mut self, query: &str) -> Option<SearchRequest> {
        self.query = query.to_string();
        self.generation += 1;

        if query.trim().is_empty() {
            self.results.clear();
            return None;
        }
        Some(SearchRequest {
            query: query.trim().to_string(),
            generation: self.generation,
        })
    }

    /// Applies results for `generation`; stale generations are dropped.
    pub fn apply_results(&mut self, generation: u64, results: Vec<UserEntry>) -> bool {
        if generation != self.generation {
            log::debug!("Dropping stale search results (generation {generation})");
            return false;
        }
        let mut seen = HashSet::new();
        self.results = results
            .into_iter()
            .filter(|user| seen.insert(user.username.clone()))
            .collect();
        true
    }

    pub fn apply(&mut self, event: &PushEvent) {
        if let PushEvent::FriendAdded { friend_username } = event {
            self.friends.insert(friend_username.clone());
        }
    }

    /// Remembers a request that the server accepted.
    pub fn mark_requested(&mut self, username: &str) {
        self.requested.insert(username.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserEntry {
        UserEntry {
            username: name.into(),
            email: None,
            profile: String::new(),
        }
    }

    #[test]
    fn blank_query_clears_without_request() {
        let mut state = SearchState::new();
        let request = state.set_query("bo").unwrap();
        state.apply_results(request.generation, vec![user("bob")]);
        assert_eq!(state.results().len(), 1);

        assert_eq!(state.set_query("   "), None);
        assert!(state.results().is_empty());
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut state = SearchState::new();
        let first = state.set_query("b").unwrap();
        let second = state.set_query("bo").unwrap();

        assert!(state.apply_results(second.generation, vec![user("bob")]));
        assert!(!state.apply_results(first.generation, vec![user("bill"), user("bob")]));
        assert_eq!(state.results(), &[user("bob")]);
    }

    #[test]
    fn results_have_unique_usernames() {
        let mut state = SearchState::new();
        let request = state.set_query("b").unwrap();
        state.apply_results(request.generation, vec![user("bob"), user("bob"), user("bea")]);
        assert_eq!(state.results().len(), 2);
    }

    #[test]
    fn friend_added_is_idempotent() {
        let mut state = SearchState::new();
        let event = PushEvent::FriendAdded {
            friend_username: "bob".into(),
        };
        state.apply(&event);
        state.apply(&event);
        assert!(state.is_friend("bob"));
        assert!(!state.is_friend("bea"));
    }
}
