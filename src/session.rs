use crate::services::quiz_engine::QuizSession;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "learnpal_session";

/// Everything the server remembers about one logged-in browser session:
/// the user identity plus the transient quiz/IQ scratchpads. Discarded on
/// logout or after the inactivity TTL elapses.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub user_id: Uuid,
    last_seen: Instant,
    pub quiz: Option<QuizSession>,
    pub iq_questions: Vec<String>,
    pub iq_answers: Vec<String>,
}

impl SessionEntry {
    fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            last_seen: Instant::now(),
            quiz: None,
            iq_questions: Vec::new(),
            iq_answers: Vec::new(),
        }
    }
}

/// In-memory server-side session registry with a sliding inactivity expiry.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a new session for the user and returns its cookie token.
    pub fn create(&self, user_id: Uuid) -> String {
        let token = new_session_token();
        let mut guard = self.inner.lock().expect("session store mutex poisoned");
        guard.insert(token.clone(), SessionEntry::new(user_id));
        token
    }

    /// Resolves a token to the session's user, touching the inactivity
    /// timer. Expired sessions are dropped on access.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut guard = self.inner.lock().expect("session store mutex poisoned");
        match guard.get_mut(token) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                entry.last_seen = Instant::now();
                Some(entry.user_id)
            }
            Some(_) => {
                guard.remove(token);
                None
            }
            None => None,
        }
    }

    /// Runs `f` against the live session entry, touching the inactivity
    /// timer. Returns `None` for unknown or expired tokens.
    pub fn with_entry<R>(&self, token: &str, f: impl FnOnce(&mut SessionEntry) -> R) -> Option<R> {
        let mut guard = self.inner.lock().expect("session store mutex poisoned");
        match guard.get_mut(token) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                entry.last_seen = Instant::now();
                Some(f(entry))
            }
            Some(_) => {
                guard.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn quiz(&self, token: &str) -> Option<QuizSession> {
        self.with_entry(token, |entry| entry.quiz.clone()).flatten()
    }

    pub fn set_quiz(&self, token: &str, quiz: QuizSession) -> bool {
        self.with_entry(token, |entry| entry.quiz = Some(quiz))
            .is_some()
    }

    pub fn clear_quiz(&self, token: &str) {
        self.with_entry(token, |entry| entry.quiz = None);
    }

    pub fn remove(&self, token: &str) {
        let mut guard = self.inner.lock().expect("session store mutex poisoned");
        guard.remove(token);
    }

    /// Drops all sessions past the inactivity TTL, returning how many.
    pub fn purge_expired(&self) -> usize {
        let mut guard = self.inner.lock().expect("session store mutex poisoned");
        let before = guard.len();
        guard.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("session store mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn new_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_returns_user_for_live_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let token = store.create(user);
        assert_eq!(store.resolve(&token), Some(user));
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert_eq!(store.resolve("nope"), None);
    }

    #[test]
    fn expired_session_is_dropped_on_access() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create(Uuid::new_v4());
        assert_eq!(store.resolve(&token), None);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_ends_the_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(Uuid::new_v4());
        store.remove(&token);
        assert_eq!(store.resolve(&token), None);
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let store = SessionStore::new(Duration::ZERO);
        store.create(Uuid::new_v4());
        store.create(Uuid::new_v4());
        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(Uuid::new_v4());
        let b = store.create(Uuid::new_v4());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
