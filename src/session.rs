use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::pipeline::{rate_limit::RateWindow, rotation::Rotation};

/// Everything the service remembers about one session.
///
/// Rate history, rotation state, and the set of model failures already
/// surfaced all live here, keyed strictly by session ID. Nothing in this
/// struct is ever shared across sessions.
#[derive(Debug, Default)]
pub struct SessionState {
    pub rate: RateWindow,
    pub rotation: Rotation,
    /// Scrubbed signatures of model failures this session has already been
    /// told about. Used to show each distinct failure notice once.
    pub surfaced_llm_errors: HashSet<String>,
}

/// Shared, session-keyed state store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with mutable access to one session's state, creating the
    /// session on first touch.
    ///
    /// The store lock is held only for the duration of the closure; keep
    /// mutations synchronous and do the async work (model calls, lookups)
    /// outside.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.inner.write().await;
        let state = sessions.entry(id).or_default();
        f(state)
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_persists_across_calls() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();

        store
            .with_session(id, |state| {
                state.rotation.set_candidates(vec!["A".to_string(), "B".to_string()]);
            })
            .await;

        let remaining = store.with_session(id, |state| state.rotation.remaining()).await;
        assert_eq!(remaining, 2);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store
            .with_session(first, |state| {
                state.rotation.set_candidates(vec!["A".to_string()]);
                state.surfaced_llm_errors.insert("timeout".to_string());
            })
            .await;

        let (remaining, errors) = store
            .with_session(second, |state| {
                (state.rotation.remaining(), state.surfaced_llm_errors.len())
            })
            .await;

        assert_eq!(remaining, 0);
        assert_eq!(errors, 0);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_first_touch_creates_default_state() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();

        let empty = store.with_session(id, |state| state.rotation.is_empty()).await;
        assert!(empty);
    }
}
