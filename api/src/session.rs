use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sales_assistant_core::session::Session;
use tokio::sync::Mutex;

struct StoredSession {
    session: Session,
    touched: Instant,
}

/// In-memory sessions keyed by the platform's session id.
///
/// Entries are dropped when a conversation ends and pruned once they have
/// been idle for longer than the configured ttl.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, StoredSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Session for `session_id`, or a fresh one.
    pub async fn load(&self, session_id: &str) -> Session {
        let mut sessions = self.inner.lock().await;
        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.touched.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned idle sessions");
        }
        sessions
            .get(session_id)
            .map(|stored| stored.session.clone())
            .unwrap_or_default()
    }

    pub async fn save(&self, session_id: &str, session: Session) {
        self.inner.lock().await.insert(
            session_id.to_string(),
            StoredSession {
                session,
                touched: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, session_id: &str) {
        self.inner.lock().await.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_and_loads_by_session_id() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut session = Session::default();
        session.set_user_id("005xx".to_string());
        store.save("s1", session.clone()).await;

        assert_eq!(store.load("s1").await, session);
        assert_eq!(store.load("s2").await, Session::default());
    }

    #[tokio::test]
    async fn remove_forgets_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut session = Session::default();
        session.remember_keywords("deal ".to_string());
        store.save("s1", session).await;
        store.remove("s1").await;

        assert_eq!(store.load("s1").await, Session::default());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::ZERO);
        let mut session = Session::default();
        session.set_user_id("005xx".to_string());
        store.save("s1", session).await;

        assert_eq!(store.load("s1").await, Session::default());
    }
}
