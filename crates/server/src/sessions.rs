use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// One signed-in worker. The visit counter lives here and dies with the
/// session.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: Uuid,
    pub worker_id: Uuid,
    pub num_visits: u64,
    pub created_at: DateTime<Utc>,
}

/// In-memory token store; tokens are opaque UUIDs handed out at login.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub async fn create(&self, worker_id: Uuid) -> Session {
        let session = Session {
            token: Uuid::new_v4(),
            worker_id,
            num_visits: 0,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .insert(session.token, session.clone());
        session
    }

    pub async fn get(&self, token: Uuid) -> Option<Session> {
        self.inner.read().await.get(&token).cloned()
    }

    pub async fn revoke(&self, token: Uuid) -> bool {
        self.inner.write().await.remove(&token).is_some()
    }

    /// Invalidate every session of a worker, e.g. after the worker row is
    /// deleted.
    pub async fn revoke_for_worker(&self, worker_id: Uuid) {
        self.inner
            .write()
            .await
            .retain(|_, session| session.worker_id != worker_id);
    }

    /// Bump and return the session's visit counter.
    pub async fn record_visit(&self, token: Uuid) -> Option<u64> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&token)?;
        session.num_visits += 1;
        Some(session.num_visits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn visit_counter_is_per_session() {
        let store = SessionStore::default();
        let worker_id = Uuid::new_v4();
        let first = store.create(worker_id).await;
        let second = store.create(worker_id).await;

        assert_eq!(store.record_visit(first.token).await, Some(1));
        assert_eq!(store.record_visit(first.token).await, Some(2));
        assert_eq!(store.record_visit(second.token).await, Some(1));
    }

    #[tokio::test]
    async fn revoke_for_worker_drops_all_their_sessions() {
        let store = SessionStore::default();
        let worker_id = Uuid::new_v4();
        let session = store.create(worker_id).await;
        let other = store.create(Uuid::new_v4()).await;

        store.revoke_for_worker(worker_id).await;
        assert!(store.get(session.token).await.is_none());
        assert!(store.get(other.token).await.is_some());
    }
}
