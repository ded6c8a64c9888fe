use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vigia_application::SessionStore;
use vigia_core::{AppResult, CameraId};
use vigia_domain::AccessSession;

/// In-memory session store implementation.
///
/// Process-local: sessions do not survive a restart and are not shared
/// across instances. Acceptable for the console backend this slice serves.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<CameraId, AccessSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>> {
        Ok(self.sessions.read().await.get(camera_id).cloned())
    }

    async fn put(&self, session: AccessSession) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.camera_id().clone(), session);
        Ok(())
    }

    async fn remove(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>> {
        Ok(self.sessions.write().await.remove(camera_id))
    }
}
