use async_trait::async_trait;
use tokio::sync::RwLock;

use vigia_application::AccessLogRepository;
use vigia_core::{AppResult, CameraId};
use vigia_domain::AccessLogEntry;

/// In-memory append-only access log.
///
/// Entries are only ever pushed; listing filters and orders a copy, so the
/// stored trail stays untouched.
#[derive(Debug, Default)]
pub struct InMemoryAccessLogRepository {
    entries: RwLock<Vec<AccessLogEntry>>,
}

impl InMemoryAccessLogRepository {
    /// Creates an empty access log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Returns the total number of recorded entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether the log holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AccessLogRepository for InMemoryAccessLogRepository {
    async fn append_entry(&self, entry: AccessLogEntry) -> AppResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_for_camera(&self, camera_id: &CameraId) -> AppResult<Vec<AccessLogEntry>> {
        let entries = self.entries.read().await;

        let mut listed: Vec<AccessLogEntry> = entries
            .iter()
            .filter(|entry| entry.camera_id == *camera_id)
            .cloned()
            .collect();
        listed.sort_by(|left, right| right.recorded_at.cmp(&left.recorded_at));

        Ok(listed)
    }
}
