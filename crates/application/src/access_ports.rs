use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vigia_core::{AppResult, CameraId};
use vigia_domain::{AccessLogEntry, AccessSession};

/// Port for holding the single active session per camera.
///
/// The "at most one active session per camera" invariant is keyed here:
/// `put` stores by camera id, so the service must close a prior session
/// before storing a replacement.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session for the camera, if any.
    async fn find(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>>;

    /// Stores the session under its camera id.
    async fn put(&self, session: AccessSession) -> AppResult<()>;

    /// Removes and returns the stored session for the camera, if any.
    async fn remove(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>>;
}

/// Port for the append-only access log sink.
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    /// Appends one access log entry. Entries are never mutated or deleted.
    async fn append_entry(&self, entry: AccessLogEntry) -> AppResult<()>;

    /// Lists entries for the camera, newest first.
    async fn list_for_camera(&self, camera_id: &CameraId) -> AppResult<Vec<AccessLogEntry>>;
}

/// Port for reading the current instant.
///
/// Injected so expiry and duration arithmetic stay deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
