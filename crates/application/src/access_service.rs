use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use vigia_core::{AppError, AppResult, CameraId, UserIdentity};
use vigia_domain::{AccessAction, AccessLogEntry, AccessRequest, AccessSession, SessionExpiry};

use crate::access_ports::{AccessLogRepository, Clock, SessionStore};


/// Policy applied when access is requested for a camera that already has an
/// active session.
///
/// The choice is explicit because the three behaviors have different audit
/// consequences; silently overwriting the prior session would lose its true
/// end time from the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenewalPolicy {
    /// Refuse the new request; the prior session stays untouched.
    Reject,
    /// Keep the prior session and reset its expiry to a fresh time-to-live.
    Extend,
    /// Close the prior session (recording its end) and grant a new one.
    #[default]
    ReplaceAndClosePrior,
}

/// How a session came to its end, recorded on the `end_access` entry.
#[derive(Debug, Clone, Copy)]
enum EndCause {
    Expiry,
    Replaced,
}

impl EndCause {
    fn as_str(self) -> &'static str {
        match self {
            Self::Expiry => "expiry",
            Self::Replaced => "replaced",
        }
    }
}

/// Application service owning the access session lifecycle.
///
/// Expiry is lazy: a session past its time-to-live is reaped on the next
/// read, not by a background sweep. Callers that stop polling leave the
/// stale session in place until some reader next touches that camera.
#[derive(Clone)]
pub struct AccessSessionService {
    store: Arc<dyn SessionStore>,
    access_log: Arc<dyn AccessLogRepository>,
    clock: Arc<dyn Clock>,
    renewal_policy: RenewalPolicy,
    // Serializes the find/check/remove/put sequences; the store ports are
    // individually atomic but the lifecycle decisions span several calls.
    lifecycle: Arc<Mutex<()>>,
}

impl AccessSessionService {
    /// Creates a service with the default renewal policy.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        access_log: Arc<dyn AccessLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            access_log,
            clock,
            renewal_policy: RenewalPolicy::default(),
            lifecycle: Arc::new(Mutex::new(())),
        }
    }

    /// Overrides the renewal policy.
    #[must_use]
    pub fn with_renewal_policy(mut self, renewal_policy: RenewalPolicy) -> Self {
        self.renewal_policy = renewal_policy;
        self
    }

    /// Grants a time-boxed access session for the request's camera.
    ///
    /// Writes one `view_live` audit entry for the grant. Audit writes are
    /// best-effort: a sink failure is logged and the grant proceeds.
    pub async fn request_access(
        &self,
        actor: &UserIdentity,
        request: AccessRequest,
        ip_address: String,
    ) -> AppResult<AccessSession> {
        let _lifecycle = self.lifecycle.lock().await;
        let now = self.clock.now();
        let camera_id = request.camera_id().clone();

        if let Some(existing) = self.store.find(&camera_id).await? {
            match existing.check_expiry(now) {
                SessionExpiry::Expired(expired) => {
                    // A leftover expired session never blocks a new grant.
                    self.close_session(expired, now, EndCause::Expiry).await?;
                }
                SessionExpiry::Active(active) => match self.renewal_policy {
                    RenewalPolicy::Reject => {
                        return Err(AppError::Conflict(format!(
                            "camera '{camera_id}' already has an active access session"
                        )));
                    }
                    RenewalPolicy::Extend => {
                        let renewed = active.renewed(now);
                        self.store.put(renewed.clone()).await?;
                        info!(
                            camera_id = %camera_id,
                            session_id = %renewed.session_id(),
                            expires_at = %renewed.expires_at(),
                            "extended access session"
                        );
                        return Ok(renewed);
                    }
                    RenewalPolicy::ReplaceAndClosePrior => {
                        self.close_session(active, now, EndCause::Replaced).await?;
                    }
                },
            }
        }

        let session = AccessSession::grant(request, actor, ip_address, now);
        self.store.put(session.clone()).await?;
        self.record_best_effort(AccessLogEntry::from_session(
            &session,
            AccessAction::ViewLive,
            now,
            None,
        ))
        .await;

        info!(
            camera_id = %camera_id,
            session_id = %session.session_id(),
            subject = session.subject(),
            expires_at = %session.expires_at(),
            "granted access session"
        );

        Ok(session)
    }

    /// Returns the active session for the camera, reaping it first if its
    /// time-to-live has passed.
    ///
    /// Reaping records one `end_access` entry whose duration is the full
    /// time-to-live, not the wall-clock time of this read.
    pub async fn active_session(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>> {
        let _lifecycle = self.lifecycle.lock().await;
        let now = self.clock.now();

        match self.store.find(camera_id).await? {
            None => Ok(None),
            Some(session) => match session.check_expiry(now) {
                SessionExpiry::Active(session) => Ok(Some(session)),
                SessionExpiry::Expired(session) => {
                    let ended_at = session.expires_at();
                    self.close_session(session, ended_at, EndCause::Expiry)
                        .await?;
                    Ok(None)
                }
            },
        }
    }

    /// Ends the camera's session if one exists; a missing session is a no-op.
    ///
    /// Writes one `end_access` entry with the elapsed duration in whole
    /// seconds. Idempotent: repeated calls write nothing further.
    pub async fn end_access(&self, camera_id: &CameraId) -> AppResult<()> {
        let _lifecycle = self.lifecycle.lock().await;
        let now = self.clock.now();

        let Some(session) = self.store.remove(camera_id).await? else {
            return Ok(());
        };

        let duration_seconds = session.elapsed_seconds(now);
        self.record_best_effort(
            AccessLogEntry::from_session(
                &session,
                AccessAction::EndAccess,
                now,
                Some(duration_seconds),
            )
            .with_detail("ended_by", "operator"),
        )
        .await;

        info!(
            camera_id = %camera_id,
            session_id = %session.session_id(),
            duration_seconds,
            "ended access session"
        );

        Ok(())
    }

    /// Records a snapshot capture against the camera's active session.
    ///
    /// Unlike grant/end bookkeeping, the audit write here is the operation
    /// itself, so sink failures propagate to the caller.
    pub async fn record_snapshot(&self, camera_id: &CameraId) -> AppResult<AccessLogEntry> {
        let session = self.active_session(camera_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "no active access session for camera '{camera_id}'"
            ))
        })?;

        let entry = AccessLogEntry::from_session(
            &session,
            AccessAction::CaptureSnapshot,
            self.clock.now(),
            None,
        );
        self.access_log.append_entry(entry.clone()).await?;

        Ok(entry)
    }

    /// Lists the camera's access log entries, newest first.
    pub async fn list_access_logs(&self, camera_id: &CameraId) -> AppResult<Vec<AccessLogEntry>> {
        self.access_log.list_for_camera(camera_id).await
    }

    /// Removes the session and records its end with the given cause.
    ///
    /// `ended_at` determines the recorded duration; for expiry reaps it is
    /// the session's expiry instant, so the duration equals the time-to-live.
    async fn close_session(
        &self,
        session: AccessSession,
        ended_at: DateTime<Utc>,
        cause: EndCause,
    ) -> AppResult<()> {
        // Only the caller that actually removes the session records its end;
        // losing the remove race must not write a second end_access entry.
        let Some(removed) = self.store.remove(session.camera_id()).await? else {
            return Ok(());
        };

        let duration_seconds = (ended_at - removed.started_at()).num_seconds();
        self.record_best_effort(
            AccessLogEntry::from_session(
                &removed,
                AccessAction::EndAccess,
                self.clock.now(),
                Some(duration_seconds),
            )
            .with_detail("ended_by", cause.as_str()),
        )
        .await;

        info!(
            camera_id = %removed.camera_id(),
            session_id = %removed.session_id(),
            duration_seconds,
            cause = cause.as_str(),
            "closed access session"
        );

        Ok(())
    }

    async fn record_best_effort(&self, entry: AccessLogEntry) {
        let camera_id = entry.camera_id.clone();
        if let Err(error) = self.access_log.append_entry(entry).await {
            warn!(
                camera_id = %camera_id,
                error = %error,
                "failed to append access log entry; continuing"
            );
        }
    }
}
