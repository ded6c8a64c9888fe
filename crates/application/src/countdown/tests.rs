use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use vigia_core::{AppResult, CameraId, TenantId, UserIdentity};
use vigia_domain::{
    ACCESS_SESSION_TTL_SECONDS, AccessAction, AccessLogEntry, AccessReason, AccessRequest,
    AccessSession,
};

use crate::access_ports::{AccessLogRepository, Clock, SessionStore};
use crate::access_service::AccessSessionService;

use super::{
    CountdownConfig, CountdownEvent, CountdownMonitor, CountdownObserver, CountdownState,
    format_remaining,
};

#[test]
fn formats_minutes_and_zero_padded_seconds() {
    assert_eq!(format_remaining(125_000), "2:05");
    assert_eq!(format_remaining(5_000), "0:05");
    assert_eq!(format_remaining(1_800_000), "30:00");
    assert_eq!(format_remaining(3_900_000), "65:00");
}

#[test]
fn formats_negative_remaining_as_zero() {
    assert_eq!(format_remaining(0), "0:00");
    assert_eq!(format_remaining(-4_000), "0:00");
}

#[test]
fn warning_fires_exactly_once_at_the_threshold() {
    let mut state = CountdownState::new();

    let before = state.observe(5 * 60 * 1000 + 1_000);
    assert!(matches!(
        before,
        CountdownEvent::Running { warning_due: false, .. }
    ));

    let crossing = state.observe(4 * 60 * 1000 + 59 * 1000);
    assert!(matches!(
        crossing,
        CountdownEvent::Running { warning_due: true, .. }
    ));

    let after = state.observe(4 * 60 * 1000 + 58 * 1000);
    assert!(matches!(
        after,
        CountdownEvent::Running { warning_due: false, .. }
    ));
}

#[test]
fn warning_survives_a_skipped_tick_past_the_boundary() {
    let mut state = CountdownState::new();

    // Jump straight from well above to well below the threshold, as a
    // backgrounded tab would.
    let before = state.observe(8 * 60 * 1000);
    assert!(matches!(
        before,
        CountdownEvent::Running { warning_due: false, .. }
    ));

    let jumped = state.observe(2 * 60 * 1000);
    assert!(matches!(
        jumped,
        CountdownEvent::Running { warning_due: true, .. }
    ));
}

#[test]
fn zero_remaining_is_expired() {
    let mut state = CountdownState::new();
    assert_eq!(state.observe(0), CountdownEvent::Expired);
    assert_eq!(state.observe(-1_000), CountdownEvent::Expired);
}

struct FakeSessionStore {
    sessions: Mutex<HashMap<CameraId, AccessSession>>,
}

impl FakeSessionStore {
    fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn find(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>> {
        Ok(self.sessions.lock().await.get(camera_id).cloned())
    }

    async fn put(&self, session: AccessSession) -> AppResult<()> {
        self.sessions
            .lock()
            .await
            .insert(session.camera_id().clone(), session);
        Ok(())
    }

    async fn remove(&self, camera_id: &CameraId) -> AppResult<Option<AccessSession>> {
        Ok(self.sessions.lock().await.remove(camera_id))
    }
}

struct FakeAccessLog {
    entries: Mutex<Vec<AccessLogEntry>>,
}

impl FakeAccessLog {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    async fn entries(&self) -> Vec<AccessLogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AccessLogRepository for FakeAccessLog {
    async fn append_entry(&self, entry: AccessLogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list_for_camera(&self, camera_id: &CameraId) -> AppResult<Vec<AccessLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.camera_id == *camera_id)
            .cloned()
            .collect())
    }
}

/// Clock that follows tokio's (pausable) time from a fixed base instant.
struct TickingClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl TickingClock {
    fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + Duration::from_std(self.origin.elapsed()).unwrap_or_default()
    }
}

#[derive(Default)]
struct RecordingObserver {
    ticks: std::sync::Mutex<Vec<String>>,
    warnings: std::sync::Mutex<Vec<String>>,
    expired: AtomicUsize,
}

impl RecordingObserver {
    fn ticks(&self) -> Vec<String> {
        self.ticks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn expired_count(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }
}

impl CountdownObserver for RecordingObserver {
    fn remaining_updated(&self, display: &str) {
        self.ticks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(display.to_owned());
    }

    fn expiry_warning(&self, display: &str) {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(display.to_owned());
    }

    fn expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

fn camera() -> CameraId {
    CameraId::new("cam-1").unwrap_or_else(|_| unreachable!("literal id is valid"))
}

fn session_started_at(started_at: DateTime<Utc>) -> AccessSession {
    let request = AccessRequest::new(
        camera(),
        "Entrance lobby",
        TenantId::new(),
        "Acme Logistics",
        AccessReason::TechnicalSupport,
        "Investigating reported offline camera on site A.",
        None,
    )
    .unwrap_or_else(|_| unreachable!("fixture request is valid"));

    AccessSession::grant(
        request,
        &UserIdentity::new("op-7", "Alice Operator", "technician"),
        "10.0.0.9",
        started_at,
    )
}

#[allow(clippy::type_complexity)]
async fn build_monitor_fixture(
    remaining_seconds: i64,
) -> (
    AccessSessionService,
    Arc<FakeSessionStore>,
    Arc<FakeAccessLog>,
    Arc<TickingClock>,
) {
    let base = Utc::now();
    let store = Arc::new(FakeSessionStore::new());
    let access_log = Arc::new(FakeAccessLog::new());
    let clock = Arc::new(TickingClock::starting_at(base));
    let service = AccessSessionService::new(store.clone(), access_log.clone(), clock.clone());

    let session = session_started_at(
        base - (vigia_domain::access_session_ttl() - Duration::seconds(remaining_seconds)),
    );
    let seeded = store.put(session).await;
    assert!(seeded.is_ok());

    (service, store, access_log, clock)
}

#[tokio::test(start_paused = true)]
async fn monitor_warns_once_then_expires_and_ends_the_session() {
    let (service, store, access_log, clock) = build_monitor_fixture(5).await;

    let observer = Arc::new(RecordingObserver::default());
    let monitor = CountdownMonitor::start(
        service,
        camera(),
        CountdownConfig {
            tick_interval: std::time::Duration::from_secs(1),
            existence_poll_interval: std::time::Duration::from_secs(60),
            warning_threshold_ms: 3_000,
        },
        clock,
        observer.clone(),
    );

    tokio::time::sleep(std::time::Duration::from_secs(8)).await;

    assert!(monitor.is_finished());
    assert_eq!(observer.expired_count(), 1);
    assert_eq!(observer.warnings(), vec!["0:03".to_owned()]);
    assert_eq!(observer.ticks(), vec!["0:04", "0:03", "0:02", "0:01"]);

    assert_eq!(store.len().await, 0);
    let entries = access_log.entries().await;
    let end_entries: Vec<_> = entries
        .iter()
        .filter(|entry| entry.action == AccessAction::EndAccess)
        .collect();
    assert_eq!(end_entries.len(), 1);
    // The monitor reaps through the expiry path: the end is attributed to
    // expiry and its duration is the full time-to-live.
    assert_eq!(
        end_entries[0].duration_seconds,
        Some(ACCESS_SESSION_TTL_SECONDS)
    );
    assert_eq!(
        end_entries[0].details.get("ended_by").map(String::as_str),
        Some("expiry")
    );
}

#[tokio::test(start_paused = true)]
async fn monitor_reports_expiry_immediately_without_a_session() {
    let store = Arc::new(FakeSessionStore::new());
    let access_log = Arc::new(FakeAccessLog::new());
    let clock = Arc::new(TickingClock::starting_at(Utc::now()));
    let service = AccessSessionService::new(store, access_log, clock.clone());

    let observer = Arc::new(RecordingObserver::default());
    let monitor = CountdownMonitor::start(
        service,
        camera(),
        CountdownConfig::default(),
        clock,
        observer.clone(),
    );

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert!(monitor.is_finished());
    assert_eq!(observer.expired_count(), 1);
    assert!(observer.ticks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn monitor_notices_a_remotely_ended_session_on_the_existence_poll() {
    let (service, _store, _access_log, clock) = build_monitor_fixture(1_700).await;

    let observer = Arc::new(RecordingObserver::default());
    let monitor = CountdownMonitor::start(
        service.clone(),
        camera(),
        CountdownConfig {
            tick_interval: std::time::Duration::from_secs(1),
            existence_poll_interval: std::time::Duration::from_secs(2),
            warning_threshold_ms: 3_000,
        },
        clock,
        observer.clone(),
    );

    tokio::time::sleep(std::time::Duration::from_millis(1_500)).await;
    let ended = service.end_access(&camera()).await;
    assert!(ended.is_ok());

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    assert!(monitor.is_finished());
    assert_eq!(observer.expired_count(), 1);
    assert!(observer.warnings().is_empty());
    assert!(!observer.ticks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_running_monitor() {
    let (service, _store, _access_log, clock) = build_monitor_fixture(1_700).await;

    let observer = Arc::new(RecordingObserver::default());
    let monitor = CountdownMonitor::start(
        service,
        camera(),
        CountdownConfig::default(),
        clock,
        observer.clone(),
    );

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    monitor.stop();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert!(monitor.is_finished());
    assert_eq!(observer.expired_count(), 0);
}
