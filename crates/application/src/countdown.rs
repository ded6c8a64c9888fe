//! Countdown presentation for an active access session.
//!
//! Two cadences drive the viewing UI: a fast local tick that re-renders the
//! remaining time every second from the cached expiry instant, and a slower
//! existence poll that re-reads the session so a remotely-ended grant is
//! noticed within a few seconds.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use vigia_core::CameraId;

use crate::access_ports::Clock;
use crate::access_service::AccessSessionService;

#[cfg(test)]
mod tests;

/// Remaining time at which the pre-expiry warning fires, in milliseconds.
pub const WARNING_THRESHOLD_MS: i64 = 5 * 60 * 1000;

/// Formats remaining milliseconds as `M:SS`.
///
/// Minutes are un-padded, seconds zero-padded to two digits; negative values
/// clamp to `0:00`.
#[must_use]
pub fn format_remaining(remaining_ms: i64) -> String {
    let total_seconds = remaining_ms.max(0) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// One observed countdown step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The session is still running.
    Running {
        /// Remaining time formatted as `M:SS`.
        display: String,
        /// True exactly once, on the tick that crosses the warning threshold.
        warning_due: bool,
    },
    /// The remaining time has reached zero.
    Expired,
}

/// Pure per-tick countdown state.
///
/// The warning is a threshold crossing guarded by a fired-once flag, so a
/// skipped tick (a backgrounded tab, a stalled runtime) cannot lose it the
/// way an exact `4:59` equality check would.
#[derive(Debug)]
pub struct CountdownState {
    warning_threshold_ms: i64,
    warning_fired: bool,
}

impl CountdownState {
    /// Creates state with the standard 5-minute warning threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(WARNING_THRESHOLD_MS)
    }

    /// Creates state with a custom warning threshold.
    #[must_use]
    pub fn with_threshold(warning_threshold_ms: i64) -> Self {
        Self {
            warning_threshold_ms,
            warning_fired: false,
        }
    }

    /// Classifies one tick given the remaining milliseconds.
    pub fn observe(&mut self, remaining_ms: i64) -> CountdownEvent {
        if remaining_ms <= 0 {
            return CountdownEvent::Expired;
        }

        let display = format_remaining(remaining_ms);
        let warning_due = remaining_ms <= self.warning_threshold_ms && !self.warning_fired;
        if warning_due {
            self.warning_fired = true;
        }

        CountdownEvent::Running {
            display,
            warning_due,
        }
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cadences and threshold for a countdown task.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Local re-render cadence for the digits.
    pub tick_interval: Duration,
    /// Cadence for re-reading the session from the lifecycle service.
    pub existence_poll_interval: Duration,
    /// Remaining milliseconds at which the warning fires.
    pub warning_threshold_ms: i64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            existence_poll_interval: Duration::from_secs(5),
            warning_threshold_ms: WARNING_THRESHOLD_MS,
        }
    }
}

/// Observer port for countdown output.
///
/// Implementations push to whatever surface renders the viewing context
/// (digits, toasts, forced redirect on expiry).
pub trait CountdownObserver: Send + Sync {
    /// Called every running tick with the formatted remaining time.
    fn remaining_updated(&self, display: &str);

    /// Called exactly once when remaining time crosses the warning threshold.
    fn expiry_warning(&self, display: &str);

    /// Called once when the session is over, then the task stops.
    fn expired(&self);
}

/// Cancellable repeating countdown task for one camera's session.
///
/// Stops on expiry, on remote session end, on [`CountdownMonitor::stop`],
/// and on drop, so an abandoned viewing context cannot leak its timer.
pub struct CountdownMonitor {
    handle: JoinHandle<()>,
}

impl CountdownMonitor {
    /// Spawns the countdown task for the camera's current session.
    ///
    /// If no session is active at start, the observer sees an immediate
    /// expiry and the task finishes.
    #[must_use]
    pub fn start(
        service: AccessSessionService,
        camera_id: CameraId,
        config: CountdownConfig,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn CountdownObserver>,
    ) -> Self {
        let handle = tokio::spawn(run_countdown(service, camera_id, config, clock, observer));
        Self { handle }
    }

    /// Cancels the countdown task.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Returns whether the task has finished or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_countdown(
    service: AccessSessionService,
    camera_id: CameraId,
    config: CountdownConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn CountdownObserver>,
) {
    let mut expires_at = match service.active_session(&camera_id).await {
        Ok(Some(session)) => session.expires_at(),
        Ok(None) => {
            observer.expired();
            return;
        }
        Err(error) => {
            warn!(camera_id = %camera_id, error = %error, "countdown could not read session");
            observer.expired();
            return;
        }
    };

    let mut state = CountdownState::with_threshold(config.warning_threshold_ms);
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Consume the immediate first tick so the loop runs on the cadence.
    ticker.tick().await;
    let mut last_poll = tokio::time::Instant::now();

    loop {
        ticker.tick().await;

        if last_poll.elapsed() >= config.existence_poll_interval {
            last_poll = tokio::time::Instant::now();
            match service.active_session(&camera_id).await {
                Ok(Some(session)) => expires_at = session.expires_at(),
                Ok(None) => {
                    observer.expired();
                    return;
                }
                Err(error) => {
                    // Transient read failure: keep counting from the cached
                    // expiry rather than tearing the view down.
                    warn!(camera_id = %camera_id, error = %error, "existence poll failed");
                }
            }
        }

        let remaining_ms = (expires_at - clock.now()).num_milliseconds();
        match state.observe(remaining_ms) {
            CountdownEvent::Running {
                display,
                warning_due,
            } => {
                observer.remaining_updated(&display);
                if warning_due {
                    observer.expiry_warning(&display);
                }
            }
            CountdownEvent::Expired => {
                // Reap through the lazy-expiry read so the trail records an
                // expiry end with the full time-to-live as its duration.
                if let Err(error) = service.active_session(&camera_id).await {
                    warn!(camera_id = %camera_id, error = %error, "failed to reap expired session");
                }
                observer.expired();
                return;
            }
        }
    }
}
