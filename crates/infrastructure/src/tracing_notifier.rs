use async_trait::async_trait;
use tracing::{error, info, warn};

use vigia_application::{NotificationSeverity, Notifier};

/// Notifier that writes notifications to the process log.
///
/// Stands in for the console's toast surface in development and tests; a
/// real deployment would push these over the frontend's event channel.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a tracing-backed notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, severity: NotificationSeverity, message: &str) {
        match severity {
            NotificationSeverity::Error => {
                error!(severity = severity.as_str(), message, "notification");
            }
            NotificationSeverity::Warning => {
                warn!(severity = severity.as_str(), message, "notification");
            }
            NotificationSeverity::Success | NotificationSeverity::Info => {
                info!(severity = severity.as_str(), message, "notification");
            }
        }
    }
}
