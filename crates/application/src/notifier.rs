use async_trait::async_trait;

/// Severity levels understood by the console's toast surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSeverity {
    /// Operation completed.
    Success,
    /// Attention required, not an error.
    Warning,
    /// Operation failed.
    Error,
    /// Neutral information.
    Info,
}

impl NotificationSeverity {
    /// Returns a stable label for this severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// Port for pushing user-facing notifications.
///
/// Delivery is fire-and-forget: implementations absorb their own failures
/// so a broken notification surface never blocks an access operation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn notify(&self, severity: NotificationSeverity, message: &str);
}
