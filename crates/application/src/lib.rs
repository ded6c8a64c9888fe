//! Application services and ports for the temporary access workflow.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod countdown;
mod notifier;

pub use access_ports::{AccessLogRepository, Clock, SessionStore};
pub use access_service::{AccessSessionService, RenewalPolicy};
pub use countdown::{
    CountdownConfig, CountdownEvent, CountdownMonitor, CountdownObserver, CountdownState,
    WARNING_THRESHOLD_MS, format_remaining,
};
pub use notifier::{NotificationSeverity, Notifier};
