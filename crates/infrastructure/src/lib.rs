//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_log;
mod in_memory_session_store;
mod system_clock;
mod tracing_notifier;

pub use in_memory_access_log::InMemoryAccessLogRepository;
pub use in_memory_session_store::InMemorySessionStore;
pub use system_clock::SystemClock;
pub use tracing_notifier::TracingNotifier;
