use std::sync::Arc;

use vigia_application::{AccessSessionService, Clock, Notifier};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessSessionService,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub frontend_url: String,
}
