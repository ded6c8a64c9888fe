//! Vigia console API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigia_application::{AccessSessionService, RenewalPolicy};
use vigia_core::AppError;
use vigia_infrastructure::{
    InMemoryAccessLogRepository, InMemorySessionStore, SystemClock, TracingNotifier,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let renewal_policy = renewal_policy_from_env()?;

    let session_store = Arc::new(InMemorySessionStore::new());
    let access_log = Arc::new(InMemoryAccessLogRepository::new());
    let clock = Arc::new(SystemClock::new());

    let access_service = AccessSessionService::new(session_store, access_log, clock.clone())
        .with_renewal_policy(renewal_policy);

    let app_state = AppState {
        access_service,
        notifier: Arc::new(TracingNotifier::new()),
        clock,
        frontend_url: frontend_url.clone(),
    };

    let access_routes = Router::new()
        .route(
            "/api/cameras/{camera_id}/access",
            post(handlers::access::request_access_handler)
                .get(handlers::access::active_session_handler)
                .delete(handlers::access::end_access_handler),
        )
        .route(
            "/api/cameras/{camera_id}/access/snapshot",
            post(handlers::access::record_snapshot_handler),
        )
        .route(
            "/api/cameras/{camera_id}/access-logs",
            get(handlers::access::list_access_logs_handler),
        )
        .route_layer(from_fn(middleware::resolve_identity));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::SUBJECT_HEADER),
            HeaderName::from_static(middleware::NAME_HEADER),
            HeaderName::from_static(middleware::ROLE_HEADER),
        ]);

    let app = Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .merge(access_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "vigia-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn renewal_policy_from_env() -> Result<RenewalPolicy, AppError> {
    let value = env::var("ACCESS_RENEWAL_POLICY").unwrap_or_else(|_| "replace".to_owned());

    match value.trim().to_ascii_lowercase().as_str() {
        "replace" => Ok(RenewalPolicy::ReplaceAndClosePrior),
        "extend" => Ok(RenewalPolicy::Extend),
        "reject" => Ok(RenewalPolicy::Reject),
        other => Err(AppError::Validation(format!(
            "ACCESS_RENEWAL_POLICY must be 'replace', 'extend' or 'reject', got '{other}'"
        ))),
    }
}
