use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use vigia_application::NotificationSeverity;
use vigia_core::{AppError, CameraId, TenantId, UserIdentity};
use vigia_domain::{AccessReason, AccessRequest};

use crate::dto::{AccessLogEntryResponse, AccessSessionResponse, RequestAccessRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn request_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<RequestAccessRequest>,
) -> ApiResult<(StatusCode, Json<AccessSessionResponse>)> {
    let camera_id = CameraId::new(camera_id)?;
    let reason = AccessReason::from_transport(payload.reason.as_str())?;
    let tenant_id = parse_tenant_id(payload.tenant_id.as_str())?;

    let request = AccessRequest::new(
        camera_id,
        payload.camera_name,
        tenant_id,
        payload.tenant_name,
        reason,
        payload.description,
        payload.ticket_number,
    )?;

    let ip_address = client_ip(&headers, peer);
    let session = state.access_service.request_access(&user, request, ip_address).await?;

    state
        .notifier
        .notify(
            NotificationSeverity::Success,
            &format!(
                "Temporary access to {} granted until {}",
                session.camera_name(),
                session.expires_at().format("%H:%M"),
            ),
        )
        .await;

    let now = state.clock.now();
    Ok((
        StatusCode::CREATED,
        Json(AccessSessionResponse::from_session(&session, now)),
    ))
}

pub async fn active_session_handler(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<Json<AccessSessionResponse>> {
    let camera_id = CameraId::new(camera_id)?;
    let session = state
        .access_service
        .active_session(&camera_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("no active access session for camera '{camera_id}'"))
        })?;

    let now = state.clock.now();
    Ok(Json(AccessSessionResponse::from_session(&session, now)))
}

pub async fn end_access_handler(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<StatusCode> {
    let camera_id = CameraId::new(camera_id)?;
    state.access_service.end_access(&camera_id).await?;

    state
        .notifier
        .notify(NotificationSeverity::Info, "Camera access ended")
        .await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_snapshot_handler(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<(StatusCode, Json<AccessLogEntryResponse>)> {
    let camera_id = CameraId::new(camera_id)?;
    let entry = state.access_service.record_snapshot(&camera_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessLogEntryResponse::from(entry)),
    ))
}

pub async fn list_access_logs_handler(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<Json<Vec<AccessLogEntryResponse>>> {
    let camera_id = CameraId::new(camera_id)?;
    let entries = state
        .access_service
        .list_access_logs(&camera_id)
        .await?
        .into_iter()
        .map(AccessLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

fn parse_tenant_id(value: &str) -> Result<TenantId, AppError> {
    uuid::Uuid::parse_str(value)
        .map(TenantId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid tenant id: {error}")))
}

/// Prefers the proxy-reported address, falling back to the socket peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| peer.ip().to_string())
}
