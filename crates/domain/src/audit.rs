//! Append-only audit records for camera access activity.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigia_core::{AppError, CameraId, TenantId};

use crate::access::{AccessReason, AccessSession};

/// Resource type label recorded on every access log entry.
pub const RESOURCE_TYPE_CAMERA: &str = "camera";

/// Stable audit actions emitted by the access lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    /// Emitted when a session is granted and live viewing begins.
    ViewLive,
    /// Emitted when the operator captures a still frame.
    CaptureSnapshot,
    /// Emitted when a session ends, explicitly or through expiry.
    EndAccess,
}

impl AccessAction {
    /// Returns a stable wire value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewLive => "view_live",
            Self::CaptureSnapshot => "capture_snapshot",
            Self::EndAccess => "end_access",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccessAction] = &[
            AccessAction::ViewLive,
            AccessAction::CaptureSnapshot,
            AccessAction::EndAccess,
        ];

        ALL
    }
}

impl FromStr for AccessAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view_live" => Ok(Self::ViewLive),
            "capture_snapshot" => Ok(Self::CaptureSnapshot),
            "end_access" => Ok(Self::EndAccess),
            _ => Err(AppError::Validation(format!(
                "unknown access action '{value}'"
            ))),
        }
    }
}

/// One immutable access log entry.
///
/// Entries echo the session's policy fields so the trail stays readable
/// after the session itself is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Unique entry identifier.
    pub entry_id: Uuid,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Acting operator's subject identifier.
    pub subject: String,
    /// Acting operator's display name.
    pub subject_name: String,
    /// Acting operator's console role.
    pub subject_role: String,
    /// Tenant that owns the camera.
    pub tenant_id: TenantId,
    /// Tenant display name.
    pub tenant_name: String,
    /// Resource type label, always [`RESOURCE_TYPE_CAMERA`] in this slice.
    pub resource_type: String,
    /// Target camera identifier.
    pub camera_id: CameraId,
    /// Target camera display name.
    pub camera_name: String,
    /// Recorded action.
    pub action: AccessAction,
    /// Justification reason from the originating session.
    pub reason: AccessReason,
    /// Human-readable reason label.
    pub reason_label: String,
    /// Free-text justification from the originating session.
    pub description: String,
    /// Optional support ticket reference.
    pub ticket_number: Option<String>,
    /// Originating IP address.
    pub ip_address: String,
    /// Session duration in whole seconds; populated for `end_access`.
    pub duration_seconds: Option<i64>,
    /// Free-form context details.
    pub details: BTreeMap<String, String>,
}

impl AccessLogEntry {
    /// Creates an entry attributing `action` to the session's operator.
    #[must_use]
    pub fn from_session(
        session: &AccessSession,
        action: AccessAction,
        recorded_at: DateTime<Utc>,
        duration_seconds: Option<i64>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            recorded_at,
            subject: session.subject().to_owned(),
            subject_name: session.subject_name().to_owned(),
            subject_role: session.subject_role().to_owned(),
            tenant_id: session.tenant_id(),
            tenant_name: session.tenant_name().to_owned(),
            resource_type: RESOURCE_TYPE_CAMERA.to_owned(),
            camera_id: session.camera_id().clone(),
            camera_name: session.camera_name().to_owned(),
            action,
            reason: session.reason(),
            reason_label: session.reason().label().to_owned(),
            description: session.description().to_owned(),
            ticket_number: session.ticket_number().map(str::to_owned),
            ip_address: session.ip_address().to_owned(),
            duration_seconds,
            details: BTreeMap::new(),
        }
    }

    /// Adds one free-form detail to the entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
