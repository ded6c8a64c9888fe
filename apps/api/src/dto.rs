use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use vigia_domain::{AccessLogEntry, AccessSession};

/// Liveness payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for requesting temporary camera access.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/request-access-request.ts"
)]
pub struct RequestAccessRequest {
    pub camera_name: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub reason: String,
    pub description: String,
    pub ticket_number: Option<String>,
}

/// API representation of an active access session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/access-session-response.ts"
)]
pub struct AccessSessionResponse {
    pub session_id: String,
    pub camera_id: String,
    pub camera_name: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub subject: String,
    pub subject_name: String,
    pub subject_role: String,
    pub reason: String,
    pub reason_label: String,
    pub description: String,
    pub ticket_number: Option<String>,
    pub started_at: String,
    pub expires_at: String,
    pub elapsed_seconds: i64,
    pub remaining_seconds: i64,
    pub active: bool,
    pub ip_address: String,
}

impl AccessSessionResponse {
    /// Builds the response, deriving elapsed and remaining time from `now`.
    pub fn from_session(session: &AccessSession, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            camera_id: session.camera_id().as_str().to_owned(),
            camera_name: session.camera_name().to_owned(),
            tenant_id: session.tenant_id().to_string(),
            tenant_name: session.tenant_name().to_owned(),
            subject: session.subject().to_owned(),
            subject_name: session.subject_name().to_owned(),
            subject_role: session.subject_role().to_owned(),
            reason: session.reason().as_str().to_owned(),
            reason_label: session.reason().label().to_owned(),
            description: session.description().to_owned(),
            ticket_number: session.ticket_number().map(str::to_owned),
            started_at: iso_timestamp(session.started_at()),
            expires_at: iso_timestamp(session.expires_at()),
            elapsed_seconds: session.elapsed_seconds(now),
            remaining_seconds: session.remaining(now).num_seconds().max(0),
            active: true,
            ip_address: session.ip_address().to_owned(),
        }
    }
}

/// API representation of one access log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/access-log-entry-response.ts"
)]
pub struct AccessLogEntryResponse {
    pub entry_id: String,
    pub recorded_at: String,
    pub subject: String,
    pub subject_name: String,
    pub subject_role: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub resource_type: String,
    pub camera_id: String,
    pub camera_name: String,
    pub action: String,
    pub reason: String,
    pub reason_label: String,
    pub description: String,
    pub ticket_number: Option<String>,
    pub ip_address: String,
    pub duration_seconds: Option<i64>,
    pub details: BTreeMap<String, String>,
}

impl From<AccessLogEntry> for AccessLogEntryResponse {
    fn from(value: AccessLogEntry) -> Self {
        Self {
            entry_id: value.entry_id.to_string(),
            recorded_at: iso_timestamp(value.recorded_at),
            subject: value.subject,
            subject_name: value.subject_name,
            subject_role: value.subject_role,
            tenant_id: value.tenant_id.to_string(),
            tenant_name: value.tenant_name,
            resource_type: value.resource_type,
            camera_id: value.camera_id.as_str().to_owned(),
            camera_name: value.camera_name,
            action: value.action.as_str().to_owned(),
            reason: value.reason.as_str().to_owned(),
            reason_label: value.reason_label,
            description: value.description,
            ticket_number: value.ticket_number,
            ip_address: value.ip_address,
            duration_seconds: value.duration_seconds,
            details: value.details,
        }
    }
}

fn iso_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
