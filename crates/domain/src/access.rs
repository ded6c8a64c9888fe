//! Temporary camera access: requests, sessions, and expiry rules.
//!
//! Access to live camera feeds is a privacy-sensitive operation (LGPD), so
//! every grant is time-boxed, justified by an enumerated reason, and tied to
//! the operator that requested it.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigia_core::{AppError, AppResult, CameraId, NonEmptyString, TenantId, UserIdentity};

/// Fixed time-to-live for every access session, in seconds (30 minutes).
pub const ACCESS_SESSION_TTL_SECONDS: i64 = 30 * 60;

/// Minimum length of the free-text access justification.
pub const DESCRIPTION_MIN_LENGTH: usize = 20;

/// Maximum length of the free-text access justification.
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Returns the fixed session time-to-live as a duration.
#[must_use]
pub fn access_session_ttl() -> Duration {
    Duration::seconds(ACCESS_SESSION_TTL_SECONDS)
}

/// Enumerated justification categories for requesting camera access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    /// Diagnosing a reported camera or connectivity problem.
    TechnicalSupport,
    /// Reviewing footage context for an incident under investigation.
    IncidentInvestigation,
    /// Fulfilling an explicit request from the tenant.
    ClientRequest,
    /// Verifying recording and retention behavior for a compliance audit.
    ComplianceAudit,
    /// Routine infrastructure health monitoring.
    InfrastructureMonitoring,
}

impl AccessReason {
    /// Returns a stable wire value for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalSupport => "technical_support",
            Self::IncidentInvestigation => "incident_investigation",
            Self::ClientRequest => "client_request",
            Self::ComplianceAudit => "compliance_audit",
            Self::InfrastructureMonitoring => "infrastructure_monitoring",
        }
    }

    /// Returns the fixed human-readable label for this reason.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::TechnicalSupport => "Technical support",
            Self::IncidentInvestigation => "Incident investigation",
            Self::ClientRequest => "Client request",
            Self::ComplianceAudit => "Compliance audit",
            Self::InfrastructureMonitoring => "Infrastructure monitoring",
        }
    }

    /// Returns all known reasons.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccessReason] = &[
            AccessReason::TechnicalSupport,
            AccessReason::IncidentInvestigation,
            AccessReason::ClientRequest,
            AccessReason::ComplianceAudit,
            AccessReason::InfrastructureMonitoring,
        ];

        ALL
    }

    /// Parses a transport value into a reason.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for AccessReason {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "technical_support" => Ok(Self::TechnicalSupport),
            "incident_investigation" => Ok(Self::IncidentInvestigation),
            "client_request" => Ok(Self::ClientRequest),
            "compliance_audit" => Ok(Self::ComplianceAudit),
            "infrastructure_monitoring" => Ok(Self::InfrastructureMonitoring),
            _ => Err(AppError::Validation(format!(
                "unknown access reason '{value}'"
            ))),
        }
    }
}

/// Validated input for requesting temporary camera access.
///
/// Consumed once when a session is granted; a constructed value is always
/// well-formed, so the lifecycle service never sees an unvalidated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    camera_id: CameraId,
    camera_name: NonEmptyString,
    tenant_id: TenantId,
    tenant_name: NonEmptyString,
    reason: AccessReason,
    description: String,
    ticket_number: Option<String>,
}

impl AccessRequest {
    /// Creates a validated access request.
    pub fn new(
        camera_id: CameraId,
        camera_name: impl Into<String>,
        tenant_id: TenantId,
        tenant_name: impl Into<String>,
        reason: AccessReason,
        description: impl Into<String>,
        ticket_number: Option<String>,
    ) -> AppResult<Self> {
        let camera_name = NonEmptyString::new(camera_name)
            .map_err(|_| AppError::Validation("camera_name must not be empty".to_owned()))?;
        let tenant_name = NonEmptyString::new(tenant_name)
            .map_err(|_| AppError::Validation("tenant_name must not be empty".to_owned()))?;

        let description = description.into().trim().to_owned();
        if description.chars().count() < DESCRIPTION_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "description must be at least {DESCRIPTION_MIN_LENGTH} characters"
            )));
        }
        if description.chars().count() > DESCRIPTION_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "description must not exceed {DESCRIPTION_MAX_LENGTH} characters"
            )));
        }

        let ticket_number = ticket_number
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            camera_id,
            camera_name,
            tenant_id,
            tenant_name,
            reason,
            description,
            ticket_number,
        })
    }

    /// Returns the target camera identifier.
    #[must_use]
    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    /// Returns the target camera display name.
    #[must_use]
    pub fn camera_name(&self) -> &str {
        self.camera_name.as_str()
    }

    /// Returns the tenant that owns the camera.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the tenant display name.
    #[must_use]
    pub fn tenant_name(&self) -> &str {
        self.tenant_name.as_str()
    }

    /// Returns the chosen access reason.
    #[must_use]
    pub fn reason(&self) -> AccessReason {
        self.reason
    }

    /// Returns the free-text justification.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the optional support ticket reference.
    #[must_use]
    pub fn ticket_number(&self) -> Option<&str> {
        self.ticket_number.as_deref()
    }
}

/// Outcome of checking a session against the clock.
///
/// Expiry is a visible, pure computation on the entity; callers decide what
/// to do with an expired session (typically reap it and record the end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExpiry {
    /// The session is still within its time-to-live.
    Active(AccessSession),
    /// The session's expiry instant has passed.
    Expired(AccessSession),
}

/// A time-bounded grant of viewing rights to one camera.
///
/// A stored session is active by definition: ending a session, explicitly or
/// through lazy expiry, removes it from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSession {
    session_id: Uuid,
    camera_id: CameraId,
    camera_name: String,
    tenant_id: TenantId,
    tenant_name: String,
    subject: String,
    subject_name: String,
    subject_role: String,
    reason: AccessReason,
    description: String,
    ticket_number: Option<String>,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    ip_address: String,
}

impl AccessSession {
    /// Grants a session for the given request, starting now.
    ///
    /// The expiry instant is always exactly `started_at` plus the fixed
    /// 30-minute time-to-live.
    #[must_use]
    pub fn grant(
        request: AccessRequest,
        actor: &UserIdentity,
        ip_address: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            camera_id: request.camera_id,
            camera_name: request.camera_name.into(),
            tenant_id: request.tenant_id,
            tenant_name: request.tenant_name.into(),
            subject: actor.subject().to_owned(),
            subject_name: actor.display_name().to_owned(),
            subject_role: actor.role().to_owned(),
            reason: request.reason,
            description: request.description,
            ticket_number: request.ticket_number,
            started_at: now,
            expires_at: now + access_session_ttl(),
            ip_address: ip_address.into(),
        }
    }

    /// Returns a copy of this session with its clock reset to a fresh
    /// time-to-live from `now`, keeping identity and policy unchanged.
    #[must_use]
    pub fn renewed(mut self, now: DateTime<Utc>) -> Self {
        self.expires_at = now + access_session_ttl();
        self
    }

    /// Classifies this session as active or expired at the given instant.
    #[must_use]
    pub fn check_expiry(self, now: DateTime<Utc>) -> SessionExpiry {
        if now >= self.expires_at {
            SessionExpiry::Expired(self)
        } else {
            SessionExpiry::Active(self)
        }
    }

    /// Returns whether the expiry instant has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns the time left until expiry; negative once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Returns whole seconds elapsed since the session started.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds()
    }

    /// Returns the unique session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Returns the camera this session grants access to.
    #[must_use]
    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    /// Returns the camera display name.
    #[must_use]
    pub fn camera_name(&self) -> &str {
        self.camera_name.as_str()
    }

    /// Returns the tenant that owns the camera.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the tenant display name.
    #[must_use]
    pub fn tenant_name(&self) -> &str {
        self.tenant_name.as_str()
    }

    /// Returns the requesting operator's subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the requesting operator's display name.
    #[must_use]
    pub fn subject_name(&self) -> &str {
        self.subject_name.as_str()
    }

    /// Returns the requesting operator's role at grant time.
    #[must_use]
    pub fn subject_role(&self) -> &str {
        self.subject_role.as_str()
    }

    /// Returns the justification reason.
    #[must_use]
    pub fn reason(&self) -> AccessReason {
        self.reason
    }

    /// Returns the free-text justification.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the optional support ticket reference.
    #[must_use]
    pub fn ticket_number(&self) -> Option<&str> {
        self.ticket_number.as_deref()
    }

    /// Returns when the session was granted.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the originating IP address recorded at grant time.
    #[must_use]
    pub fn ip_address(&self) -> &str {
        self.ip_address.as_str()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use vigia_core::{CameraId, TenantId, UserIdentity};

    use super::{
        ACCESS_SESSION_TTL_SECONDS, AccessReason, AccessRequest, AccessSession, SessionExpiry,
    };

    fn camera() -> CameraId {
        CameraId::new("cam-1").unwrap_or_else(|_| unreachable!("literal id is valid"))
    }

    fn request() -> AccessRequest {
        AccessRequest::new(
            camera(),
            "Entrance lobby",
            TenantId::new(),
            "Acme Logistics",
            AccessReason::TechnicalSupport,
            "Investigating reported offline camera on site A.",
            Some("TCK-1".to_owned()),
        )
        .unwrap_or_else(|_| unreachable!("fixture request is valid"))
    }

    fn actor() -> UserIdentity {
        UserIdentity::new("op-7", "Alice Operator", "technician")
    }

    #[test]
    fn reason_round_trips_through_transport_values() {
        for reason in AccessReason::all() {
            let parsed = AccessReason::from_transport(reason.as_str());
            assert!(parsed.is_ok_and(|value| value == *reason));
        }
    }

    #[test]
    fn reason_rejects_unknown_value() {
        assert!(AccessReason::from_transport("curiosity").is_err());
    }

    #[test]
    fn request_rejects_blank_display_names() {
        let blank_camera = AccessRequest::new(
            camera(),
            "   ",
            TenantId::new(),
            "Acme Logistics",
            AccessReason::ClientRequest,
            "Client asked for a live check of the loading dock.",
            None,
        );
        assert!(blank_camera.is_err());

        let blank_tenant = AccessRequest::new(
            camera(),
            "Entrance lobby",
            TenantId::new(),
            "",
            AccessReason::ClientRequest,
            "Client asked for a live check of the loading dock.",
            None,
        );
        assert!(blank_tenant.is_err());
    }

    #[test]
    fn request_rejects_short_description() {
        let result = AccessRequest::new(
            camera(),
            "Entrance lobby",
            TenantId::new(),
            "Acme Logistics",
            AccessReason::ClientRequest,
            "too short",
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn request_rejects_oversized_description() {
        let result = AccessRequest::new(
            camera(),
            "Entrance lobby",
            TenantId::new(),
            "Acme Logistics",
            AccessReason::ClientRequest,
            "x".repeat(501),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn request_normalizes_blank_ticket_to_none() {
        let result = AccessRequest::new(
            camera(),
            "Entrance lobby",
            TenantId::new(),
            "Acme Logistics",
            AccessReason::ComplianceAudit,
            "Quarterly retention verification for tenant audit.",
            Some("   ".to_owned()),
        );
        assert!(result.is_ok_and(|request| request.ticket_number().is_none()));
    }

    #[test]
    fn grant_sets_expiry_exactly_one_ttl_after_start() {
        let now = Utc::now();
        let session = AccessSession::grant(request(), &actor(), "10.0.0.9", now);

        assert_eq!(session.started_at(), now);
        assert_eq!(
            (session.expires_at() - session.started_at()).num_seconds(),
            ACCESS_SESSION_TTL_SECONDS
        );
    }

    #[test]
    fn expiry_check_is_edge_inclusive() {
        let now = Utc::now();
        let session = AccessSession::grant(request(), &actor(), "10.0.0.9", now);

        assert!(!session.is_expired(now));
        assert!(session.is_expired(session.expires_at()));

        let at_expiry = session.expires_at();
        match session.check_expiry(at_expiry) {
            SessionExpiry::Expired(_) => {}
            SessionExpiry::Active(_) => panic!("session must be expired at its expiry instant"),
        }
    }

    #[test]
    fn renewed_resets_expiry_but_keeps_identity() {
        let started = Utc::now();
        let session = AccessSession::grant(request(), &actor(), "10.0.0.9", started);
        let original_id = session.session_id();

        let later = started + Duration::minutes(10);
        let renewed = session.renewed(later);

        assert_eq!(renewed.session_id(), original_id);
        assert_eq!(renewed.started_at(), started);
        assert_eq!(
            (renewed.expires_at() - later).num_seconds(),
            ACCESS_SESSION_TTL_SECONDS
        );
    }

    #[test]
    fn elapsed_seconds_is_derived_from_start() {
        let started = Utc::now();
        let session = AccessSession::grant(request(), &actor(), "10.0.0.9", started);

        assert_eq!(
            session.elapsed_seconds(started + Duration::seconds(125)),
            125
        );
    }
}
