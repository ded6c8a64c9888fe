//! Domain entities and invariants for temporary camera access.

#![forbid(unsafe_code)]

mod access;
mod audit;

pub use access::{
    ACCESS_SESSION_TTL_SECONDS, AccessReason, AccessRequest, AccessSession,
    DESCRIPTION_MAX_LENGTH, DESCRIPTION_MIN_LENGTH, SessionExpiry, access_session_ttl,
};
pub use audit::{AccessAction, AccessLogEntry, RESOURCE_TYPE_CAMERA};
