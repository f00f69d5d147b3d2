//! Path-parameter parsing shared by every route module.

use coup_domain::{DomainError, SessionId};

use super::error_mapping::ApiError;

pub fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(SessionId::from_uuid)
        .map_err(|_| ApiError(DomainError::not_found(format!("no such session: {raw}"))))
}
