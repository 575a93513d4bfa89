// File: gameplug-server/src/auth.rs
//
// JWT verification happens upstream at the gateway; by the time a request
// reaches this service the verified identity arrives as trusted headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use gameplug_common::Error;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// The authenticated caller, extracted from gateway headers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError(Error::Forbidden(
                "Admin access required".to_string(),
            )))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| {
                ApiError(Error::Forbidden(format!(
                    "missing or invalid {USER_ID_HEADER} header"
                )))
            })?;

        let role = match parts.headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok()) {
            Some("admin") => Role::Admin,
            _ => Role::User,
        };

        Ok(AuthUser { user_id, role })
    }
}
