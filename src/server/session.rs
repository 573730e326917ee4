use super::state::ServerState;
use crate::job::JobError;
use crate::user::auth::AuthTokenValue;
use crate::user::Permission;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, error};

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: String,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fails with `JobError::Unauthorized` if the caller lacks `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), JobError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            debug!(
                "User {} is missing permission {:?}",
                self.user_id, permission
            );
            Err(JobError::Unauthorized)
        }
    }
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

#[derive(Debug)]
pub enum SessionExtractionError {
    Unauthenticated,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(value.as_bytes());
    let token = value.strip_prefix("Bearer ").unwrap_or(&value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn extract_session_from_request_parts(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => x,
    };

    let user_manager = ctx.user_manager.lock().map_err(|_| {
        error!("User manager lock poisoned");
        SessionExtractionError::InternalError
    })?;
    let auth_token_value = AuthTokenValue(token);
    let auth_token = match user_manager.get_auth_token(&auth_token_value) {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("Auth token not found in database");
            return Ok(None);
        }
        Err(e) => {
            error!("Failed to get auth token from database: {}", e);
            return Err(SessionExtractionError::InternalError);
        }
    };

    if let Err(e) = user_manager.update_auth_token_last_used(&auth_token_value) {
        // authentication still succeeds, the token just looks older to the pruner
        debug!("Failed to update auth token last_used timestamp: {}", e);
    }

    let permissions = user_manager
        .get_user_permissions(auth_token.user_id)
        .map_err(|e| {
            error!(
                "Failed to resolve permissions for user_id={}: {}",
                auth_token.user_id, e
            );
            SessionExtractionError::InternalError
        })?;
    debug!(
        "Resolved permissions for user_id={}: {:?}",
        auth_token.user_id, permissions
    );

    Ok(Some(Session {
        user_id: auth_token.user_id,
        token: auth_token.value.0,
        permissions,
    }))
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await?
            .ok_or(SessionExtractionError::Unauthenticated)
    }
}

impl axum::extract::OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx).await
    }
}
