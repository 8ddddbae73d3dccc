// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use ce_ops_api::{AuthenticatedActor, AuthenticationService};
use ce_ops_persistence::UserData;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated users.
///
/// Reads `Authorization: Bearer <token>`, validates the session and
/// returns the actor together with the stored account.
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // user: UserData
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 when the header is missing or malformed, the token is
/// unknown or expired, or the account has been disabled.
pub struct SessionUser(pub AuthenticatedActor, pub UserData);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let mut persistence = state.persistence.lock().await;
        let (actor, user) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(
            user_id = actor.user_id,
            role = actor.role.as_str(),
            "Session validated"
        );

        Ok(Self(actor, user))
    }
}

/// Pulls the bearer token out of the request headers.
///
/// # Errors
///
/// Returns a `SessionError` if the header is absent, not ASCII, or not a
/// bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let header = headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Authorization header is not a bearer token");
            SessionError::InvalidAuthorizationHeader
        })
}

/// Session extraction errors. All of them are 401s.
#[derive(Debug)]
pub enum SessionError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        let body = Json(ErrorResponse {
            error: String::from("unauthorized"),
            message,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
