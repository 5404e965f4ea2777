//! Authentication middleware and extractors.
//!
//! The session context is the explicit form of "logged in": created by
//! the login handler, read by these extractors, destroyed on logout.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{SessionContext, session_keys};

/// Extractor that requires an authenticated session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(ctx): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.username)
/// }
/// ```
pub struct RequireAuth(pub SessionContext);

/// Error returned when authentication is required but absent.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "authentication required" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let ctx: SessionContext = session
            .get(session_keys::SESSION_CONTEXT)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(ctx))
    }
}

/// Extractor that optionally gets the session context.
///
/// Unlike `RequireAuth`, this does not reject unauthenticated requests.
pub struct OptionalAuth(pub Option<SessionContext>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionContext>(session_keys::SESSION_CONTEXT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(ctx))
    }
}

/// Store the session context after a successful backend login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_context(
    session: &Session,
    ctx: &SessionContext,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::SESSION_CONTEXT, ctx).await
}

/// Destroy the session on logout.
///
/// Flushes the whole session record so the cookie stops resolving; the
/// backend token inside it is gone with the record.
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn clear_session_context(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
