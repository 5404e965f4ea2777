//! Auth route handlers.
//!
//! Login exchanges credentials with the backend and materializes the
//! session context; logout tears it down. Token issuance, hashing, and
//! expiry are entirely the backend's concern.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tiffin_core::{Role, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{clear_session_context, set_session_context};
use crate::models::SessionContext;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity returned to the client after login. The token never leaves
/// the session.
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

/// Log in against the backend and initialize the session context.
#[instrument(skip(state, session, input))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginView>> {
    let login = state.canteen().login(&input.email, &input.password).await?;

    // The storefront serves diners; staff accounts belong in the panel.
    match login.role {
        Role::User => {}
        Role::Admin => {
            return Err(AppError::Forbidden(
                "staff accounts must use the admin panel".to_string(),
            ));
        }
    }

    let ctx = SessionContext::new(
        login.user_id.clone(),
        login.username.clone(),
        login.role,
        login.token,
    );
    set_session_context(&session, &ctx)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %login.user_id, "user logged in");

    Ok(Json(LoginView {
        user_id: login.user_id,
        username: login.username,
        role: login.role,
    }))
}

/// Destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_session_context(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
