//! Staff auth route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tiffin_core::{Role, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity returned to the client after login.
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub user_id: UserId,
    pub username: String,
}

/// Log in against the backend; only admin-role accounts get a session.
#[instrument(skip(state, session, input))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginView>> {
    let login = state.canteen().login(&input.email, &input.password).await?;

    match login.role {
        Role::Admin => {}
        Role::User => {
            return Err(AppError::Forbidden(
                "this panel is for canteen staff".to_string(),
            ));
        }
    }

    let admin = CurrentAdmin::new(login.user_id.clone(), login.username.clone(), login.token);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %login.user_id, "staff member logged in");

    Ok(Json(LoginView {
        user_id: login.user_id,
        username: login.username,
    }))
}

/// Destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
