//! Menu route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::canteen::MenuItem;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Menu listing response.
#[derive(Debug, Serialize)]
pub struct MenuView {
    pub items: Vec<MenuItem>,
}

/// List what the canteen is serving.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<MenuView>> {
    let items = state.canteen().menu(&ctx).await?;
    Ok(Json(MenuView { items }))
}
