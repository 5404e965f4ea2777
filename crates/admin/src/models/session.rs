//! Session-related types.

use serde::{Deserialize, Serialize};

use tiffin_core::UserId;

/// Session-stored staff identity.
///
/// Only constructed after a backend login that returned the admin role;
/// holding one of these IS the authorization to hit `/admin` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Opaque bearer token replayed to the backend on every call.
    token: String,
}

impl CurrentAdmin {
    /// Build the staff session identity.
    #[must_use]
    pub fn new(user_id: UserId, username: String, token: String) -> Self {
        Self {
            user_id,
            username,
            token,
        }
    }

    /// The bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in staff member.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
