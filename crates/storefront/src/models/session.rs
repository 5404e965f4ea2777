//! Session-related types.
//!
//! Authentication state is an explicit context object with a defined
//! lifecycle: created when a backend login succeeds, destroyed on logout.
//! Every component that talks to the backend receives it as an argument;
//! nothing reads identity out of ambient storage.

use serde::{Deserialize, Serialize};

use tiffin_core::{Role, UserId};

/// Session-stored identity and backend credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Backend user ID.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Account role as issued at login.
    pub role: Role,
    /// Opaque bearer token replayed to the backend on every call.
    token: String,
}

impl SessionContext {
    /// Build a context from a successful backend login.
    #[must_use]
    pub fn new(user_id: UserId, username: String, role: Role, token: String) -> Self {
        Self {
            user_id,
            username,
            role,
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
    /// Key for storing the logged-in user's session context.
    pub const SESSION_CONTEXT: &str = "session_context";
}
