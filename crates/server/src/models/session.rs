//! Session-related types.

use serde::{Deserialize, Serialize};

use wishlisted_core::{Capability, Email, UserId, UserRole};

/// Session-stored identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role chosen at sign-up (or granted from the CLI).
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user's role allows `capability`.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        self.role.permits(capability)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
