use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::user::Role;

/// The signed-in user's context, passed explicitly to every component
/// that calls an authenticated endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    #[zeroize(skip)]
    pub user_id: String,
    #[zeroize(skip)]
    pub role: Role,
    pub token: String,
    #[zeroize(skip)]
    pub name: String,
    #[zeroize(skip)]
    pub email: String,
}

impl Session {
    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}
