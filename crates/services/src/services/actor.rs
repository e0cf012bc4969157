use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller. Passed explicitly into every service call;
/// roles are re-read from storage each time, never trusted from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_platform_admin: bool,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_platform_admin: false,
        }
    }

    pub fn platform_admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_platform_admin: true,
        }
    }
}
