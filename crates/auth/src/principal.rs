use serde::{Deserialize, Serialize};

use studiodesk_core::UserId;

use crate::Role;

/// An authenticated dashboard user, as resolved by the session layer.
///
/// This crate never authenticates or loads user records; callers hand in the
/// already-resolved identity and role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
