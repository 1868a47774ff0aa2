use core::str::FromStr;

use serde::{Deserialize, Serialize};

use studiodesk_core::DomainError;

/// Role used for RBAC.
///
/// The set is closed: every dashboard user is assigned exactly one of these by
/// the session layer. Mapping roles to grants is the job of a
/// [`GrantTable`](crate::GrantTable).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Ops,
    Studio,
    Digital,
    Client,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Owner, Role::Ops, Role::Studio, Role::Digital, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Ops => "OPS",
            Role::Studio => "STUDIO",
            Role::Digital => "DIGITAL",
            Role::Client => "CLIENT",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Owner => "Agency owner with unrestricted access",
            Role::Ops => "Operations staff: finance viewing and creation, studio management, user directory",
            Role::Studio => "Studio team: studio bookings and calendar viewing",
            Role::Digital => "Digital team: social content and calendar viewing",
            Role::Client => "External client with client-portal access only",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact upper-case names only; anything else is a validation error.
impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}
