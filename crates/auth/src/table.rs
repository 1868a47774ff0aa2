//! Role → grant table and the permission evaluator.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use studiodesk_core::DomainResult;

use crate::{Grant, Permission, Role, RoleGrants};

/// Immutable mapping from every [`Role`] to its grant set.
///
/// Built once at startup (from [`GrantTable::builtin`] or a config file) and
/// shared read-only afterwards; it is `Send + Sync` and needs no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTable {
    roles: BTreeMap<Role, RoleGrants>,
}

impl GrantTable {
    /// Table in which every role exists with no grants.
    pub fn empty() -> Self {
        Self {
            roles: Role::ALL.into_iter().map(|role| (role, RoleGrants::new())).collect(),
        }
    }

    /// The agency's default grants.
    ///
    /// | Role    | Grants                                                 |
    /// |---------|--------------------------------------------------------|
    /// | OWNER   | `*`                                                    |
    /// | OPS     | `finance.view`, `finance.create`, `studio.*`, `users.view` |
    /// | STUDIO  | `studio.*`, `calendar.view`                            |
    /// | DIGITAL | `social.*`, `calendar.view`                            |
    /// | CLIENT  | `portal.view`                                          |
    pub fn builtin() -> Self {
        Self::empty()
            .with_grants(Role::Owner, [Grant::Universal])
            .with_grants(
                Role::Ops,
                [
                    Grant::exact("finance", "view"),
                    Grant::exact("finance", "create"),
                    Grant::scope("studio"),
                    Grant::exact("users", "view"),
                ],
            )
            .with_grants(Role::Studio, [Grant::scope("studio"), Grant::exact("calendar", "view")])
            .with_grants(Role::Digital, [Grant::scope("social"), Grant::exact("calendar", "view")])
            .with_grants(Role::Client, [Grant::exact("portal", "view")])
    }

    /// Add typed grants to `role`.
    pub fn with_grants(mut self, role: Role, grants: impl IntoIterator<Item = Grant>) -> Self {
        let entry = self.roles.entry(role).or_default();
        for grant in grants {
            entry.insert(grant);
        }
        self
    }

    /// Add grants to `role` from their string form, rejecting malformed entries.
    pub fn try_with_grants<S: AsRef<str>>(
        self,
        role: Role,
        grants: impl IntoIterator<Item = S>,
    ) -> DomainResult<Self> {
        let parsed = grants
            .into_iter()
            .map(|g| g.as_ref().parse::<Grant>())
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(self.with_grants(role, parsed))
    }

    /// Grants of `role`; `None` only for tables built without that role.
    pub fn grants_for(&self, role: Role) -> Option<&RoleGrants> {
        self.roles.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = (Role, &RoleGrants)> {
        self.roles.iter().map(|(role, grants)| (*role, grants))
    }

    /// Decide whether `role` may perform `permission`.
    ///
    /// Deny-by-default: a role without an entry, or a permission matching no
    /// grant, is refused. Pure and deterministic for the table's lifetime.
    pub fn allows(&self, role: Role, permission: &Permission) -> bool {
        self.grants_for(role).is_some_and(|grants| grants.allows(permission))
    }

    /// [`allows`](Self::allows) for a raw `scope.action` string.
    pub fn allows_str(&self, role: Role, permission: &str) -> bool {
        self.grants_for(role).is_some_and(|grants| grants.allows_str(permission))
    }

    /// Entry point for callers holding an untyped role name.
    ///
    /// Names outside the closed role set are denied, never an error.
    pub fn allows_role_name(&self, role: &str, permission: &str) -> bool {
        role.parse::<Role>()
            .is_ok_and(|role| self.allows_str(role, permission))
    }

    /// Every role in this table that would be allowed `permission`.
    pub fn roles_granting(&self, permission: &Permission) -> Vec<Role> {
        self.roles()
            .filter(|(_, grants)| grants.allows(permission))
            .map(|(role, _)| role)
            .collect()
    }
}

impl Default for GrantTable {
    fn default() -> Self {
        Self::builtin()
    }
}

static BUILTIN: LazyLock<GrantTable> = LazyLock::new(GrantTable::builtin);

/// Process-wide built-in table, constructed on first use.
pub fn builtin_table() -> &'static GrantTable {
    &BUILTIN
}

/// Check `permission` for `role` against the built-in table.
pub fn has_permission(role: Role, permission: &str) -> bool {
    builtin_table().allows_str(role, permission)
}
