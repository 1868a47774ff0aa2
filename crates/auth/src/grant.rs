//! Grant entries and per-role grant sets.

use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use studiodesk_core::DomainError;

use crate::Permission;
use crate::permissions::split_scope;

/// One entry of a role's grant set.
///
/// On the wire (config files, JSON output) a grant is its string form:
/// `*`, `scope.action` or `scope.*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grant {
    /// `*`: every permission.
    Universal,
    /// `scope.action`: exactly that permission.
    Exact { scope: String, action: String },
    /// `scope.*`: any action within `scope`.
    ScopeWildcard { scope: String },
}

impl Grant {
    pub fn exact(scope: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Exact {
            scope: scope.into(),
            action: action.into(),
        }
    }

    pub fn scope(scope: impl Into<String>) -> Self {
        Self::ScopeWildcard { scope: scope.into() }
    }

    /// Whether this single grant covers `permission`.
    pub fn covers(&self, permission: &Permission) -> bool {
        match self {
            Grant::Universal => true,
            Grant::Exact { scope, action } => {
                permission.has_separator() && permission.scope() == scope && permission.action() == action
            }
            Grant::ScopeWildcard { scope } => permission.wildcard_scope() == Some(scope.as_str()),
        }
    }
}

impl core::fmt::Display for Grant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Grant::Universal => f.write_str("*"),
            Grant::Exact { scope, action } => write!(f, "{scope}.{action}"),
            Grant::ScopeWildcard { scope } => write!(f, "{scope}.*"),
        }
    }
}

impl FromStr for Grant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Grant::Universal);
        }

        let Some((scope, action)) = s.split_once('.') else {
            return Err(DomainError::validation(format!(
                "grant '{s}' must be '*', 'scope.action' or 'scope.*'"
            )));
        };

        if scope.is_empty() || scope.contains('*') {
            return Err(DomainError::validation(format!("grant '{s}' has an invalid scope")));
        }

        match action {
            "" => Err(DomainError::validation(format!("grant '{s}' has an empty action"))),
            "*" => Ok(Grant::scope(scope)),
            a if a.contains('*') => Err(DomainError::validation(format!(
                "grant '{s}' may only use '*' as the whole action"
            ))),
            a => Ok(Grant::exact(scope, a)),
        }
    }
}

impl TryFrom<String> for Grant {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grant> for String {
    fn from(value: Grant) -> Self {
        value.to_string()
    }
}

/// Ordered, de-duplicated grant set of one role.
///
/// Keeps the grants in insertion order for display and maintains lookup sets
/// so evaluation is a handful of hash probes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGrants {
    grants: Vec<Grant>,
    universal: bool,
    exact: HashSet<String>,
    wildcard_scopes: HashSet<String>,
}

impl RoleGrants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grant. Returns `false` if it was already present.
    pub fn insert(&mut self, grant: Grant) -> bool {
        if self.grants.contains(&grant) {
            return false;
        }
        match &grant {
            Grant::Universal => self.universal = true,
            Grant::Exact { .. } => {
                self.exact.insert(grant.to_string());
            }
            Grant::ScopeWildcard { scope } => {
                self.wildcard_scopes.insert(scope.clone());
            }
        }
        self.grants.push(grant);
        true
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Deny-by-default check: universal, then exact, then scope wildcard.
    pub fn allows(&self, permission: &Permission) -> bool {
        self.check(permission.as_str(), permission.wildcard_scope())
    }

    /// Same as [`allows`](Self::allows) for a raw request string.
    pub fn allows_str(&self, permission: &str) -> bool {
        self.check(permission, split_scope(permission))
    }

    fn check(&self, raw: &str, wildcard_scope: Option<&str>) -> bool {
        if self.universal {
            return true;
        }
        if self.exact.contains(raw) {
            return true;
        }
        wildcard_scope.is_some_and(|scope| self.wildcard_scopes.contains(scope))
    }

    /// The grant that decides `permission`, in evaluation order.
    pub fn matching_grant(&self, permission: &Permission) -> Option<&Grant> {
        if self.universal {
            return self.grants.iter().find(|g| matches!(g, Grant::Universal));
        }
        if self.exact.contains(permission.as_str()) {
            return self
                .grants
                .iter()
                .find(|g| matches!(g, Grant::Exact { .. }) && g.covers(permission));
        }
        self.grants
            .iter()
            .find(|g| matches!(g, Grant::ScopeWildcard { .. }) && g.covers(permission))
    }
}

impl FromIterator<Grant> for RoleGrants {
    fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
        let mut grants = RoleGrants::new();
        for grant in iter {
            grants.insert(grant);
        }
        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_grant_forms() {
        assert_eq!("*".parse::<Grant>().unwrap(), Grant::Universal);
        assert_eq!("finance.view".parse::<Grant>().unwrap(), Grant::exact("finance", "view"));
        assert_eq!("studio.*".parse::<Grant>().unwrap(), Grant::scope("studio"));
    }

    #[test]
    fn rejects_malformed_grants() {
        for bad in ["finance", ".view", "finance.", "*.view", "fin*.view", "finance.v*"] {
            assert!(bad.parse::<Grant>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn display_is_canonical_string_form() {
        for s in ["*", "finance.view", "studio.*", "studio.rooms.book"] {
            assert_eq!(s.parse::<Grant>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn insert_ignores_duplicates_and_keeps_order() {
        let mut grants = RoleGrants::new();
        assert!(grants.insert(Grant::scope("social")));
        assert!(grants.insert(Grant::exact("calendar", "view")));
        assert!(!grants.insert(Grant::scope("social")));
        assert_eq!(grants.grants(), &[Grant::scope("social"), Grant::exact("calendar", "view")]);
    }

    #[test]
    fn empty_set_denies_everything() {
        let grants = RoleGrants::new();
        assert!(grants.is_empty());
        assert!(!grants.allows(&Permission::new("portal.view")));
        assert!(!grants.allows_str("*"));
    }

    #[test]
    fn wildcard_only_applies_to_its_own_scope() {
        let grants: RoleGrants = [Grant::scope("studio")].into_iter().collect();
        assert!(grants.allows_str("studio.book"));
        assert!(grants.allows_str("studio.rooms.cancel"));
        assert!(!grants.allows_str("studios.book"));
        assert!(!grants.allows_str("studio"));
    }

    #[test]
    fn matching_grant_prefers_universal_then_exact() {
        let grants: RoleGrants = [Grant::scope("finance"), Grant::exact("finance", "view"), Grant::Universal]
            .into_iter()
            .collect();
        let p = Permission::new("finance.view");
        assert_eq!(grants.matching_grant(&p), Some(&Grant::Universal));

        let grants: RoleGrants = [Grant::scope("finance"), Grant::exact("finance", "view")]
            .into_iter()
            .collect();
        assert_eq!(grants.matching_grant(&p), Some(&Grant::exact("finance", "view")));
        assert_eq!(
            grants.matching_grant(&Permission::new("finance.delete")),
            Some(&Grant::scope("finance"))
        );
        assert_eq!(grants.matching_grant(&Permission::new("social.post")), None);
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&vec![Grant::Universal, Grant::scope("social")]).unwrap();
        assert_eq!(json, r#"["*","social.*"]"#);
        let err = serde_json::from_str::<Grant>("\"finance\"");
        assert!(err.is_err());
    }
}
