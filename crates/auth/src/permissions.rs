use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use studiodesk_core::{DomainError, DomainResult};

/// Requested permission, e.g. `"finance.view"`.
///
/// The string contract of existing call sites is kept; the scope/action split
/// is computed once on construction. Construction never fails: a string
/// without a `.` is a scope with an empty action, which can only ever be
/// matched by an exact or universal grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Permission {
    raw: Cow<'static, str>,
    separator: Option<usize>,
}

/// Scope of a raw permission string, if it has a `scope.action` separator.
pub(crate) fn split_scope(raw: &str) -> Option<&str> {
    raw.find('.').map(|idx| &raw[..idx])
}

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let raw = name.into();
        let separator = raw.find('.');
        Self { raw, separator }
    }

    /// Parse a permission, rejecting anything that is not `scope.action`
    /// with a non-empty scope and action and no `*` in either part.
    pub fn parse_strict(name: impl Into<Cow<'static, str>>) -> DomainResult<Self> {
        let permission = Self::new(name);
        if !permission.has_separator() {
            return Err(DomainError::validation(format!(
                "permission '{}' must have the form 'scope.action'",
                permission.raw
            )));
        }
        if permission.scope().is_empty() || permission.action().is_empty() {
            return Err(DomainError::validation(format!(
                "permission '{}' has an empty scope or action",
                permission.raw
            )));
        }
        if permission.raw.contains('*') {
            return Err(DomainError::validation(format!(
                "permission '{}' must not contain '*'",
                permission.raw
            )));
        }
        Ok(permission)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Everything before the first `.`, or the whole string if there is none.
    pub fn scope(&self) -> &str {
        match self.separator {
            Some(idx) => &self.raw[..idx],
            None => &self.raw,
        }
    }

    /// Everything after the first `.`, or `""` if there is none.
    pub fn action(&self) -> &str {
        match self.separator {
            Some(idx) => &self.raw[idx + 1..],
            None => "",
        }
    }

    pub fn has_separator(&self) -> bool {
        self.separator.is_some()
    }

    /// Scope eligible for `scope.*` matching.
    pub(crate) fn wildcard_scope(&self) -> Option<&str> {
        self.separator.map(|idx| &self.raw[..idx])
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.raw.into_owned()
    }
}

/// Permissions checked by the dashboard's page guards and server actions.
pub mod catalog {
    use super::Permission;

    pub const FINANCE_VIEW: Permission = Permission::from_static("finance.view", 7);
    pub const FINANCE_CREATE: Permission = Permission::from_static("finance.create", 7);
    pub const STUDIO_VIEW: Permission = Permission::from_static("studio.view", 6);
    pub const STUDIO_BOOK: Permission = Permission::from_static("studio.book", 6);
    pub const CALENDAR_VIEW: Permission = Permission::from_static("calendar.view", 8);
    pub const SOCIAL_POST: Permission = Permission::from_static("social.post", 6);
    pub const USERS_VIEW: Permission = Permission::from_static("users.view", 5);
    pub const PORTAL_VIEW: Permission = Permission::from_static("portal.view", 6);
}

impl Permission {
    const fn from_static(raw: &'static str, separator: usize) -> Self {
        Self {
            raw: Cow::Borrowed(raw),
            separator: Some(separator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_separator() {
        let p = Permission::new("studio.rooms.book");
        assert_eq!(p.scope(), "studio");
        assert_eq!(p.action(), "rooms.book");
        assert!(p.has_separator());
    }

    #[test]
    fn missing_separator_is_scope_with_empty_action() {
        let p = Permission::new("financeview");
        assert_eq!(p.scope(), "financeview");
        assert_eq!(p.action(), "");
        assert!(!p.has_separator());
        assert_eq!(p.wildcard_scope(), None);
    }

    #[test]
    fn strict_parse_rejects_malformed_input() {
        assert!(Permission::parse_strict("financeview").is_err());
        assert!(Permission::parse_strict(".view").is_err());
        assert!(Permission::parse_strict("finance.").is_err());
        assert!(Permission::parse_strict("finance.*").is_err());
        assert_eq!(Permission::parse_strict("finance.view").unwrap().as_str(), "finance.view");
    }

    #[test]
    fn catalog_entries_agree_with_runtime_parsing() {
        for p in [
            catalog::FINANCE_VIEW,
            catalog::FINANCE_CREATE,
            catalog::STUDIO_VIEW,
            catalog::STUDIO_BOOK,
            catalog::CALENDAR_VIEW,
            catalog::SOCIAL_POST,
            catalog::USERS_VIEW,
            catalog::PORTAL_VIEW,
        ] {
            assert_eq!(p, Permission::new(p.as_str().to_string()));
        }
    }

    #[test]
    fn split_scope_matches_permission_scope() {
        assert_eq!(split_scope("social.post"), Some("social"));
        assert_eq!(split_scope("social"), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Permission::new("portal.view")).unwrap();
        assert_eq!(json, "\"portal.view\"");
        let p: Permission = serde_json::from_str("\"calendar.view\"").unwrap();
        assert_eq!(p.action(), "view");
    }
}
