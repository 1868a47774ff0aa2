use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{Grant, GrantTable, Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role {role} lacks permission '{permission}'")]
    Forbidden { role: Role, permission: String },
}

/// Action-side authorization contract (checked before the action runs).
///
/// Implement this on server actions and page guards that require permissions.
pub trait ActionAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
/// - Denials are logged at debug level; what to do about them is up to the caller
pub fn authorize(table: &GrantTable, principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if table.allows(principal.role, required) {
        return Ok(());
    }

    tracing::debug!(
        user_id = %principal.user_id,
        role = %principal.role,
        permission = %required,
        "permission denied"
    );
    Err(AuthzError::Forbidden {
        role: principal.role,
        permission: required.as_str().to_string(),
    })
}

/// Authorize every permission an action requires; the first missing one wins.
pub fn authorize_action<A: ActionAuthorization + ?Sized>(
    table: &GrantTable,
    principal: &Principal,
    action: &A,
) -> Result<(), AuthzError> {
    for perm in action.required_permissions() {
        authorize(table, principal, perm)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// `granted` always agrees with [`GrantTable::allows`] for the same input.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub role: Role,

    /// The permission that was being checked.
    pub required_permission: String,

    pub granted: bool,

    /// The grant that decided the request, if it was allowed.
    pub matched_grant: Option<Grant>,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Every grant the role holds, in table order.
    pub role_grants: Vec<Grant>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,

    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// The role holds no grants at all.
    NoGrants,
    MissingPermission,
}

/// Explain why `role` is (or would be) allowed or denied `required`.
pub fn explain(table: &GrantTable, role: Role, required: &Permission) -> AuthorizationExplanation {
    let required_str = required.as_str();
    let grants = table.grants_for(role);
    let role_grants: Vec<Grant> = grants.map(|g| g.grants().to_vec()).unwrap_or_default();
    let matched_grant = grants.and_then(|g| g.matching_grant(required)).cloned();

    if let Some(grant) = matched_grant {
        let reason = match &grant {
            Grant::Universal => format!("role {role} holds the universal grant '*'"),
            Grant::Exact { .. } => format!("role {role} holds the exact grant '{grant}'"),
            Grant::ScopeWildcard { .. } => format!("role {role} holds the scope wildcard '{grant}'"),
        };
        return AuthorizationExplanation {
            role,
            required_permission: required_str.to_string(),
            granted: true,
            matched_grant: Some(grant),
            reason,
            role_grants,
            denial_reason: None,
            evaluated_at: Utc::now(),
        };
    }

    let denial_reason = if role_grants.is_empty() {
        DenialReason {
            kind: DenialKind::NoGrants,
            message: format!("Role {role} has no grants in this table"),
            suggestions: suggestions(table, role, required),
        }
    } else {
        DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{required_str}'"),
            suggestions: suggestions(table, role, required),
        }
    };

    let checked = if required.has_separator() {
        format!("'{required_str}', '{}.*' or '*'", required.scope())
    } else {
        format!("'{required_str}' or '*'")
    };

    AuthorizationExplanation {
        role,
        required_permission: required_str.to_string(),
        granted: false,
        matched_grant: None,
        reason: format!("role {role} holds none of {checked}"),
        role_grants,
        denial_reason: Some(denial_reason),
        evaluated_at: Utc::now(),
    }
}

fn suggestions(table: &GrantTable, role: Role, required: &Permission) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !required.has_separator() {
        suggestions.push(format!(
            "Permissions are written as 'scope.action'; '{required}' has no separator"
        ));
    }

    let granting: Vec<&str> = table
        .roles_granting(required)
        .into_iter()
        .map(|r| r.as_str())
        .collect();
    if !granting.is_empty() {
        suggestions.push(format!("Roles that would be allowed: {}", granting.join(", ")));
    }

    suggestions.push(format!("Add '{required}' to the grants of role {role}"));
    if required.has_separator() {
        suggestions.push(format!(
            "Or grant the whole scope with '{}.*'",
            required.scope()
        ));
    }
    suggestions
}
