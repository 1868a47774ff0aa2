//! Registry of roles and the grants they hold, for audit and display.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Grant, GrantTable, Role};

/// Role definition with its grants.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: String,
    pub grants: Vec<Grant>,
}

/// One distinct grant appearing anywhere in the table.
#[derive(Debug, Clone, Serialize)]
pub struct GrantDefinition {
    pub name: String,
    pub category: String,
    pub description: String,
    /// Roles holding this grant.
    pub roles: Vec<Role>,
}

/// Complete view of a grant table.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: BTreeMap<Role, RoleDefinition>,
    pub grants: BTreeMap<String, GrantDefinition>,
}

impl RbacRegistry {
    pub fn from_table(table: &GrantTable) -> Self {
        let mut roles = BTreeMap::new();
        let mut grants: BTreeMap<String, GrantDefinition> = BTreeMap::new();

        for (role, role_grants) in table.roles() {
            roles.insert(
                role,
                RoleDefinition {
                    name: role,
                    description: role.description().to_string(),
                    grants: role_grants.grants().to_vec(),
                },
            );

            for grant in role_grants.grants() {
                grants
                    .entry(grant.to_string())
                    .or_insert_with(|| GrantDefinition {
                        name: grant.to_string(),
                        category: grant_category(grant),
                        description: grant_description(grant),
                        roles: Vec::new(),
                    })
                    .roles
                    .push(role);
            }
        }

        Self { roles, grants }
    }
}

fn grant_category(grant: &Grant) -> String {
    match grant {
        Grant::Universal => "system".to_string(),
        Grant::Exact { scope, .. } | Grant::ScopeWildcard { scope } => scope.clone(),
    }
}

fn grant_description(grant: &Grant) -> String {
    match grant {
        Grant::Universal => "Every permission in every scope".to_string(),
        Grant::ScopeWildcard { scope } => format!("Any action on {scope}"),
        Grant::Exact { scope, action } => {
            let verb = match action.as_str() {
                "view" => "View",
                "create" => "Create",
                "update" => "Update",
                "delete" => "Delete",
                "post" => "Publish",
                other => other,
            };
            format!("{verb} {scope}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_role_with_description() {
        let registry = RbacRegistry::from_table(&GrantTable::builtin());
        assert_eq!(registry.roles.len(), Role::ALL.len());

        let ops = &registry.roles[&Role::Ops];
        assert_eq!(ops.grants.len(), 4);
        assert!(ops.description.starts_with("Operations"));
    }

    #[test]
    fn shared_grants_collect_all_holders() {
        let registry = RbacRegistry::from_table(&GrantTable::builtin());

        let calendar = &registry.grants["calendar.view"];
        assert_eq!(calendar.roles, vec![Role::Studio, Role::Digital]);
        assert_eq!(calendar.category, "calendar");
        assert_eq!(calendar.description, "View calendar");

        let studio = &registry.grants["studio.*"];
        assert_eq!(studio.roles, vec![Role::Ops, Role::Studio]);
        assert_eq!(studio.description, "Any action on studio");

        assert_eq!(registry.grants["*"].category, "system");
    }
}
