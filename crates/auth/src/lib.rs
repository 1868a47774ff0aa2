//! `studiodesk-auth` — role-based access control for the agency dashboard.
//!
//! Deny-by-default evaluation of `scope.action` permissions against a static
//! per-role grant table. Decoupled from HTTP, storage and sessions: callers
//! resolve the user's [`Role`] and decide what a denial means.

pub mod authorize;
pub mod config;
pub mod grant;
pub mod permissions;
pub mod principal;
pub mod registry;
pub mod roles;
pub mod table;

pub use authorize::{
    ActionAuthorization, AuthorizationExplanation, AuthzError, DenialKind, DenialReason, authorize,
    authorize_action, explain,
};
pub use config::{ConfigError, GRANTS_PATH_ENV, GrantTableSource};
pub use grant::{Grant, RoleGrants};
pub use permissions::{Permission, catalog};
pub use principal::Principal;
pub use registry::{GrantDefinition, RbacRegistry, RoleDefinition};
pub use roles::Role;
pub use table::{GrantTable, builtin_table, has_permission};
