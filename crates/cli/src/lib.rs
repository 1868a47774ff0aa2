//! `studiodesk-authz` — inspect the dashboard's access rules from a shell.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use studiodesk_auth::{GRANTS_PATH_ENV, GrantTableSource, Permission, RbacRegistry, Role, explain};

#[derive(Debug, Parser)]
#[command(name = "studiodesk-authz")]
#[command(about = "Check and explain studiodesk role permissions")]
#[command(version)]
pub struct Cli {
    /// Grant table JSON file (built-in table when omitted)
    #[arg(long, global = true, env = GRANTS_PATH_ENV)]
    pub grants: Option<PathBuf>,

    /// Human-readable logs instead of JSON
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print allow/deny; exits non-zero on deny
    Check { role: String, permission: String },

    /// Print the full decision as JSON
    Explain { role: String, permission: String },

    /// Print every role and its grants as JSON
    Roles,
}

/// What `run` decided, for the binary to turn into an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Denied,
    Done,
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<Outcome> {
    let source = GrantTableSource::from_option(cli.grants.clone());
    let table = source.load().context("loading grant table")?;

    match &cli.command {
        Command::Check { role, permission } => {
            if role.parse::<Role>().is_err() {
                tracing::warn!(%role, "unknown role, denying");
            }
            let allowed = table.allows_role_name(role, permission);
            writeln!(out, "{}", if allowed { "allow" } else { "deny" })?;
            Ok(if allowed { Outcome::Allowed } else { Outcome::Denied })
        }
        Command::Explain { role, permission } => {
            let role: Role = role.parse().context("parsing role")?;
            let explanation = explain(&table, role, &Permission::new(permission.clone()));
            serde_json::to_writer_pretty(&mut *out, &explanation)?;
            writeln!(out)?;
            Ok(if explanation.granted { Outcome::Allowed } else { Outcome::Denied })
        }
        Command::Roles => {
            let registry = RbacRegistry::from_table(&table);
            serde_json::to_writer_pretty(&mut *out, &registry)?;
            writeln!(out)?;
            Ok(Outcome::Done)
        }
    }
}
