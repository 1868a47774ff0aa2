use std::process::ExitCode;

use clap::Parser;

use studiodesk_cli::{Cli, Outcome, run};
use studiodesk_observability::tracing::{LogFormat, init_with_default};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let format = if cli.verbose { LogFormat::Compact } else { LogFormat::Json };
    init_with_default(format, if cli.verbose { "debug" } else { "warn" });

    let outcome = run(&cli, &mut std::io::stdout().lock())?;
    Ok(match outcome {
        Outcome::Allowed | Outcome::Done => ExitCode::SUCCESS,
        Outcome::Denied => ExitCode::FAILURE,
    })
}
