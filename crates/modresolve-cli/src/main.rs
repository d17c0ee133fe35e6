//! CLI entry point - the composition root.
//!
//! Logging and settings are wired here; command dispatch routes to handlers
//! that operate on the bootstrapped `CliContext`.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use modresolve_cli::handlers::probe::ProbeArgs;
use modresolve_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(&CliConfig {
        settings_path: cli.config,
    })?;

    match command {
        Commands::Probe {
            name,
            paths,
            requested_by,
            skip_satellites,
        } => handlers::probe::execute(
            &ctx,
            &ProbeArgs {
                name,
                paths,
                requested_by,
                skip_satellites,
            },
        ),
        Commands::Paths { paths } => handlers::paths::execute(&ctx, &paths),
        Commands::Rules => handlers::rules::execute(&ctx),
        Commands::Load { name, paths } => handlers::load::execute(&ctx, &name, &paths),
    }
}

fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}
