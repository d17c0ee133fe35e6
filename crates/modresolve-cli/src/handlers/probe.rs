//! Probe command handler.
//!
//! Runs a single resolution with the engine activated and prints the engine's
//! log lines followed by a summary of every probed candidate.

use anyhow::Result;
use modresolve_core::{ModuleRequest, SharedLogSink};
use modresolve_runtime::ResolutionReport;

use super::stdout_sink;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments of the probe command.
#[derive(Debug, Clone, Default)]
pub struct ProbeArgs {
    pub name: String,
    pub paths: Vec<String>,
    pub requested_by: Option<String>,
    pub skip_satellites: bool,
}

/// Execute the probe command.
///
/// Fails with [`CliError::Unresolved`] when the engine has no answer.
pub fn execute(ctx: &CliContext, args: &ProbeArgs) -> Result<()> {
    let report = run(ctx, args, stdout_sink())?;
    print!("{}", render(&report));

    if report.resolution.is_resolved() {
        Ok(())
    } else {
        Err(CliError::Unresolved(format!(
            "Module '{}' was not resolved: {}",
            args.name, report.resolution
        ))
        .into())
    }
}

/// Activate, resolve once and deactivate.
pub fn run(ctx: &CliContext, args: &ProbeArgs, sink: SharedLogSink) -> Result<ResolutionReport> {
    let mut options = ctx.activation(&args.paths, sink);
    if args.skip_satellites {
        options = options.skip_satellite_modules(true);
    }
    ctx.engine.activate(options).map_err(CliError::from)?;

    let mut request = ModuleRequest::new(args.name.as_str());
    if let Some(ref requester) = args.requested_by {
        request = request.requested_by(requester.as_str());
    }
    let report = ctx.engine.resolve(&request);
    ctx.engine.deactivate();
    Ok(report)
}

/// Render a report as a short summary.
pub fn render(report: &ResolutionReport) -> String {
    let attempts = report.attempts.iter().map(|attempt| {
        format!("  {}  {}", attempt.outcome, attempt.candidate.display())
    });
    std::iter::once(format!("Result: {}", report.resolution))
        .chain(attempts)
        .map(|line| line + "\n")
        .collect()
}
