//! Paths command handler.
//!
//! Displays the system directories, the registered user directories and the
//! combined search list in probing order.

use std::path::Path;

use anyhow::Result;
use modresolve_runtime::ResolutionEngine;

use crate::bootstrap::CliContext;

/// Execute the paths command.
pub fn execute(ctx: &CliContext, extra_paths: &[String]) -> Result<()> {
    ctx.engine.add_paths(ctx.settings.probing_path_list());
    ctx.engine.add_paths(extra_paths);
    print!("{}", render(&ctx.engine));
    Ok(())
}

pub fn render(engine: &ResolutionEngine) -> String {
    let user = engine.user_paths();
    [
        section("System paths", engine.system_paths().iter()),
        section("User paths", user.iter().map(Path::new)),
        section("Search list", engine.search_list().iter()),
    ]
    .concat()
}

fn section<'a, P>(title: &str, paths: impl Iterator<Item = &'a P>) -> String
where
    P: AsRef<Path> + ?Sized + 'a,
{
    let lines: Vec<String> = paths
        .map(|path| format!("  {}\n", path.as_ref().display()))
        .collect();
    if lines.is_empty() {
        format!("{title}:\n  (none)\n")
    } else {
        format!("{title}:\n{}", lines.concat())
    }
}
