//! Rules command handler.

use anyhow::Result;
use modresolve_core::ExclusionRules;

use crate::bootstrap::CliContext;

/// Print the exclusion patterns the engine was built with.
pub fn execute(ctx: &CliContext) -> Result<()> {
    print!("{}", render(&ctx.engine.exclusion_rules()));
    Ok(())
}

pub fn render(rules: &ExclusionRules) -> String {
    if rules.is_empty() {
        return "No exclusion rules configured.\n".to_string();
    }
    let patterns: String = rules
        .patterns()
        .map(|pattern| format!("  {pattern}\n"))
        .collect();
    format!("Exclusion rules ({}):\n{patterns}", rules.len())
}
