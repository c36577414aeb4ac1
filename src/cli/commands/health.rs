//! Health Command
//!
//! Probe every enabled provider and speech engine.

use crate::ai::CheckKind;
use crate::cli::{CommandContext, Output};
use crate::types::Result;

/// Returns whether every probe passed
pub async fn run(ctx: &CommandContext) -> Result<bool> {
    let output = Output::new();
    let report = ctx.orchestrator()?.health().await;

    for (kind, title) in [(CheckKind::Provider, "Providers"), (CheckKind::Speech, "Speech engines")] {
        output.section(title);
        for check in report.checks.iter().filter(|c| c.kind == kind) {
            let line = format!("{} ({} ms): {}", check.name, check.duration_ms, check.message);
            if !check.passed {
                output.error(&line);
            } else if check.warning.is_some() {
                output.warning(&line);
            } else {
                output.success(&line);
            }
        }
    }

    println!();
    if report.passed {
        output.success(&format!("{} checks passed", report.checks.len()));
    } else {
        output.error(&format!(
            "{} of {} checks failed",
            report.failed_count(),
            report.checks.len()
        ));
    }
    Ok(report.passed)
}
