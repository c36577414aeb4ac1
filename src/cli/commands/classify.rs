//! Classify Command
//!
//! Show how a question is scored, without calling any provider.

use crate::cli::{CommandContext, Output};
use crate::routing::classifier::{class_for, score};
use crate::types::Result;

pub fn run(ctx: &CommandContext, question: &str) -> Result<()> {
    let snapshot = ctx.snapshot()?;
    let settings = &snapshot.classifier;
    let breakdown = score(question, settings);
    let class = class_for(breakdown.total, settings.threshold);

    let output = Output::new();
    output.section("Complexity");
    output.field("complex", format_hits(&breakdown.complex_hits));
    output.field("simple", format_hits(&breakdown.simple_hits));
    output.field("long", breakdown.long_question);
    output.field("multiple ?", breakdown.multiple_questions);
    output.field("reasoning", breakdown.reasoning_requested);
    output.field(
        "score",
        format!("{} (threshold {})", breakdown.total, settings.threshold),
    );
    output.field("class", class);
    output.field("pool", class.pool_key());
    Ok(())
}

fn format_hits(hits: &[String]) -> String {
    if hits.is_empty() {
        "-".to_string()
    } else {
        hits.join(", ")
    }
}
