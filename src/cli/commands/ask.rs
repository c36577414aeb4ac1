//! Ask Command
//!
//! Answer one question end to end.
//!
//! Usage:
//!   voxroute ask "Quelle heure est-il ?" [--out answer.mp3] [--stats]

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::cli::{CommandContext, Output};
use crate::types::{ResponsePayload, Result, VendorError, VoxError};

pub async fn run(ctx: &CommandContext, question: &str, out: Option<&Path>, stats: bool) -> Result<()> {
    let output = Output::new();
    let orchestrator = ctx.orchestrator()?;
    let answer = orchestrator.ask(question).await?;

    match &answer.payload {
        ResponsePayload::Audio(encoded) => {
            let audio = BASE64.decode(encoded).map_err(|e| {
                VoxError::DispatchFailure(VendorError::malformed(
                    format!("audio payload is not base64: {}", e),
                    answer.provider.as_str(),
                ))
            })?;
            match out {
                Some(path) => {
                    std::fs::write(path, &audio)?;
                    output.success(&format!(
                        "Audio written to {} ({} bytes)",
                        path.display(),
                        audio.len()
                    ));
                }
                None => output.info(&format!(
                    "Audio answer ({} bytes); use --out to save it",
                    audio.len()
                )),
            }
        }
        ResponsePayload::Text(text) => {
            if out.is_some() {
                output.warning("Text answer, nothing written");
            }
            println!("{}", text);
        }
    }

    output.section("Answer");
    output.field("provider", &answer.provider);
    output.field("class", answer.class);
    output.field("attempts", answer.attempts);
    if let Some(engine) = &answer.speech_engine {
        output.field("speech", engine);
    }
    output.field("elapsed", format!("{} ms", answer.elapsed.as_millis()));
    output.field("request", &answer.request_id);

    if stats {
        let summary = orchestrator.stats().summary();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
