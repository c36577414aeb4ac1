//! Config Command
//!
//! Inspect and bootstrap the routing document.
//!
//! Usage:
//!   voxroute config show [-f json]
//!   voxroute config path
//!   voxroute config init [--force]
//!   voxroute config validate

use crate::cli::{CommandContext, Output};
use crate::config::{
    DocumentFormat, ProviderPool, RoutingLoader, SettingsLoader, env_reference_name,
};
use crate::routing::ProviderDefinition;
use crate::types::{ComplexityClass, Result};

/// Show the routing document with credentials masked
pub fn show(ctx: &CommandContext, format: &str) -> Result<()> {
    let path = ctx.routing_path();

    if format == "json" {
        let content = std::fs::read_to_string(path)?;
        let mut doc = RoutingLoader::parse(&content, DocumentFormat::from_path(path))?;
        for pool in [doc.audio_providers.as_mut(), doc.text_providers.as_mut()]
            .into_iter()
            .flatten()
        {
            mask_credentials(pool);
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let snapshot = ctx.snapshot()?;
    let output = Output::new();
    println!("# Routing document: {}", path.display());

    for class in [ComplexityClass::SimpleAudio, ComplexityClass::ComplexText] {
        output.section(class.pool_key());
        for (name, entry) in snapshot.pool(class) {
            let definition = ProviderDefinition::materialize(name, class, entry);
            println!(
                "  {:<16} {:<8} weight={:<4} priority={:<4} model={} format={}{}",
                name,
                if entry.is_enabled() { "enabled" } else { "disabled" },
                entry.pool_weight(),
                definition.priority,
                definition.model,
                definition.response_format,
                definition
                    .tts_provider
                    .as_deref()
                    .map(|engine| format!(" tts={}", engine))
                    .unwrap_or_default(),
            );
        }
    }

    let selection = &snapshot.selection;
    output.section("Selection");
    output.field("timeout", format!("{} ms", selection.timeout.as_millis()));
    output.field("fallback", selection.fallback_on_error);
    output.field("retries", selection.max_retries);
    output.field(
        "reload",
        format!("{} ms", selection.reload_interval.as_millis()),
    );
    output.field("threshold", snapshot.classifier.threshold);
    Ok(())
}

/// Show settings and routing document locations
pub fn path(ctx: &CommandContext) -> Result<()> {
    let output = Output::new();
    let mark = |exists: bool| if exists { "" } else { " (not found)" };

    if let Some(global) = SettingsLoader::global_settings_path() {
        output.field("global", format!("{}{}", global.display(), mark(global.exists())));
    }
    let project = SettingsLoader::project_settings_path();
    output.field("project", format!("{}{}", project.display(), mark(project.exists())));
    let routing = ctx.routing_path();
    output.field("routing", format!("{}{}", routing.display(), mark(routing.exists())));
    Ok(())
}

/// Write a starter routing document
pub fn init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = RoutingLoader::init(ctx.routing_path(), force)?;
    Output::new().success(&format!("Created routing document: {}", path.display()));
    Ok(())
}

/// Validate the routing document and report unusable providers
pub fn validate(ctx: &CommandContext) -> Result<()> {
    let output = Output::new();
    let snapshot = ctx.snapshot()?;

    let mut unusable = 0;
    for (class, name, entry) in snapshot.enabled_providers() {
        let definition = ProviderDefinition::materialize(name, class, entry);
        if let Some(reason) = definition.unusable_reason() {
            unusable += 1;
            output.warning(&format!("{} ({}): {}", name, class, reason));
        } else if definition.credential().is_none() {
            let hint = entry
                .api_key
                .as_deref()
                .and_then(env_reference_name)
                .map(|var| format!("${} is not set", var))
                .unwrap_or_else(|| "apiKey does not resolve".to_string());
            output.warning(&format!("{} ({}): {}", name, class, hint));
        }
    }

    output.success(&format!(
        "{} is valid: {} audio, {} text providers{}",
        ctx.routing_path().display(),
        snapshot.audio_providers.len(),
        snapshot.text_providers.len(),
        if unusable > 0 {
            format!(", {} unusable", unusable)
        } else {
            String::new()
        }
    ));
    Ok(())
}

/// Replace literal credentials, keeping `${VAR}` references readable
fn mask_credentials(pool: &mut ProviderPool) {
    for entry in pool.values_mut() {
        if let Some(key) = entry.api_key.as_mut()
            && env_reference_name(key).is_none()
        {
            *key = "********".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_credentials_keeps_env_references() {
        let mut doc = crate::config::sample_document();
        let pool = doc.audio_providers.as_mut().unwrap();
        mask_credentials(pool);
        assert_eq!(pool["openai_realtime"].api_key.as_deref(), Some("${OPENAI_API_KEY}"));
        assert_eq!(pool["gemini_live"].api_key.as_deref(), Some("********"));
    }
}
