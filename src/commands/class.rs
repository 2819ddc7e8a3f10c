//! Class registry CLI commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use theday_core::error::AppError;
use theday_service::{SessionContext, TranscriptSessionEngine};

use crate::output::{self, OutputFormat};

/// Arguments for the switch command
#[derive(Debug, Args)]
pub struct SwitchArgs {
    /// Class access key (24 hexadecimal characters)
    pub key: String,
}

/// Class display row
#[derive(Debug, Serialize, Tabled)]
struct ClassRow {
    /// Class name
    class: String,
    /// Class id
    id: String,
    /// Active marker
    active: String,
}

/// Execute the switch command
pub async fn switch(
    args: &SwitchArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = TranscriptSessionEngine::new(ctx.clone());
    engine.sweep().await;
    let resolution = engine.switch_class(&args.key).await?;

    match format {
        OutputFormat::Json => output::print_item(&resolution, format, |_| {}),
        OutputFormat::Table if resolution.is_fallback() => {
            output::warn(&format!(
                "Key is valid but the transcript could not be loaded; showing the default transcript ({})",
                resolution.redirect.as_deref().unwrap_or_default()
            ));
        }
        OutputFormat::Table => {
            output::done(&format!("Switched to class {}", resolution.class_name));
        }
    }
    Ok(())
}

/// Execute the classes command
pub async fn list(ctx: &SessionContext, format: OutputFormat) -> Result<(), AppError> {
    let engine = TranscriptSessionEngine::new(ctx.clone());
    let active = engine.active_class_name().await;

    let rows: Vec<ClassRow> = engine
        .registered_classes()
        .await
        .into_iter()
        .map(|entry| ClassRow {
            active: if active.as_deref() == Some(entry.class.as_str()) {
                "✓"
            } else {
                ""
            }
            .to_string(),
            class: entry.class,
            id: entry.id,
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
