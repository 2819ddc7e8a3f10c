//! Cache expiry sweep CLI command.

use theday_core::error::AppError;
use theday_service::{SessionContext, TranscriptSessionEngine};

use crate::output::{self, OutputFormat};

/// Execute the sweep command
pub async fn execute(ctx: &SessionContext, format: OutputFormat) -> Result<(), AppError> {
    let engine = TranscriptSessionEngine::new(ctx.clone());
    let report = engine.sweep().await;

    output::print_item(&report, format, |report| {
        if report.first_run {
            output::done("Recorded the transcript cache timestamp");
        } else if report.expired {
            output::done(&format!(
                "Purged transcripts of {} classes and {} subject caches",
                report.purged_classes.len(),
                report.purged_subjects
            ));
        } else {
            let days = report.age_ms.unwrap_or_default() / 86_400_000;
            output::done(&format!("Caches are fresh ({days} days old)"));
        }
    });
    Ok(())
}
