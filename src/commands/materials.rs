//! Subject materials CLI command.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use theday_core::error::AppError;
use theday_entity::materials::Materials;
use theday_service::{SessionContext, SubjectSyncEngine, SubjectView, SyncOutcome};

use crate::output::{self, OutputFormat};

/// Arguments for the materials command
#[derive(Debug, Args)]
pub struct MaterialsArgs {
    /// Subject abbreviation
    pub subject: String,

    /// Fetch folders first, then files
    #[arg(long)]
    pub split: bool,

    /// JSON file with a listing to show when nothing is cached
    #[arg(long)]
    pub fallback: Option<PathBuf>,
}

/// Material display row
#[derive(Debug, Serialize, Tabled)]
struct MaterialRow {
    /// Category
    category: String,
    /// Name
    name: String,
    /// Kind
    kind: String,
    /// Size
    size: String,
    /// New since the last sync
    new: String,
}

/// JSON report
#[derive(Debug, Serialize)]
struct MaterialsReport<'a> {
    class: &'a str,
    subject: &'a str,
    outcome: &'static str,
    new_items: &'a [String],
    data: Option<&'a Materials>,
}

/// Execute the materials command
pub async fn execute(
    args: &MaterialsArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let resolution = super::bootstrap(ctx, None, format).await;
    let subject = args.subject.trim();
    if resolution.transcript.find_subject(subject).is_none() && format == OutputFormat::Table {
        output::warn(&format!(
            "{subject} is not part of the {} transcript",
            resolution.class_name
        ));
    }

    let fallback = match &args.fallback {
        Some(path) => Some(read_fallback(path).await?),
        None => None,
    };

    let engine = SubjectSyncEngine::for_class(ctx, &resolution.class_name);
    let progress = tokio::spawn({
        let mut rx = engine.subscribe();
        async move {
            while rx.changed().await.is_ok() {
                let phase = rx.borrow_and_update().phase;
                tracing::debug!(%phase, "Sync progress");
                if phase.is_terminal() {
                    break;
                }
            }
        }
    });

    let outcome = if args.split {
        engine.split_sync(subject, fallback).await
    } else {
        engine.load(subject, fallback).await
    };
    progress.abort();

    let view = engine.view();
    let label = match &outcome {
        SyncOutcome::Updated(_) => "updated",
        SyncOutcome::Unchanged => "unchanged",
        SyncOutcome::InFlight => "in_flight",
        SyncOutcome::Aborted => "aborted",
        SyncOutcome::Ignored => "ignored",
        SyncOutcome::Failed(e) => {
            if view.data.is_none() {
                return Err(e.clone());
            }
            if format == OutputFormat::Table {
                output::warn(&format!("Sync failed, showing cached materials: {e}"));
            }
            "failed"
        }
    };

    match format {
        OutputFormat::Json => {
            let report = MaterialsReport {
                class: engine.class_name(),
                subject,
                outcome: label,
                new_items: &view.new_items,
                data: view.data.as_ref(),
            };
            output::print_item(&report, format, |_| {});
        }
        OutputFormat::Table => {
            output::print_list(&material_rows(&view), format);
            if !view.new_items.is_empty() {
                output::done(&format!("{} new since the last sync", view.new_items.len()));
            }
        }
    }
    Ok(())
}

async fn read_fallback(path: &Path) -> Result<Materials, AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::validation(format!("Fallback file {} is not a listing: {e}", path.display()))
    })
}

fn material_rows(view: &SubjectView) -> Vec<MaterialRow> {
    let Some(data) = &view.data else {
        return Vec::new();
    };
    data.iter()
        .flat_map(|(category, files)| {
            files.iter().map(move |file| MaterialRow {
                category: category.to_string(),
                name: file.display_name().to_string(),
                kind: file.kind().to_string(),
                size: file.size.map(format_size).unwrap_or_default(),
                new: if view.is_new(&file.id) { "★" } else { "" }.to_string(),
            })
        })
        .collect()
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
