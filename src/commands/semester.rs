//! Semester preference CLI commands.

use clap::{Args, Subcommand};

use theday_core::error::AppError;
use theday_entity::transcript::{SemesterSelection, Subject};
use theday_service::{PreferencesService, SessionContext};

use super::transcript::SubjectRow;
use crate::output::{self, OutputFormat};

/// Arguments for the semester command
#[derive(Debug, Args)]
pub struct SemesterArgs {
    /// Semester index, `custom`, or `unset`; omitted shows the selection
    pub value: Option<String>,
}

/// Arguments for custom semester commands
#[derive(Debug, Args)]
pub struct CustomArgs {
    /// Custom semester subcommand
    #[command(subcommand)]
    pub command: CustomCommand,
}

/// Custom semester subcommands
#[derive(Debug, Subcommand)]
pub enum CustomCommand {
    /// Save the custom semester
    Set {
        /// Subject abbreviations
        #[arg(required = true)]
        subjects: Vec<String>,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show the custom semester
    Show,
    /// Forget the custom semester
    Clear,
}

fn parse_selection(value: &str) -> Result<SemesterSelection, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "custom" => Ok(SemesterSelection::Custom),
        "unset" | "none" => Ok(SemesterSelection::Unset),
        other => other.parse().map(SemesterSelection::Index).map_err(|_| {
            AppError::validation(format!(
                "Invalid semester '{value}': expected an index, 'custom', or 'unset'"
            ))
        }),
    }
}

fn rows(subjects: &[Subject], semester: u32) -> Vec<SubjectRow> {
    subjects
        .iter()
        .map(|subject| SubjectRow {
            semester,
            abbreviation: subject.abbreviation.clone(),
            name: subject.name.clone(),
        })
        .collect()
}

/// Execute the semester command
pub async fn execute(
    args: &SemesterArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let resolution = super::bootstrap(ctx, None, format).await;
    let prefs = PreferencesService::new(ctx);

    if let Some(value) = &args.value {
        let selection = parse_selection(value)?;
        prefs.select(&resolution.transcript, selection).await?;
        if format == OutputFormat::Table {
            output::done(&format!("Selected {selection}"));
        }
    }

    match prefs.current(&resolution.transcript).await {
        Some(view) => output::print_item(&view, format, |view| {
            output::field("Semester", &view.name);
            let index = match view.selection {
                SemesterSelection::Index(index) => index,
                _ => 0,
            };
            output::print_list(&rows(&view.subjects, index), OutputFormat::Table);
        }),
        None => output::print_item(&prefs.selection().await, format, |selection| {
            output::field("Semester", &selection.to_string());
        }),
    }
    Ok(())
}

/// Execute custom semester commands
pub async fn custom(
    args: &CustomArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let resolution = super::bootstrap(ctx, None, format).await;
    let prefs = PreferencesService::new(ctx);

    match &args.command {
        CustomCommand::Set { subjects, name } => {
            let custom = prefs
                .set_custom_semester(&resolution.transcript, name.as_deref(), subjects)
                .await?;
            output::print_item(&custom, format, |custom| {
                output::done(&format!(
                    "Saved {} with {} subjects",
                    custom.name,
                    custom.subjects.len()
                ));
            });
        }
        CustomCommand::Show => {
            let custom = prefs.custom_semester(&resolution.transcript).await;
            output::print_item(&custom, format, |custom| {
                output::field("Name", &custom.name);
                output::print_list(&rows(&custom.subjects, 0), OutputFormat::Table);
                if !custom.missing.is_empty() {
                    output::warn(&format!(
                        "Not in the {} transcript: {}",
                        resolution.class_name,
                        custom.missing.join(", ")
                    ));
                }
            });
        }
        CustomCommand::Clear => {
            prefs.clear_custom_semester().await;
            if format == OutputFormat::Table {
                output::done("Custom semester cleared");
            }
        }
    }
    Ok(())
}
