//! Transcript CLI command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use theday_core::error::AppError;
use theday_entity::transcript::Transcript;
use theday_service::SessionContext;

use crate::output::{self, OutputFormat};

/// Arguments for the transcript command
#[derive(Debug, Args)]
pub struct TranscriptArgs {
    /// Class id to resolve (`default` for the bundled transcript);
    /// omitted means the active class
    #[arg(long)]
    pub q: Option<String>,
}

/// Subject display row
#[derive(Debug, Serialize, Tabled)]
pub struct SubjectRow {
    /// Semester index
    pub semester: u32,
    /// Abbreviation
    pub abbreviation: String,
    /// Subject name
    pub name: String,
}

/// Flatten a transcript into display rows
pub fn subject_rows(transcript: &Transcript) -> Vec<SubjectRow> {
    transcript
        .semesters
        .iter()
        .flat_map(|semester| {
            semester.subjects.iter().map(|subject| SubjectRow {
                semester: semester.index,
                abbreviation: subject.abbreviation.clone(),
                name: subject.name.clone(),
            })
        })
        .collect()
}

/// Execute the transcript command
pub async fn execute(
    args: &TranscriptArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let resolution = super::bootstrap(ctx, args.q.as_deref(), format).await;

    output::print_item(&resolution, format, |resolution| {
        output::field("Class", &resolution.class_name);
        output::field("Source", &resolution.source.to_string());
        output::field("Semesters", &resolution.transcript.semesters.len().to_string());
        println!();
        output::print_list(&subject_rows(&resolution.transcript), OutputFormat::Table);
    });
    Ok(())
}
