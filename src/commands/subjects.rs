//! Subject lookup CLI command.

use clap::Args;

use theday_core::error::AppError;
use theday_entity::transcript::Transcript;
use theday_service::SessionContext;

use super::transcript::{SubjectRow, subject_rows};
use crate::output::{self, OutputFormat};

/// Arguments for the subjects command
#[derive(Debug, Args)]
pub struct SubjectsArgs {
    /// Case-insensitive search over names and abbreviations
    #[arg(short, long)]
    pub search: Option<String>,
}

/// Execute the subjects command
pub async fn execute(
    args: &SubjectsArgs,
    ctx: &SessionContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let resolution = super::bootstrap(ctx, None, format).await;

    let rows = match &args.search {
        Some(query) => search_rows(&resolution.transcript, query),
        None => subject_rows(&resolution.transcript),
    };
    output::print_list(&rows, format);
    Ok(())
}

fn search_rows(transcript: &Transcript, query: &str) -> Vec<SubjectRow> {
    transcript
        .search(query)
        .into_iter()
        .map(|subject| SubjectRow {
            semester: transcript
                .semesters
                .iter()
                .find(|s| s.subjects.iter().any(|x| x.abbreviation == subject.abbreviation))
                .map_or(0, |s| s.index),
            abbreviation: subject.abbreviation.clone(),
            name: subject.name.clone(),
        })
        .collect()
}
