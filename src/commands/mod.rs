//! CLI command definitions and dispatch.

pub mod class;
pub mod materials;
pub mod semester;
pub mod subjects;
pub mod sweep;
pub mod transcript;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use theday_cache::StoreManager;
use theday_core::config::AppConfig;
use theday_core::error::AppError;
use theday_core::traits::clock::SystemClock;
use theday_remote::HttpMaterialsClient;
use theday_service::{Resolution, SessionContext, TranscriptSessionEngine};

use crate::output::{self, OutputFormat};

/// TheDay — course materials, transcripts, and semesters from the terminal
#[derive(Debug, Parser)]
#[command(name = "theday", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve and show the active transcript
    Transcript(transcript::TranscriptArgs),
    /// Validate a class key and make its class active
    Switch(class::SwitchArgs),
    /// List the classes unlocked on this device
    Classes,
    /// List or search the subjects of the active transcript
    Subjects(subjects::SubjectsArgs),
    /// Sync and show the materials of a subject
    Materials(materials::MaterialsArgs),
    /// Show or change the selected semester
    Semester(semester::SemesterArgs),
    /// Manage the custom curated semester
    Custom(semester::CustomArgs),
    /// Run the transcript cache expiry sweep
    Sweep,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let ctx = open_session(config).await?;
        match &self.command {
            Commands::Transcript(args) => transcript::execute(args, &ctx, self.format).await,
            Commands::Switch(args) => class::switch(args, &ctx, self.format).await,
            Commands::Classes => class::list(&ctx, self.format).await,
            Commands::Subjects(args) => subjects::execute(args, &ctx, self.format).await,
            Commands::Materials(args) => materials::execute(args, &ctx, self.format).await,
            Commands::Semester(args) => semester::execute(args, &ctx, self.format).await,
            Commands::Custom(args) => semester::custom(args, &ctx, self.format).await,
            Commands::Sweep => sweep::execute(&ctx, self.format).await,
        }
    }
}

/// Helper: build the session collaborators from configuration
pub async fn open_session(config: AppConfig) -> Result<SessionContext, AppError> {
    let store = Arc::new(StoreManager::new(&config.store).await?);
    let remote = Arc::new(HttpMaterialsClient::new(&config.remote)?);
    Ok(SessionContext::new(
        Arc::new(config),
        store,
        remote,
        Arc::new(SystemClock),
    ))
}

/// Helper: sweep, resolve the active class, and report a forced redirect
pub async fn bootstrap(ctx: &SessionContext, q: Option<&str>, format: OutputFormat) -> Resolution {
    let engine = TranscriptSessionEngine::new(ctx.clone());
    let (_, resolution) = engine.bootstrap(q).await;
    if let (Some(route), OutputFormat::Table) = (&resolution.redirect, format) {
        output::warn(&format!(
            "Class could not be loaded; showing the default transcript ({route})"
        ));
    }
    resolution
}
