//! Semester selection and the user-curated custom semester.

use serde::Serialize;
use tracing::{debug, info};

use theday_cache::ClientState;
use theday_core::error::AppError;
use theday_core::result::AppResult;
use theday_entity::transcript::{SemesterSelection, Subject, Transcript};

use crate::context::SessionContext;

/// Display name of a custom semester saved without one.
pub const DEFAULT_CUSTOM_NAME: &str = "My Semester";

/// The semester the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterView {
    /// The persisted selection.
    pub selection: SemesterSelection,
    /// Heading to display.
    pub name: String,
    /// Subjects to list.
    pub subjects: Vec<Subject>,
}

/// The custom semester resolved against a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomSemester {
    /// Display name.
    pub name: String,
    /// Subjects found in the transcript, in the saved order.
    pub subjects: Vec<Subject>,
    /// Saved abbreviations the transcript does not know.
    pub missing: Vec<String>,
}

/// Reads and writes the semester preferences of a session.
#[derive(Debug, Clone)]
pub struct PreferencesService {
    state: ClientState,
}

impl PreferencesService {
    /// Creates a new preferences service.
    pub fn new(ctx: &SessionContext) -> Self {
        Self {
            state: ctx.state.clone(),
        }
    }

    /// The persisted semester selection.
    pub async fn selection(&self) -> SemesterSelection {
        self.state.semester().await
    }

    /// Persist a semester selection after checking it against `transcript`.
    pub async fn select(
        &self,
        transcript: &Transcript,
        selection: SemesterSelection,
    ) -> AppResult<()> {
        match selection {
            SemesterSelection::Index(index) if transcript.semester(index).is_none() => {
                return Err(AppError::validation(format!(
                    "The transcript has no semester {index}"
                )));
            }
            SemesterSelection::Custom if self.state.custom_semester_subjects().await.is_empty() => {
                return Err(AppError::validation("No custom semester has been defined"));
            }
            _ => {}
        }
        self.state.set_semester(selection).await;
        info!(%selection, "Semester selected");
        Ok(())
    }

    /// The selected semester, resolved against `transcript`.
    ///
    /// `None` when nothing is selected or the selected index does not exist
    /// in this transcript (for instance after switching class).
    pub async fn current(&self, transcript: &Transcript) -> Option<SemesterView> {
        let selection = self.selection().await;
        match selection {
            SemesterSelection::Unset => None,
            SemesterSelection::Index(index) => {
                let Some(semester) = transcript.semester(index) else {
                    debug!(index, "Selected semester is not in this transcript");
                    return None;
                };
                Some(SemesterView {
                    selection,
                    name: format!("Semester {index}"),
                    subjects: semester.subjects.clone(),
                })
            }
            SemesterSelection::Custom => {
                let custom = self.custom_semester(transcript).await;
                Some(SemesterView {
                    selection,
                    name: custom.name,
                    subjects: custom.subjects,
                })
            }
        }
    }

    /// The saved custom semester, resolved against `transcript`.
    pub async fn custom_semester(&self, transcript: &Transcript) -> CustomSemester {
        let name = self
            .state
            .custom_semester_name()
            .await
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CUSTOM_NAME.to_string());

        let mut subjects = Vec::new();
        let mut missing = Vec::new();
        for abbreviation in self.state.custom_semester_subjects().await {
            match transcript.find_subject(&abbreviation) {
                Some(subject) => subjects.push(subject.clone()),
                None => missing.push(abbreviation),
            }
        }
        CustomSemester {
            name,
            subjects,
            missing,
        }
    }

    /// Save a custom semester made of `abbreviations`.
    ///
    /// Abbreviations are matched case-insensitively, stored with the
    /// transcript's casing, and de-duplicated in order. Every abbreviation
    /// must exist in `transcript`.
    pub async fn set_custom_semester(
        &self,
        transcript: &Transcript,
        name: Option<&str>,
        abbreviations: &[String],
    ) -> AppResult<CustomSemester> {
        let mut subjects: Vec<Subject> = Vec::new();
        let mut unknown: Vec<&str> = Vec::new();
        for abbreviation in abbreviations.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            match transcript.find_subject(abbreviation) {
                Some(subject) => {
                    if !subjects.iter().any(|s| s.abbreviation == subject.abbreviation) {
                        subjects.push(subject.clone());
                    }
                }
                None => unknown.push(abbreviation),
            }
        }

        if !unknown.is_empty() {
            return Err(AppError::validation(format!(
                "Unknown subjects: {}",
                unknown.join(", ")
            )));
        }
        if subjects.is_empty() {
            return Err(AppError::validation(
                "A custom semester needs at least one subject",
            ));
        }

        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CUSTOM_NAME)
            .to_string();
        let stored: Vec<String> = subjects.iter().map(|s| s.abbreviation.clone()).collect();
        self.state.set_custom_semester_subjects(&stored).await;
        self.state.set_custom_semester_name(&name).await;
        info!(name = %name, subjects = stored.len(), "Custom semester saved");

        Ok(CustomSemester {
            name,
            subjects,
            missing: Vec::new(),
        })
    }

    /// Forget the custom semester; a selection pointing at it is unset.
    pub async fn clear_custom_semester(&self) {
        self.state.clear_custom_semester().await;
        if self.selection().await == SemesterSelection::Custom {
            self.state.set_semester(SemesterSelection::Unset).await;
        }
        info!("Custom semester cleared");
    }
}
