//! Transcript wire and cache models.

use serde::{Deserialize, Serialize};

/// One course of a semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Display name.
    pub name: String,
    /// Short unique abbreviation; also the subject-cache key.
    pub abbreviation: String,
}

impl Subject {
    /// Create a subject.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
        }
    }
}

/// One semester of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    /// Semester index as shown to students.
    pub index: u32,
    /// Subjects taught in this semester.
    #[serde(rename = "subject", default)]
    pub subjects: Vec<Subject>,
}

/// A class curriculum as cached on the device: `{semesters: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Ordered semesters.
    #[serde(default)]
    pub semesters: Vec<Semester>,
}

impl Transcript {
    /// Create a transcript from semesters.
    pub fn new(semesters: Vec<Semester>) -> Self {
        Self { semesters }
    }

    /// Look up a semester by its index.
    pub fn semester(&self, index: u32) -> Option<&Semester> {
        self.semesters.iter().find(|s| s.index == index)
    }

    /// Iterate every subject of every semester.
    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.semesters.iter().flat_map(|s| s.subjects.iter())
    }

    /// Find a subject by abbreviation (case-insensitive).
    pub fn find_subject(&self, abbreviation: &str) -> Option<&Subject> {
        self.subjects()
            .find(|s| s.abbreviation.eq_ignore_ascii_case(abbreviation))
    }

    /// Case-insensitive substring search over subject names and abbreviations.
    ///
    /// Each subject appears at most once even if several semesters list it.
    pub fn search(&self, query: &str) -> Vec<&Subject> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<&Subject> = Vec::new();
        for subject in self.subjects() {
            let matches = subject.name.to_lowercase().contains(&needle)
                || subject.abbreviation.to_lowercase().contains(&needle);
            if matches && !hits.iter().any(|h| h.abbreviation == subject.abbreviation) {
                hits.push(subject);
            }
        }
        hits
    }
}

/// Transcript document returned by `GET /api/getTranscript`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Class id (the access key).
    #[serde(rename = "_id")]
    pub id: String,
    /// Class name; also the per-class cache key.
    pub class: String,
    /// Semesters.
    #[serde(default)]
    pub data: Vec<Semester>,
}

impl TranscriptRecord {
    /// Split into the class name and the cacheable transcript.
    pub fn into_parts(self) -> (String, Transcript) {
        (self.class, Transcript::new(self.data))
    }
}

/// Class identity returned by `GET /api/getTranscriptName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptName {
    /// Class id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Class name.
    pub class: String,
}
