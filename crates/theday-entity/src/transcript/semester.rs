//! Persisted semester selection with its sentinel encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which semester the dashboard shows.
///
/// Stored as an integer string: `-1` for unset, `-2` for the custom
/// curated semester, otherwise the semester index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SemesterSelection {
    /// No semester chosen yet.
    #[default]
    Unset,
    /// The user-curated subject set.
    Custom,
    /// A transcript semester by index.
    Index(u32),
}

impl SemesterSelection {
    const UNSET: i64 = -1;
    const CUSTOM: i64 = -2;

    /// Decode a stored value. Anything unparseable reads as `Unset`.
    pub fn from_stored(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(Self::CUSTOM) => Self::Custom,
            Ok(n) if n >= 0 => u32::try_from(n).map(Self::Index).unwrap_or(Self::Unset),
            _ => Self::Unset,
        }
    }

    /// Encode for storage.
    pub fn to_stored(self) -> String {
        match self {
            Self::Unset => Self::UNSET.to_string(),
            Self::Custom => Self::CUSTOM.to_string(),
            Self::Index(n) => n.to_string(),
        }
    }
}

impl fmt::Display for SemesterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Custom => write!(f, "custom"),
            Self::Index(n) => write!(f, "semester {n}"),
        }
    }
}
