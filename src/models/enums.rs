use serde::{Deserialize, Serialize};

/// Patient sex as recorded in the roster.
///
/// Roster exports carry it as a free-text column; unrecognized values
/// coerce to `Unknown` at load instead of failing the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Unknown => "unknown",
        }
    }

    /// Coerce a raw roster value. Accepts the export's Portuguese labels
    /// and single-letter codes in any case.
    pub fn from_source(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "f" | "female" | "feminino" => Self::Female,
            "m" | "male" | "masculino" => Self::Male,
            _ => Self::Unknown,
        }
    }
}
