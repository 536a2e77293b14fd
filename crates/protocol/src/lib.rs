use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const COMMAND_API_VERSION: u32 = 1;

pub const NO_SPECIES_SELECTED: &str = "Please select at least one species.";
pub const NO_FILTER_SELECTED: &str = "Please select at least one trait and value.";
pub const NO_MATCHING_SPECIES: &str = "No matching species found.";

/// Why a page produced no table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// A required choice has not been made yet.
    NoSelection,
    /// The choices are well formed but nothing matched.
    NoMatches,
}

impl AdvisoryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AdvisoryKind::NoSelection => "no_selection",
            AdvisoryKind::NoMatches => "no_matches",
        }
    }

    /// `NoMatches` is rendered as a warning, `NoSelection` as a plain prompt.
    pub const fn is_warning(self) -> bool {
        matches!(self, AdvisoryKind::NoMatches)
    }
}

/// User-facing notice that is not an error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_species_selected() -> Self {
        Self::new(AdvisoryKind::NoSelection, NO_SPECIES_SELECTED)
    }

    pub fn no_filter_selected() -> Self {
        Self::new(AdvisoryKind::NoSelection, NO_FILTER_SELECTED)
    }

    pub fn no_matches() -> Self {
        Self::new(AdvisoryKind::NoMatches, NO_MATCHING_SPECIES)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_kind_is_snake_case_on_the_wire() {
        let raw = serialize_json(&Advisory::no_matches()).unwrap();
        assert_eq!(
            raw,
            r#"{"kind":"no_matches","message":"No matching species found."}"#
        );
    }

    #[test]
    fn only_no_matches_is_a_warning() {
        assert!(AdvisoryKind::NoMatches.is_warning());
        assert!(!AdvisoryKind::NoSelection.is_warning());
        assert_ne!(
            Advisory::no_species_selected().message,
            Advisory::no_filter_selected().message
        );
    }

    #[test]
    fn error_envelope_omits_missing_hint() {
        let raw = serialize_json(&ErrorEnvelope::new("unknown_species", "nope")).unwrap();
        assert!(!raw.contains("hint"));
        let raw = serialize_json(&ErrorEnvelope::new("x", "y").with_hint("z")).unwrap();
        assert!(raw.contains(r#""hint":"z""#));
    }
}
