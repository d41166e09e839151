use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A category label chosen by the human reviewer for a requirement.
///
/// The labels are wire values shared with the classification backend, so
/// their spellings are kept exactly as the backend expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Classification {
    /// No classification chosen yet.
    #[default]
    Unclassified,
    /// A functional requirement.
    Functional,
    /// Non-functional: security.
    Security,
    /// Non-functional: availability.
    Availability,
    /// Non-functional: legal.
    Legal,
    /// Non-functional: look and feel.
    LookAndFeel,
    /// Non-functional: maintainability.
    Maintainability,
    /// Non-functional: operational.
    Operational,
    /// Non-functional: performance.
    Performance,
    /// Non-functional: scalability.
    Scalability,
    /// Non-functional: usability.
    Usability,
    /// Non-functional: fault tolerance.
    FaultTolerance,
    /// Non-functional: portability.
    Portability,
    /// The sentence is not a requirement of the system under review.
    OutOfScope,
}

impl Classification {
    /// Every label, in the order the selection control lists them.
    pub const ALL: [Self; 14] = [
        Self::Unclassified,
        Self::Functional,
        Self::Security,
        Self::Availability,
        Self::Legal,
        Self::LookAndFeel,
        Self::Maintainability,
        Self::Operational,
        Self::Performance,
        Self::Scalability,
        Self::Usability,
        Self::FaultTolerance,
        Self::Portability,
        Self::OutOfScope,
    ];

    /// The neutral label shown before the reviewer makes a choice.
    pub const PLACEHOLDER: Self = Self::Unclassified;

    /// Returns the label as displayed and exchanged with the backend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unclassified => "---",
            Self::Functional => "Functional",
            Self::Security => "NF - Security",
            Self::Availability => "NF - Availability",
            Self::Legal => "NF - Legal",
            Self::LookAndFeel => "NF - Look and Feel",
            Self::Maintainability => "NF - Maintenability",
            Self::Operational => "NF - Operacional",
            Self::Performance => "NF - Performance",
            Self::Scalability => "NF - Scalability",
            Self::Usability => "NF - Usability",
            Self::FaultTolerance => "NF - Fault Tolerance",
            Self::Portability => "NF - Portability",
            Self::OutOfScope => "Out of Scope",
        }
    }

    /// Returns `true` for the placeholder label.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::Unclassified)
    }

    /// The label as stored by the persistence layer.
    ///
    /// The placeholder is stored as an empty string.
    #[must_use]
    pub const fn persisted_label(self) -> &'static str {
        if self.is_placeholder() {
            ""
        } else {
            self.label()
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string is not one of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown classification label: '{0}'")]
pub struct UnknownClassification(pub String);

impl FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|classification| classification.label() == s)
            .ok_or_else(|| UnknownClassification(s.to_string()))
    }
}

impl TryFrom<String> for Classification {
    type Error = UnknownClassification;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Classification> for &'static str {
    fn from(classification: Classification) -> Self {
        classification.label()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn fourteen_labels_starting_with_placeholder() {
        assert_eq!(Classification::ALL.len(), 14);
        assert_eq!(Classification::ALL[0], Classification::PLACEHOLDER);
        assert_eq!(Classification::ALL[13], Classification::OutOfScope);
    }

    #[test]
    fn default_is_placeholder() {
        assert!(Classification::default().is_placeholder());
    }

    #[test_case("---", Classification::Unclassified)]
    #[test_case("Functional", Classification::Functional)]
    #[test_case("NF - Maintenability", Classification::Maintainability)]
    #[test_case("NF - Operacional", Classification::Operational)]
    #[test_case("Out of Scope", Classification::OutOfScope)]
    fn parses_wire_label(label: &str, expected: Classification) {
        assert_eq!(label.parse::<Classification>().unwrap(), expected);
        assert_eq!(expected.to_string(), label);
    }

    #[test]
    fn parsing_is_exact() {
        let error = "functional".parse::<Classification>().unwrap_err();
        assert_eq!(error, UnknownClassification("functional".to_string()));
    }

    #[test]
    fn placeholder_is_persisted_as_empty() {
        assert_eq!(Classification::Unclassified.persisted_label(), "");
        assert_eq!(Classification::Legal.persisted_label(), "NF - Legal");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Classification::LookAndFeel).unwrap();
        assert_eq!(json, "\"NF - Look and Feel\"");
        let back: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Classification::LookAndFeel);
    }
}
