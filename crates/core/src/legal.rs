//! Legal classification labels

use serde::{Deserialize, Serialize};

/// What the user is trying to do with an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Greetings, thanks, identity questions, small talk
    #[serde(rename = "casual_chat")]
    Casual,
    /// A legal question that goes through retrieval and analysis
    #[serde(rename = "legal_query")]
    Substantive,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual_chat",
            Self::Substantive => "legal_query",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal subject area of a substantive query
///
/// Declaration order is the tie-break priority used by the domain classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Criminal,
    PoliceMisconduct,
    Civil,
    Family,
    Property,
    Commercial,
    Constitutional,
    Procedural,
    Other,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Criminal => "criminal",
            Self::PoliceMisconduct => "police_misconduct",
            Self::Civil => "civil",
            Self::Family => "family",
            Self::Property => "property",
            Self::Commercial => "commercial",
            Self::Constitutional => "constitutional",
            Self::Procedural => "procedural",
            Self::Other => "other",
        }
    }

    /// Label for prose ("criminal law", "police misconduct law")
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Criminal => "Criminal",
            Self::PoliceMisconduct => "Police Misconduct",
            Self::Civil => "Civil",
            Self::Family => "Family",
            Self::Property => "Property",
            Self::Commercial => "Commercial",
            Self::Constitutional => "Constitutional",
            Self::Procedural => "Procedural",
            Self::Other => "General",
        }
    }

    pub fn all() -> &'static [Domain] {
        &[
            Self::Criminal,
            Self::PoliceMisconduct,
            Self::Civil,
            Self::Family,
            Self::Property,
            Self::Commercial,
            Self::Constitutional,
            Self::Procedural,
            Self::Other,
        ]
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::all().iter().copied().find(|d| d.as_str() == s)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
