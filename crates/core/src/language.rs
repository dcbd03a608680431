//! Language definitions
//!
//! The assistant answers in English (primary) or Urdu (secondary). Urdu
//! arrives either in Perso-Arabic script or romanized in Latin script.

use serde::{Deserialize, Serialize};

/// Supported answer languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Urdu,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Urdu => "ur",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Urdu => "Urdu",
        }
    }

    /// Native script of the language
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Urdu => Script::Arabic,
        }
    }

    /// The language used when nothing else is known
    pub fn primary() -> Self {
        Self::English
    }

    /// Parse from string (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" => Some(Self::English),
            "ur" | "urd" | "urdu" | "roman urdu" => Some(Self::Urdu),
            _ => None,
        }
    }

    pub fn all() -> &'static [Language] {
        &[Self::English, Self::Urdu]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Writing systems seen in user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Arabic,
}

impl Script {
    /// Unicode ranges covering this script's letters
    pub fn unicode_ranges(&self) -> &'static [(u32, u32)] {
        match self {
            Self::Latin => &[(0x0041, 0x005A), (0x0061, 0x007A), (0x00C0, 0x024F)],
            // Arabic, Arabic Supplement, Presentation Forms A and B
            Self::Arabic => &[
                (0x0600, 0x06FF),
                (0x0750, 0x077F),
                (0xFB50, 0xFDFF),
                (0xFE70, 0xFEFF),
            ],
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        self.unicode_ranges()
            .iter()
            .any(|&(start, end)| code >= start && code <= end)
    }

    /// Fraction of alphabetic characters in `text` written in this script.
    ///
    /// Returns 0.0 for text without alphabetic characters.
    pub fn proportion(&self, text: &str) -> f32 {
        let mut alphabetic = 0usize;
        let mut matching = 0usize;
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            alphabetic += 1;
            if self.contains_char(c) {
                matching += 1;
            }
        }
        if alphabetic == 0 {
            0.0
        } else {
            matching as f32 / alphabetic as f32
        }
    }

    /// Detect script from text (returns most frequent script)
    pub fn detect(text: &str) -> Option<Self> {
        let latin = text.chars().filter(|c| Self::Latin.contains_char(*c)).count();
        let arabic = text.chars().filter(|c| Self::Arabic.contains_char(*c)).count();
        match (latin, arabic) {
            (0, 0) => None,
            (l, a) if a > l => Some(Self::Arabic),
            _ => Some(Self::Latin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Urdu.code(), "ur");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str_loose("ur"), Some(Language::Urdu));
        assert_eq!(Language::from_str_loose("URDU"), Some(Language::Urdu));
        assert_eq!(Language::from_str_loose(" english "), Some(Language::English));
        assert_eq!(Language::from_str_loose("hindi"), None);
    }

    #[test]
    fn test_script_detect() {
        assert_eq!(Script::detect("Hello world"), Some(Script::Latin));
        assert_eq!(Script::detect("دفعہ 420 کیا ہے"), Some(Script::Arabic));
        assert_eq!(Script::detect("420 ?"), None);
    }

    #[test]
    fn test_script_proportion() {
        assert_eq!(Script::Arabic.proportion("123"), 0.0);
        assert!(Script::Arabic.proportion("قانون") > 0.99);
        let mixed = Script::Arabic.proportion("section قانون");
        assert!(mixed > 0.3 && mixed < 0.6);
    }
}
