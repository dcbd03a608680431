//! Language Detection
//!
//! Decides between English and Urdu for an utterance. Perso-Arabic script is
//! checked first, then a lexicon of romanized Urdu function words.

use std::collections::HashSet;

use legal_agent_core::{Language, Script};
use unicode_segmentation::UnicodeSegmentation;

/// Romanized Urdu function words and common verbs
const ROMAN_URDU_MARKERS: &[&str] = &[
    "kya", "kia", "hai", "hy", "hain", "mein", "ka", "ki", "ko", "se", "aap", "hun", "hoon",
    "thi", "tha", "kaise", "kaisay", "kyun", "kyon", "aur", "ya", "nahi", "nahin", "mera",
    "meri", "mere", "mujhe", "mujhay", "kaun", "kab", "kahan", "chahiye", "sakta", "sakti",
    "karna", "karen", "karein", "batao", "bataen", "bataiye", "hoga", "gaya", "gayi", "raha",
    "rahi", "agar", "lekin", "wala", "wali",
    // greetings and thanks
    "assalam", "asalam", "assalamualaikum", "salam", "salaam", "alaikum", "alaikam", "walaikum",
    "adaab", "shukriya", "shukria", "meherbani", "mehrbani", "khudahafiz",
];

/// Minimum Latin words for an English detection to count as confident
const CONFIDENT_LATIN_WORDS: usize = 3;

/// Detection result with a confidence signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub language: Language,
    /// False when the text was too short or neutral to say
    pub confident: bool,
}

/// Script- and lexicon-based language detector
pub struct LanguageDetector {
    script_threshold: f32,
    lexicon: HashSet<&'static str>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl LanguageDetector {
    /// `script_threshold` is the share of Arabic-block letters that makes a text Urdu
    pub fn new(script_threshold: f32) -> Self {
        Self {
            script_threshold,
            lexicon: ROMAN_URDU_MARKERS.iter().copied().collect(),
        }
    }

    pub fn detect(&self, text: &str) -> Language {
        self.detect_signal(text).language
    }

    pub fn detect_signal(&self, text: &str) -> Detection {
        let arabic_share = Script::Arabic.proportion(text);
        if arabic_share > 0.0 && arabic_share >= self.script_threshold {
            return Detection {
                language: Language::Urdu,
                confident: true,
            };
        }

        let words: Vec<String> = text.unicode_words().map(|w| w.to_lowercase()).collect();
        if words.iter().any(|w| self.lexicon.contains(w.as_str())) {
            return Detection {
                language: Language::Urdu,
                confident: true,
            };
        }

        let latin_words = words
            .iter()
            .filter(|w| w.chars().any(|c| c.is_alphabetic() && Script::Latin.contains_char(c)))
            .count();

        Detection {
            language: Language::English,
            confident: latin_words >= CONFIDENT_LATIN_WORDS,
        }
    }
}
