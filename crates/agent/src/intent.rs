//! Intent Classification
//!
//! Splits utterances into casual chat and substantive legal queries using
//! compiled rule tables in English, Roman Urdu and Urdu script.

use legal_agent_core::Intent;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::SECTION_PATTERNS;
use crate::patterns::{any_match, compile_all, word_alternation};

/// Which casual rule matched; selects the reply template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasualKind {
    Greeting,
    Wellbeing,
    Gratitude,
    Identity,
    Farewell,
    /// Questions about the conversation itself
    HistoryRecall,
    Other,
}

/// Casual rules in evaluation order. More specific kinds come first so that
/// "hi, how are you" is answered as a wellbeing question.
const CASUAL_RULES: &[(CasualKind, &[&str])] = &[
    (
        CasualKind::HistoryRecall,
        &[
            "what was my last message",
            "what was my previous message",
            "what was my previous question",
            "what was my last question",
            "what did i ask",
            "what did we discuss",
            "what was our conversation",
            "conversation history",
            "chat history",
            "maine kya poocha",
            "maine kya pucha",
            "pichla sawal",
        ],
    ),
    (
        CasualKind::Wellbeing,
        &[
            "how are you",
            "how are u",
            "how r u",
            "how do you do",
            "kaise ho",
            "kaisay ho",
            "kaisi ho",
            "kya hal hai",
            "kya haal hai",
            "kaisa hai",
            "theek ho",
            "کیسے ہو",
            "کیا حال ہے",
            "ٹھیک ہو",
        ],
    ),
    (
        CasualKind::Identity,
        &[
            "who are you",
            "what is your name",
            "what's your name",
            "whats your name",
            "introduce yourself",
            "tum kaun ho",
            "aap kaun hain",
            "aap kaun ho",
            "aap ka naam kya hai",
            "tumhara naam kya hai",
            "آپ کون ہیں",
            "آپ کا نام",
        ],
    ),
    (
        CasualKind::Gratitude,
        &[
            "thanks",
            "thank you",
            "thank u",
            "thx",
            "shukriya",
            "shukria",
            "mehrbani",
            "meherbani",
            "jazakallah",
            "شکریہ",
            "مہربانی",
        ],
    ),
    (
        CasualKind::Farewell,
        &[
            "bye",
            "goodbye",
            "good bye",
            "see you",
            "allah hafiz",
            "khuda hafiz",
            "اللہ حافظ",
            "خدا حافظ",
        ],
    ),
    (
        CasualKind::Greeting,
        &[
            "hi",
            "hello",
            "hey",
            "hiya",
            "good morning",
            "good afternoon",
            "good evening",
            "salam",
            "salaam",
            "assalam",
            "assalamualaikum",
            "assalam o alaikum",
            "aoa",
            "adaab",
            "سلام",
            "السلام علیکم",
            "آداب",
        ],
    ),
    (
        CasualKind::Other,
        &["whats up", "what's up", "sup", "ok", "okay"],
    ),
];

/// Statute vocabulary, rights and procedure words
const LEGAL_TERMS: &[&str] = &[
    "law", "laws", "legal", "illegal", "section", "sections", "act", "code", "penal", "court",
    "courts", "judge", "case", "lawyer", "attorney", "advocate", "rights", "punishment",
    "punish", "crime", "criminal", "offence", "offense", "fir", "bail", "arrest", "police",
    "complaint", "sue", "appeal", "petition", "constitution", "article", "ppc", "crpc", "cpc",
    "divorce", "khula", "custody", "inheritance", "contract", "tenant", "qanoon", "kanoon",
    "qanooni", "dafa", "adalat", "wakeel", "saza", "jurm", "zamanat", "talaq", "virasat",
    "قانون", "دفعہ", "عدالت", "وکیل", "سزا", "جرم", "ضمانت", "طلاق", "پولیس",
];

struct CasualRule {
    kind: CasualKind,
    patterns: Vec<Regex>,
}

/// Rule-based casual / substantive classifier
pub struct IntentClassifier {
    casual_rules: Vec<CasualRule>,
    legal_patterns: Vec<Regex>,
    /// Casual matches at or above this word count are treated as substantive
    max_casual_words: usize,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(15)
    }
}

impl IntentClassifier {
    pub fn new(max_casual_words: usize) -> Self {
        let casual_rules = CASUAL_RULES
            .iter()
            .map(|(kind, phrases)| CasualRule {
                kind: *kind,
                patterns: compile_all(&[word_alternation(phrases).as_str()]),
            })
            .collect();

        let mut legal_sources = vec![word_alternation(LEGAL_TERMS)];
        legal_sources.extend(SECTION_PATTERNS.iter().map(|p| p.to_string()));
        let legal_refs: Vec<&str> = legal_sources.iter().map(String::as_str).collect();

        let classifier = Self {
            casual_rules,
            legal_patterns: compile_all(&legal_refs),
            max_casual_words,
        };
        tracing::debug!(
            casual_rules = classifier.casual_rules.len(),
            legal_patterns = classifier.legal_patterns.len(),
            "Compiled intent rules"
        );
        classifier
    }

    /// Casual only when a casual rule matches, no legal trigger is present,
    /// and the utterance is short.
    pub fn classify(&self, text: &str) -> Intent {
        let casual = self.casual_kind(text).is_some();
        let legal = self.has_legal_trigger(text);
        let words = text.unicode_words().count();

        let intent = if casual && !legal && words < self.max_casual_words {
            Intent::Casual
        } else {
            Intent::Substantive
        };
        tracing::debug!(casual, legal, words, intent = %intent, "Classified intent");
        intent
    }

    /// First casual rule matching `text`, ignoring legal triggers
    pub fn casual_kind(&self, text: &str) -> Option<CasualKind> {
        self.casual_rules
            .iter()
            .find(|rule| any_match(&rule.patterns, text))
            .map(|rule| rule.kind)
    }

    pub fn has_legal_trigger(&self, text: &str) -> bool {
        any_match(&self.legal_patterns, text)
    }
}
