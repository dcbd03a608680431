//! Legal Domain Classification
//!
//! Counts term-table hits per domain. The result is advisory: it labels the
//! answer, picks the referral and expands the search query, but never gates
//! retrieval.

use std::fmt;

use legal_agent_core::Domain;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::patterns::{compile_all, word_alternation};

/// Statute reference patterns: `section 420`, `dafa 302`, `article 25`,
/// `302 PPC`, `دفعہ 420`
pub(crate) const SECTION_PATTERNS: &[&str] = &[
    r"(?i)\b(section|sec|dafa|dafah|article|art)\.?\s*(\d{1,4})",
    r"(?i)\b(\d{1,4})\s*(ppc|p\.p\.c)\b",
    r"(دفعہ|آرٹیکل)\s*(\d{1,4})",
];

static SECTION_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| compile_all(SECTION_PATTERNS));

/// Penal-code sections covering offences against the body, property and persons
const PENAL_OFFENCE_RANGE: std::ops::RangeInclusive<u32> = 299..=511;

/// A statute provision cited in an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatuteRef {
    Section(u32),
    Article(u32),
}

impl StatuteRef {
    fn parse(keyword: &str, number: &str) -> Option<Self> {
        let number: u32 = number.parse().ok()?;
        let keyword = keyword.to_lowercase();
        if keyword.starts_with("art") || keyword == "آرٹیکل" {
            Some(Self::Article(number))
        } else {
            Some(Self::Section(number))
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Self::Section(n) | Self::Article(n) => *n,
        }
    }

    /// Lowercase topic label, e.g. `section 420`
    pub fn label(&self) -> String {
        self.to_string().to_lowercase()
    }

    pub fn is_penal_offence(&self) -> bool {
        matches!(self, Self::Section(n) if PENAL_OFFENCE_RANGE.contains(n))
    }
}

impl fmt::Display for StatuteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(n) => write!(f, "Section {}", n),
            Self::Article(n) => write!(f, "Article {}", n),
        }
    }
}

/// Statute references in order of first appearance, duplicates removed
pub fn section_references(text: &str) -> Vec<StatuteRef> {
    let mut found: Vec<(usize, StatuteRef)> = Vec::new();
    for regex in SECTION_REGEXES.iter() {
        for caps in regex.captures_iter(text) {
            let (Some(a), Some(b)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            // "302 PPC" captures the number first
            let parsed = if a.as_str().chars().all(|c| c.is_ascii_digit()) {
                StatuteRef::parse("section", a.as_str())
            } else {
                StatuteRef::parse(a.as_str(), b.as_str())
            };
            if let Some(reference) = parsed {
                found.push((a.start(), reference));
            }
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut refs: Vec<StatuteRef> = Vec::with_capacity(found.len());
    for (_, reference) in found {
        if !refs.contains(&reference) {
            refs.push(reference);
        }
    }
    refs
}

/// Term tables in declaration order; `Other` has none
const DOMAIN_TERMS: &[(Domain, &[&str])] = &[
    (
        Domain::Criminal,
        &[
            "crime", "criminal", "theft", "steal", "stolen", "murder", "qatl", "assault", "fraud",
            "cheating", "punishment", "jail", "prison", "arrest", "bail", "penal code", "ppc",
            "offense", "offence", "robbery", "kidnapping", "shot", "shooting", "fir",
            "investigation", "homicide", "manslaughter", "weapon", "firearm", "chori", "jurm",
            "saza", "چوری", "قتل", "جرم", "سزا",
        ],
    ),
    (
        Domain::PoliceMisconduct,
        &[
            "police", "officer", "cop", "slap", "slapped", "beat", "beaten", "harass",
            "harassment", "misconduct", "abuse", "brutality", "humiliate", "humiliated",
            "complaint", "police station", "thana", "uniform", "authority", "custody torture",
            "پولیس", "تھانہ",
        ],
    ),
    (
        Domain::Civil,
        &[
            "contract", "dispute", "damages", "compensation", "breach", "agreement", "civil suit",
            "suit", "tort", "negligence", "liability", "defamation", "recovery",
        ],
    ),
    (
        Domain::Family,
        &[
            "marriage", "divorce", "custody", "inheritance", "family", "spouse", "children",
            "will", "maintenance", "alimony", "nikah", "khula", "mahr", "haq mehr", "talaq",
            "second marriage", "polygamy", "husband", "wife", "guardian", "virasat", "طلاق",
            "نکاح", "خلع", "وراثت",
        ],
    ),
    (
        Domain::Property,
        &[
            "property", "land", "plot", "house", "tenant", "landlord", "rent", "lease",
            "ownership", "possession", "transfer", "mutation", "registry", "zameen", "makan",
            "kiraya", "qabza", "زمین", "مکان", "قبضہ",
        ],
    ),
    (
        Domain::Commercial,
        &[
            "business", "trade", "commercial", "company", "corporate", "partnership",
            "investment", "shares", "stock", "merger", "acquisition", "cheque", "bank",
            "karobar",
        ],
    ),
    (
        Domain::Constitutional,
        &[
            "constitution", "fundamental rights", "freedom", "equality", "discrimination",
            "citizen", "government", "judiciary", "parliament", "amendment", "article",
            "writ", "high court petition", "آئین",
        ],
    ),
    (
        Domain::Procedural,
        &[
            "procedure", "fir filing", "file an fir", "appeal", "hearing", "summons", "warrant",
            "crpc", "cpc", "petition", "limitation", "adjournment", "evidence", "witness",
        ],
    ),
];

struct DomainRule {
    domain: Domain,
    terms: Vec<Regex>,
}

/// Keyword-table domain classifier
pub struct DomainClassifier {
    rules: Vec<DomainRule>,
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainClassifier {
    pub fn new() -> Self {
        let rules = DOMAIN_TERMS
            .iter()
            .map(|(domain, terms)| {
                let sources: Vec<String> = terms.iter().map(|t| word_alternation(&[*t])).collect();
                let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
                DomainRule {
                    domain: *domain,
                    terms: compile_all(&refs),
                }
            })
            .collect();
        Self { rules }
    }

    /// Distinct term hits per domain, in declaration order
    pub fn scores(&self, text: &str) -> Vec<(Domain, usize)> {
        let penal_refs = section_references(text)
            .iter()
            .filter(|r| r.is_penal_offence())
            .count();

        self.rules
            .iter()
            .map(|rule| {
                let mut hits = rule.terms.iter().filter(|t| t.is_match(text)).count();
                if rule.domain == Domain::Criminal {
                    hits += penal_refs;
                }
                (rule.domain, hits)
            })
            .collect()
    }

    /// Highest match count wins; ties go to the earlier domain; no hits is `Other`
    pub fn classify(&self, text: &str) -> Domain {
        let mut best = (Domain::Other, 0usize);
        for (domain, hits) in self.scores(text) {
            if hits > best.1 {
                best = (domain, hits);
            }
        }
        tracing::debug!(domain = %best.0, hits = best.1, "Classified domain");
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_references() {
        let refs = section_references("Compare section 420 and dafa 302, also Article 25 and 302 PPC");
        assert_eq!(
            refs,
            vec![
                StatuteRef::Section(420),
                StatuteRef::Section(302),
                StatuteRef::Article(25)
            ]
        );
        assert_eq!(refs[0].label(), "section 420");
        assert_eq!(refs[2].to_string(), "Article 25");
    }

    #[test]
    fn test_urdu_section_reference() {
        assert_eq!(section_references("دفعہ 420 کیا ہے"), vec![StatuteRef::Section(420)]);
    }

    #[test]
    fn test_penal_range_counts_as_criminal() {
        let classifier = DomainClassifier::new();
        assert_eq!(classifier.classify("What is section 420?"), Domain::Criminal);
        assert_eq!(classifier.classify("Explain section 12"), Domain::Other);
    }

    #[test]
    fn test_domain_tables() {
        let classifier = DomainClassifier::new();
        assert_eq!(
            classifier.classify("My husband wants a second marriage without my consent"),
            Domain::Family
        );
        assert_eq!(
            classifier.classify("A police officer slapped me at the police station"),
            Domain::PoliceMisconduct
        );
        assert_eq!(classifier.classify("My tenant refuses to pay rent"), Domain::Property);
        assert_eq!(classifier.classify("Is freedom of speech in the constitution"), Domain::Constitutional);
        assert_eq!(classifier.classify("random unrelated words"), Domain::Other);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let classifier = DomainClassifier::new();
        // one criminal hit ("fraud"), one commercial hit ("business")
        assert_eq!(classifier.classify("fraud business"), Domain::Criminal);
        let scores = classifier.scores("fraud business");
        assert_eq!(scores[0], (Domain::Criminal, 1));
        assert_eq!(scores.len(), 8);
    }
}
