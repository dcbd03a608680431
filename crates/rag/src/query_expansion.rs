//! Query Expansion for improved retrieval
//!
//! Expands queries with:
//! - Roman Urdu legal vocabulary mapped to English statute terms
//! - Urdu-script transliterations
//! - Domain vocabulary (statute names and landmark sections per legal domain)

use std::collections::HashMap;

use legal_agent_core::Domain;
use parking_lot::RwLock;

use crate::index::tokenize;

/// Expanded query result
#[derive(Debug, Clone)]
pub struct ExpandedQuery {
    /// Original query
    pub original: String,
    /// Query terms with weights, originals first
    pub terms: Vec<WeightedTerm>,
    /// Whether any expansion occurred
    pub was_expanded: bool,
}

impl ExpandedQuery {
    /// Plain search string: the original query followed by added terms
    pub fn to_search_string(&self) -> String {
        let added: Vec<&str> = self
            .terms
            .iter()
            .filter(|t| t.source != TermSource::Original)
            .map(|t| t.term.as_str())
            .collect();
        if added.is_empty() {
            self.original.clone()
        } else {
            format!("{} {}", self.original, added.join(" "))
        }
    }
}

/// A weighted query term
#[derive(Debug, Clone)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f32,
    pub source: TermSource,
}

/// Source of an expanded term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSource {
    /// Original query term
    Original,
    /// Roman Urdu to English synonym
    Synonym,
    /// Urdu script to Roman / English
    Transliteration,
    /// Domain vocabulary
    Domain,
}

fn push_unique(terms: &mut Vec<WeightedTerm>, term: &str, weight: f32, source: TermSource) {
    let term = term.to_lowercase();
    if !terms.iter().any(|t| t.term == term) {
        terms.push(WeightedTerm { term, weight, source });
    }
}

/// Query expander for statute retrieval
pub struct QueryExpander {
    /// Maximum expansion terms per query term
    max_expansions_per_term: usize,
    synonyms: RwLock<HashMap<String, Vec<String>>>,
    transliterations: RwLock<HashMap<String, Vec<String>>>,
    domain_terms: RwLock<HashMap<Domain, Vec<String>>>,
}

impl Default for QueryExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryExpander {
    pub fn new() -> Self {
        let expander = Self {
            max_expansions_per_term: 3,
            synonyms: RwLock::new(HashMap::new()),
            transliterations: RwLock::new(HashMap::new()),
            domain_terms: RwLock::new(HashMap::new()),
        };
        expander.load_default_dictionaries();
        expander
    }

    fn load_default_dictionaries(&self) {
        let synonyms: &[(&str, &[&str])] = &[
            ("qanoon", &["law", "act"]),
            ("kanoon", &["law", "act"]),
            ("dafa", &["section"]),
            ("saza", &["punishment", "imprisonment"]),
            ("jurm", &["offence", "crime"]),
            ("adalat", &["court"]),
            ("wakeel", &["lawyer", "advocate"]),
            ("chori", &["theft"]),
            ("qatl", &["murder", "qatl-i-amd"]),
            ("dhoka", &["cheating", "fraud"]),
            ("giraftari", &["arrest"]),
            ("zamanat", &["bail"]),
            ("talaq", &["divorce"]),
            ("nikah", &["marriage"]),
            ("virasat", &["inheritance"]),
            ("zameen", &["land", "property"]),
            ("kiraya", &["rent", "tenancy"]),
            ("huqooq", &["rights"]),
            ("shikayat", &["complaint"]),
            ("cheating", &["dishonestly", "deceived"]),
            ("theft", &["dishonestly", "movable"]),
        ];

        let mut syn_map = self.synonyms.write();
        for (term, syns) in synonyms {
            syn_map.insert(term.to_string(), syns.iter().map(|s| s.to_string()).collect());
        }
        drop(syn_map);

        let transliterations: &[(&str, &[&str])] = &[
            ("قانون", &["qanoon", "law"]),
            ("دفعہ", &["dafa", "section"]),
            ("سزا", &["saza", "punishment"]),
            ("جرم", &["jurm", "offence"]),
            ("عدالت", &["adalat", "court"]),
            ("وکیل", &["wakeel", "lawyer"]),
            ("چوری", &["chori", "theft"]),
            ("قتل", &["qatl", "murder"]),
            ("دھوکہ", &["dhoka", "cheating"]),
            ("ضمانت", &["zamanat", "bail"]),
            ("گرفتاری", &["giraftari", "arrest"]),
            ("طلاق", &["talaq", "divorce"]),
            ("نکاح", &["nikah", "marriage"]),
            ("خلع", &["khula"]),
            ("وراثت", &["virasat", "inheritance"]),
            ("زمین", &["zameen", "land"]),
            ("پولیس", &["police"]),
            ("حقوق", &["huqooq", "rights"]),
        ];

        let mut trans_map = self.transliterations.write();
        for (term, trans) in transliterations {
            trans_map.insert(term.to_string(), trans.iter().map(|s| s.to_string()).collect());
        }
        drop(trans_map);

        let domain_terms = [
            (Domain::Criminal, "criminal law penal code PPC 302 304 murder manslaughter"),
            (
                Domain::PoliceMisconduct,
                "police officer misconduct assault Pakistan Penal Code PPC 355 356 357 Police Order 2002 human rights",
            ),
            (Domain::Civil, "civil law contract property dispute"),
            (Domain::Family, "family law marriage divorce custody inheritance"),
            (Domain::Property, "property transfer land ownership possession tenancy"),
            (Domain::Commercial, "commercial law business contract trade"),
            (Domain::Constitutional, "constitution fundamental rights"),
            (Domain::Procedural, "code of criminal procedure CrPC civil procedure CPC FIR bail"),
        ];

        let mut domain_map = self.domain_terms.write();
        for (domain, vocabulary) in domain_terms {
            domain_map.insert(
                domain,
                vocabulary.split_whitespace().map(|s| s.to_string()).collect(),
            );
        }
    }

    /// Expand a query, optionally appending the vocabulary of `domain`
    pub fn expand(&self, query: &str, domain: Option<Domain>) -> ExpandedQuery {
        let words = tokenize(query);
        let mut terms: Vec<WeightedTerm> = Vec::new();

        for word in &words {
            push_unique(&mut terms, word, 2.0, TermSource::Original);
        }

        {
            let synonyms = self.synonyms.read();
            for word in &words {
                if let Some(syns) = synonyms.get(word) {
                    for syn in syns.iter().take(self.max_expansions_per_term) {
                        push_unique(&mut terms, syn, 1.0, TermSource::Synonym);
                    }
                }
            }
        }

        {
            let trans = self.transliterations.read();
            for word in &words {
                if let Some(translits) = trans.get(word) {
                    for t in translits.iter().take(self.max_expansions_per_term) {
                        push_unique(&mut terms, t, 0.8, TermSource::Transliteration);
                    }
                }
            }
        }

        if let Some(domain) = domain {
            if let Some(vocabulary) = self.domain_terms.read().get(&domain) {
                for term in vocabulary {
                    push_unique(&mut terms, term, 0.9, TermSource::Domain);
                }
            }
        }

        let was_expanded = terms.iter().any(|t| t.source != TermSource::Original);

        ExpandedQuery {
            original: query.to_string(),
            terms,
            was_expanded,
        }
    }

    /// Add a custom synonym
    pub fn add_synonym(&self, term: &str, synonyms: &[&str]) {
        self.synonyms.write().insert(
            term.to_lowercase(),
            synonyms.iter().map(|s| s.to_lowercase()).collect(),
        );
    }

    /// Replace the vocabulary appended for a domain
    pub fn set_domain_vocabulary(&self, domain: Domain, vocabulary: &[&str]) {
        self.domain_terms
            .write()
            .insert(domain, vocabulary.iter().map(|s| s.to_string()).collect());
    }
}
