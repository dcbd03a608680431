//! In-memory keyword index
//!
//! BM25 scoring over statute passages loaded from a JSON or YAML corpus.
//! Tokenization uses Unicode word boundaries so English, Roman Urdu and
//! Perso-Arabic text share one index.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use legal_agent_core::{ContextRetriever, Passage, RetrievalError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::RagError;

/// A passage as stored in the corpus file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default = "default_source", alias = "source_file")]
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
}

fn default_source() -> String {
    "Unknown".to_string()
}

impl IndexedPassage {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            source: source.into(),
            page: None,
        }
    }

    /// Citation label shown to users
    pub fn label(&self) -> String {
        match self.page {
            Some(page) => format!("{}, p. {}", self.source, page),
            None => self.source.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    List(Vec<IndexedPassage>),
    Wrapped { passages: Vec<IndexedPassage> },
}

impl CorpusFile {
    fn into_passages(self) -> Vec<IndexedPassage> {
        match self {
            CorpusFile::List(p) | CorpusFile::Wrapped { passages: p } => p,
        }
    }
}

/// BM25 parameters
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Term frequency saturation
    pub k1: f32,
    /// Length normalization
    pub b: f32,
    /// Results scoring at or below this are dropped
    pub min_score: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            min_score: 0.0,
        }
    }
}

impl From<&legal_agent_config::RagConfig> for IndexConfig {
    fn from(config: &legal_agent_config::RagConfig) -> Self {
        Self {
            min_score: config.min_score,
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct IndexData {
    passages: Vec<IndexedPassage>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    doc_freq: HashMap<String, usize>,
    total_len: usize,
}

impl IndexData {
    fn insert(&mut self, passage: IndexedPassage) {
        let tokens = tokenize(&passage.text);
        let mut freqs: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *freqs.entry(token.clone()).or_insert(0) += 1;
        }
        for term in freqs.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_len += tokens.len();
        self.doc_lens.push(tokens.len());
        self.term_freqs.push(freqs);
        self.passages.push(passage);
    }

    fn avg_len(&self) -> f32 {
        if self.passages.is_empty() {
            0.0
        } else {
            self.total_len as f32 / self.passages.len() as f32
        }
    }
}

/// Lowercased Unicode words
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// In-memory passage index
pub struct KeywordIndex {
    config: IndexConfig,
    data: RwLock<IndexData>,
    /// Set when the corpus could not be loaded; every search fails with it
    unavailable: Option<String>,
}

impl KeywordIndex {
    /// Create an empty index
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            data: RwLock::new(IndexData::default()),
            unavailable: None,
        }
    }

    /// Build an index over the given passages
    pub fn from_passages(config: IndexConfig, passages: Vec<IndexedPassage>) -> Self {
        let index = Self::new(config);
        index.add_passages(passages);
        index
    }

    /// An index whose every search reports `IndexUnavailable`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            config: IndexConfig::default(),
            data: RwLock::new(IndexData::default()),
            unavailable: Some(reason.into()),
        }
    }

    /// Load a corpus file (`.json`, `.yaml` or `.yml`)
    pub fn load(path: impl AsRef<Path>, config: IndexConfig) -> Result<Self, RagError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RagError::NotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let corpus: CorpusFile = if is_yaml {
            serde_yaml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };

        let passages: Vec<IndexedPassage> = corpus
            .into_passages()
            .into_iter()
            .filter(|p| !p.text.trim().is_empty())
            .collect();

        tracing::info!(path = %path.display(), passages = passages.len(), "Loaded passage corpus");
        Ok(Self::from_passages(config, passages))
    }

    /// Add passages to the index
    pub fn add_passages(&self, passages: impl IntoIterator<Item = IndexedPassage>) {
        let mut data = self.data.write();
        for (i, mut passage) in passages.into_iter().enumerate() {
            if passage.id.is_empty() {
                passage.id = format!("p{}", data.passages.len() + i);
            }
            data.insert(passage);
        }
    }

    /// Number of indexed passages
    pub fn len(&self) -> usize {
        self.data.read().passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Score every passage against the query and return the best `k`
    pub fn search_sync(&self, query: &str, k: usize) -> Result<Vec<Passage>, RagError> {
        if let Some(reason) = &self.unavailable {
            return Err(RagError::Index(reason.clone()));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let terms: HashSet<String> = tokenize(query).into_iter().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let data = self.data.read();
        let n = data.passages.len() as f32;
        let avg_len = data.avg_len().max(1.0);
        let IndexConfig { k1, b, min_score } = self.config;

        let mut scored: Vec<(usize, f32)> = data
            .term_freqs
            .iter()
            .enumerate()
            .filter_map(|(doc, freqs)| {
                let doc_len = data.doc_lens[doc] as f32;
                let score: f32 = terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *freqs.get(term)? as f32;
                        let df = *data.doc_freq.get(term)? as f32;
                        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                        Some(idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * doc_len / avg_len)))
                    })
                    .sum();
                (score > min_score && score > 0.0).then_some((doc, score))
            })
            .collect();

        scored.sort_by(|a, c| c.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(doc, score)| {
                let passage = &data.passages[doc];
                Passage::new(passage.text.clone(), passage.label(), score)
            })
            .collect())
    }
}

#[async_trait]
impl ContextRetriever for KeywordIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let results = self.search_sync(query, k)?;
        tracing::debug!(query_len = query.len(), results = results.len(), "Keyword search");
        Ok(results)
    }

    fn name(&self) -> &str {
        "keyword_bm25"
    }
}
