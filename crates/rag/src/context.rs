//! Context assembly
//!
//! Orders retrieved passages and packs them into the bounded context block
//! handed to the analysis prompt.

use legal_agent_core::Passage;
use serde::{Deserialize, Serialize};

/// Separator placed between passages in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Context text used when no passage was retrieved
pub const NO_CONTEXT: &str = "No relevant legal documents found";

/// How well the retrieved material supports an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// `high` with 3 or more passages, `medium` with at least one
    pub fn from_passage_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1 | 2 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort by score descending, ties keep retrieval order, then keep the best `k`.
///
/// NaN scores sort last.
pub fn rank_passages(mut passages: Vec<Passage>, k: usize) -> Vec<Passage> {
    passages.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => b.score.total_cmp(&a.score),
    });
    passages.truncate(k);
    passages
}

/// Ranked passages packed into a character budget
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    /// Passages that fit the budget, best first
    pub passages: Vec<Passage>,
    /// Passages the index returned before packing
    pub total_found: usize,
}

impl RetrievedContext {
    /// Rank `passages`, keep at most `k`, then pack them into `max_chars`
    /// (separators included). The best passage is always kept, cut to the
    /// budget if it is longer; later passages that would overflow are skipped.
    pub fn assemble(passages: Vec<Passage>, k: usize, max_chars: usize) -> Self {
        let total_found = passages.len();
        let ranked = rank_passages(passages, k);
        let separator_len = CONTEXT_SEPARATOR.chars().count();

        let mut kept: Vec<Passage> = Vec::with_capacity(ranked.len());
        let mut used = 0usize;
        for mut passage in ranked {
            let len = passage.text.trim().chars().count();
            if kept.is_empty() {
                if len > max_chars && max_chars > 0 {
                    tracing::debug!(
                        source = %passage.source,
                        chars = len,
                        max_chars,
                        "Truncating top passage to context budget"
                    );
                    passage.text = passage.text.trim().chars().take(max_chars).collect();
                }
                used = passage.text.trim().chars().count();
                kept.push(passage);
                continue;
            }
            if used + separator_len + len > max_chars {
                continue;
            }
            used += separator_len + len;
            kept.push(passage);
        }

        Self {
            passages: kept,
            total_found,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Best passage after ranking
    pub fn best(&self) -> Option<&Passage> {
        self.passages.first()
    }

    /// Context block for the analysis prompt
    pub fn context_text(&self) -> String {
        if self.passages.is_empty() {
            return NO_CONTEXT.to_string();
        }
        self.passages
            .iter()
            .map(|p| p.text.trim())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Distinct source labels in rank order, at most `limit`
    pub fn sources(&self, limit: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for passage in &self.passages {
            if out.len() == limit {
                break;
            }
            if !out.contains(&passage.source) {
                out.push(passage.source.clone());
            }
        }
        out
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_passage_count(self.passages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str, source: &str, score: f32) -> Passage {
        Passage::new(text, source, score)
    }

    #[test]
    fn test_rank_orders_by_score_then_index() {
        let ranked = rank_passages(
            vec![
                p("a", "s1", 0.5),
                p("b", "s2", 0.9),
                p("c", "s3", 0.5),
                p("d", "s4", f32::NAN),
            ],
            10,
        );
        let order: Vec<&str> = ranked.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let passages = (0..8).map(|i| p(&i.to_string(), "s", i as f32)).collect();
        let ranked = rank_passages(passages, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].text, "7");
    }

    #[test]
    fn test_assemble_respects_budget() {
        let long = "x".repeat(2000);
        let ctx = RetrievedContext::assemble(
            vec![p(&long, "A", 0.9), p(&long, "B", 0.8), p("short", "C", 0.1)],
            5,
            3000,
        );
        // B does not fit and is skipped; C still does
        let kept: Vec<&str> = ctx.passages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(kept, vec!["A", "C"]);
        assert_eq!(ctx.total_found, 3);
        assert_eq!(ctx.confidence(), Confidence::Medium);
        assert!(ctx.context_text().chars().count() <= 3000);
    }

    #[test]
    fn test_oversized_best_passage_is_truncated() {
        let long = "x".repeat(3500);
        let ctx = RetrievedContext::assemble(vec![p(&long, "PPC", 0.9), p("short", "CrPC", 0.5)], 5, 3000);

        let best = ctx.best().unwrap();
        assert_eq!(best.source, "PPC");
        assert_eq!(best.text.chars().count(), 3000);
        // the budget is spent, so nothing else fits
        assert_eq!(ctx.passages.len(), 1);
        assert_eq!(ctx.confidence(), Confidence::Medium);
        assert_eq!(ctx.sources(3), vec!["PPC".to_string()]);
    }

    #[test]
    fn test_context_text_joins_with_separator() {
        let ctx = RetrievedContext::assemble(
            vec![p("first", "A", 0.9), p("second", "A", 0.8), p("third", "B", 0.7)],
            5,
            3000,
        );
        assert_eq!(ctx.context_text(), "first\n\n---\n\nsecond\n\n---\n\nthird");
        assert_eq!(ctx.sources(3), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(ctx.confidence(), Confidence::High);
    }

    #[test]
    fn test_empty_context() {
        let ctx = RetrievedContext::assemble(Vec::new(), 5, 3000);
        assert!(ctx.is_empty());
        assert_eq!(ctx.context_text(), NO_CONTEXT);
        assert_eq!(ctx.confidence(), Confidence::Low);
        assert!(ctx.best().is_none());
    }

    #[test]
    fn test_confidence_thresholds() {
        assert_eq!(Confidence::from_passage_count(0), Confidence::Low);
        assert_eq!(Confidence::from_passage_count(1), Confidence::Medium);
        assert_eq!(Confidence::from_passage_count(3), Confidence::High);
        assert!(Confidence::Low < Confidence::High);
    }
}
