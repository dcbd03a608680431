//! Analysis Synthesis
//!
//! Builds the analysis prompt from the query, the conversation transcript and
//! the best retrieved passages, then makes one bounded model call. Any failure
//! produces a template answer built from the best passage instead.

use std::sync::Arc;
use std::time::Duration;

use legal_agent_core::{Domain, LanguageModel, Language, ModelError, Passage};
use legal_agent_llm::PromptBuilder;
use legal_agent_rag::RetrievedContext;

use crate::compiler::SectionKind;

/// Passages embedded in the prompt never exceed this
pub const MAX_PROMPT_PASSAGES: usize = 5;

/// Excerpt length used by the template answer
const EXCERPT_CHARS: usize = 300;

/// Outcome of a model-backed stage
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    Generated(String),
    /// Template text used because the model failed; lower confidence
    Degraded { text: String, reason: String },
}

impl Synthesis {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason, .. } => Some(reason),
            Self::Generated(_) => None,
        }
    }
}

/// One model call bounded by `timeout`. Empty completions count as failures.
pub(crate) async fn complete_bounded(
    model: &dyn LanguageModel,
    prompt: &str,
    timeout: Duration,
) -> Result<String, ModelError> {
    let text = match tokio::time::timeout(timeout, model.complete(prompt, timeout)).await {
        Ok(result) => result?,
        Err(_) => return Err(ModelError::Timeout),
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ModelError::Unavailable("empty completion".to_string()));
    }
    Ok(text.to_string())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Produces the legal analysis for a substantive query
pub struct AnalysisSynthesizer {
    model: Arc<dyn LanguageModel>,
    jurisdiction: String,
    top_k: usize,
    max_context_chars: usize,
    timeout: Duration,
}

impl AnalysisSynthesizer {
    pub fn new(model: Arc<dyn LanguageModel>, jurisdiction: impl Into<String>) -> Self {
        Self {
            model,
            jurisdiction: jurisdiction.into(),
            top_k: MAX_PROMPT_PASSAGES,
            max_context_chars: 3000,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(model: Arc<dyn LanguageModel>, config: &legal_agent_config::AgentConfig) -> Self {
        Self::new(model, config.jurisdiction.clone())
            .with_top_k(config.analysis_top_k)
            .with_max_context_chars(config.max_context_chars)
            .with_timeout(Duration::from_millis(config.stage_timeout_ms))
    }

    /// Clamped to `MAX_PROMPT_PASSAGES`
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.min(MAX_PROMPT_PASSAGES);
        self
    }

    pub fn with_max_context_chars(mut self, max_chars: usize) -> Self {
        self.max_context_chars = max_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Analysis prompt text
    pub fn build_prompt(
        &self,
        query: &str,
        passages: &[Passage],
        transcript: &str,
        language: Language,
        domain: Domain,
    ) -> String {
        let context = RetrievedContext::assemble(passages.to_vec(), self.top_k, self.max_context_chars);
        let labels: Vec<String> = SectionKind::ANALYSIS
            .iter()
            .map(|kind| format!("**{}:**", kind.label(language)))
            .collect();
        let j = &self.jurisdiction;

        match language {
            Language::English => PromptBuilder::new(format!(
                "You are a professional legal expert on the law of {j}. \
                 Analyze this legal query based on {j} law."
            ))
            .field("Query", query)
            .field("Legal Domain", domain.display_name())
            .section("Previous Conversation", transcript)
            .section("Relevant Legal Context", &context.context_text())
            .numbered("Answer using exactly these labelled sections:", &labels)
            .closing(
                "Keep the answer factual and grounded in the legal context above. \
                 If the context does not cover the question, say so plainly.",
            )
            .build(),
            Language::Urdu => PromptBuilder::new(format!(
                "Aap {j} ke qanoon ke mahir hain. Is qanooni sawal ka {j} ke qanoon ke mutabiq tajziya karen."
            ))
            .field("Sawal", query)
            .field("Legal Domain", domain.display_name())
            .section("Pichli Guftagu", transcript)
            .section("Mutalliqah Qanooni Maloomat", &context.context_text())
            .numbered("In sections ke sath jawab dein:", &labels)
            .closing("Sirf upar di gayi qanooni maloomat par mabni jawab dein. Urdu mein jawab dein.")
            .build(),
        }
    }

    /// Analyze `query`; never fails, degrading to a template instead
    pub async fn synthesize(
        &self,
        query: &str,
        passages: &[Passage],
        transcript: &str,
        language: Language,
        domain: Domain,
    ) -> Synthesis {
        let prompt = self.build_prompt(query, passages, transcript, language, domain);
        let started = std::time::Instant::now();

        match complete_bounded(self.model.as_ref(), &prompt, self.timeout).await {
            Ok(text) => {
                tracing::debug!(
                    model = self.model.model_name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis generated"
                );
                Synthesis::Generated(text)
            }
            Err(e) => {
                tracing::warn!(error = %e, domain = %domain, "Analysis failed, using template");
                self.fallback(passages, language, e.to_string())
            }
        }
    }

    /// Template answer from the best passage only
    pub fn fallback(&self, passages: &[Passage], language: Language, reason: String) -> Synthesis {
        let context = RetrievedContext::assemble(passages.to_vec(), 1, usize::MAX);
        let law = SectionKind::ApplicableLaw.label(language);
        let simplified = SectionKind::SimplifiedText.label(language);
        let note = SectionKind::PracticalNote.label(language);

        let text = match (language, context.best()) {
            (Language::English, Some(best)) => format!(
                "**{law}:** Applicable provision: {}\n\
                 **{simplified}:** {}\n\
                 **{note}:** This is a lower-confidence answer prepared without full analysis. \
                 Please consult a qualified legal professional.",
                best.source,
                excerpt(&best.text, EXCERPT_CHARS)
            ),
            (Language::English, None) => format!(
                "**{law}:** No relevant provision was found in the available legal documents.\n\
                 **{note}:** This is a lower-confidence answer prepared without full analysis. \
                 Please consult a qualified legal professional."
            ),
            (Language::Urdu, Some(best)) => format!(
                "**{law}:** Mutalliqah dafa: {}\n\
                 **{simplified}:** {}\n\
                 **{note}:** Yeh kam yaqeeni jawab hai jo mukammal tajziye ke baghair tayyar kiya gaya hai. \
                 Barah-e-karam kisi qualified wakeel se mashwara karen.",
                best.source,
                excerpt(&best.text, EXCERPT_CHARS)
            ),
            (Language::Urdu, None) => format!(
                "**{law}:** Dastiyab qanooni dastavezat mein koi mutalliqah dafa nahi mili.\n\
                 **{note}:** Yeh kam yaqeeni jawab hai jo mukammal tajziye ke baghair tayyar kiya gaya hai. \
                 Barah-e-karam kisi qualified wakeel se mashwara karen."
            ),
        };

        Synthesis::Degraded { text, reason }
    }
}
