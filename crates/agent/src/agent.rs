//! Legal Agent
//!
//! One turn of the pipeline: session bookkeeping, language and intent
//! detection, then either a casual reply or domain classification, retrieval,
//! analysis, recommendations, referral and compilation. Every collaborator
//! failure inside a turn ends in a degraded but complete answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use legal_agent_config::{AgentConfig, Settings};
use legal_agent_core::{
    ContextRetriever, Domain, Intent, Language, LanguageModel, MessageMetadata, Passage, Role,
};
use legal_agent_rag::{Confidence, QueryExpander, RetrievedContext};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::casual::CasualResponder;
use crate::compiler::{CompiledResponse, ResponseCompiler, ResponseHeader};
use crate::domain::DomainClassifier;
use crate::intent::{CasualKind, IntentClassifier};
use crate::language::LanguageDetector;
use crate::memory::{ConversationMemory, SidebarSummary};
use crate::recommendation::RecommendationGenerator;
use crate::referral::ReferralAdvisor;
use crate::streaming::{ResponseChunks, StreamingResponseBuilder};
use crate::synthesizer::{AnalysisSynthesizer, Synthesis};
use crate::AgentError;

/// Pipeline input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub text: String,
}

impl TurnRequest {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
        }
    }

    /// Reject missing or blank fields
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.session_id.trim().is_empty() {
            return Err(AgentError::InvalidInput("session_id is required".to_string()));
        }
        if self.text.trim().is_empty() {
            return Err(AgentError::InvalidInput("text is required".to_string()));
        }
        Ok(())
    }
}

/// Pipeline output
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub response_text: String,
    pub language: Language,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    pub sidebar: SidebarSummary,
    pub degraded: bool,
    pub confidence: Confidence,
    pub sources: Vec<String>,
    #[serde(skip)]
    pub compiled: CompiledResponse,
}

impl TurnResponse {
    /// The compiled answer as stream chunks
    pub fn chunks(&self) -> ResponseChunks {
        StreamingResponseBuilder::new().build(&self.compiled)
    }
}

/// Outcome of the retrieval stage
struct Retrieval {
    passages: Vec<Passage>,
    /// Set when the index failed or timed out
    failure: Option<String>,
}

/// Legal question answering pipeline
pub struct LegalAgent {
    config: AgentConfig,
    memory: Arc<ConversationMemory>,
    retriever: Arc<dyn ContextRetriever>,
    model: Arc<dyn LanguageModel>,
    language_detector: LanguageDetector,
    intent_classifier: IntentClassifier,
    domain_classifier: DomainClassifier,
    query_expander: Option<QueryExpander>,
    synthesizer: AnalysisSynthesizer,
    recommender: RecommendationGenerator,
    referral: ReferralAdvisor,
    compiler: ResponseCompiler,
    casual: CasualResponder,
    default_language: Language,
    retrieval_enabled: bool,
    retrieval_top_k: usize,
}

impl LegalAgent {
    pub fn new(
        config: AgentConfig,
        memory: Arc<ConversationMemory>,
        retriever: Arc<dyn ContextRetriever>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let default_language = Language::from_str_loose(&config.default_language).unwrap_or_default();

        Self {
            language_detector: LanguageDetector::new(config.urdu_script_threshold),
            intent_classifier: IntentClassifier::new(config.casual_max_words),
            domain_classifier: DomainClassifier::new(),
            query_expander: Some(QueryExpander::new()),
            synthesizer: AnalysisSynthesizer::from_config(Arc::clone(&model), &config),
            recommender: RecommendationGenerator::from_config(Arc::clone(&model), &config),
            referral: ReferralAdvisor::new(),
            compiler: ResponseCompiler::new(config.jurisdiction.clone()),
            casual: CasualResponder::new(config.name.clone(), config.jurisdiction.clone()),
            default_language,
            retrieval_enabled: true,
            retrieval_top_k: config.analysis_top_k,
            config,
            memory,
            retriever,
            model,
        }
    }

    /// Build from loaded settings, applying the retrieval options
    pub fn from_settings(
        settings: &Settings,
        memory: Arc<ConversationMemory>,
        retriever: Arc<dyn ContextRetriever>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self::new(settings.agent.clone(), memory, retriever, model)
            .with_retrieval(settings.rag.enabled, settings.rag.top_k)
            .with_query_expansion(settings.rag.query_expansion)
    }

    pub fn with_retrieval(mut self, enabled: bool, top_k: usize) -> Self {
        self.retrieval_enabled = enabled;
        self.retrieval_top_k = top_k;
        self
    }

    pub fn with_query_expansion(mut self, enabled: bool) -> Self {
        self.query_expander = enabled.then(QueryExpander::new);
        self
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn retriever_name(&self) -> &str {
        self.retriever.name()
    }

    /// Process one utterance
    pub async fn process(&self, request: TurnRequest) -> Result<TurnResponse, AgentError> {
        request.validate()?;
        let span = tracing::info_span!("turn", session_id = %request.session_id);
        self.run_turn(request).instrument(span).await
    }

    async fn run_turn(&self, request: TurnRequest) -> Result<TurnResponse, AgentError> {
        let started = Instant::now();
        let session_id = request.session_id.trim().to_string();
        let text = request.text.trim();

        self.memory.create_session(&session_id)?;
        let transcript = self.memory.get_context(&session_id)?;
        let language = self.resolve_language(&session_id, text)?;
        let intent = self.intent_classifier.classify(text);

        let response = match intent {
            Intent::Casual => self.casual_turn(&session_id, text, language)?,
            Intent::Substantive => self.substantive_turn(&session_id, text, &transcript, language).await?,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        metrics::counter!("legal_agent_turns_total", "intent" => intent.as_str()).increment(1);
        metrics::histogram!("legal_agent_turn_latency_ms").record(elapsed_ms as f64);
        if response.degraded {
            metrics::counter!("legal_agent_degraded_total").increment(1);
        }

        tracing::info!(
            intent = %intent,
            language = %language,
            domain = response.domain.map(|d| d.as_str()).unwrap_or("-"),
            degraded = response.degraded,
            confidence = %response.confidence,
            elapsed_ms,
            "Turn complete"
        );
        Ok(response)
    }

    /// Confident detections answer in the detected language and pin it if the
    /// session has none; ambiguous ones reuse the pinned language.
    fn resolve_language(&self, session_id: &str, text: &str) -> Result<Language, AgentError> {
        let detection = self.language_detector.detect_signal(text);
        if detection.confident {
            self.memory.pin_language(session_id, detection.language)?;
            return Ok(detection.language);
        }
        Ok(self
            .memory
            .pinned_language(session_id)?
            .unwrap_or(self.default_language))
    }

    fn casual_turn(&self, session_id: &str, text: &str, language: Language) -> Result<TurnResponse, AgentError> {
        let kind = self.intent_classifier.casual_kind(text).unwrap_or(CasualKind::Other);
        let reply = if kind == CasualKind::HistoryRecall {
            let prior = self.memory.history(session_id)?;
            self.casual.recall(text, language, &prior)
        } else {
            self.casual.reply(kind, language)
        };

        let compiled = self.compiler.compile(
            Intent::Casual,
            language,
            Some(&Synthesis::Generated(reply)),
            None,
            None,
        );
        let response_text = compiled.render();

        let metadata = MessageMetadata::casual();
        self.memory.add_message(session_id, Role::User, text, Some(metadata))?;
        self.memory
            .add_message(session_id, Role::Assistant, &response_text, Some(metadata))?;

        Ok(TurnResponse {
            session_id: session_id.to_string(),
            response_text,
            language,
            intent: Intent::Casual,
            domain: None,
            sidebar: self.memory.get_sidebar_summary(session_id)?,
            degraded: false,
            confidence: Confidence::Low,
            sources: Vec::new(),
            compiled,
        })
    }

    async fn substantive_turn(
        &self,
        session_id: &str,
        text: &str,
        transcript: &str,
        language: Language,
    ) -> Result<TurnResponse, AgentError> {
        let domain = self.domain_classifier.classify(text);
        let metadata = MessageMetadata::substantive(domain);
        self.memory.add_message(session_id, Role::User, text, Some(metadata))?;

        let retrieval = self.retrieve(text, domain).await;
        let context = RetrievedContext::assemble(
            retrieval.passages,
            self.config.analysis_top_k,
            self.config.max_context_chars,
        );

        let analysis = self
            .synthesizer
            .synthesize(text, &context.passages, transcript, language, domain)
            .await;
        let recommendations = self.recommender.recommend(analysis.text(), domain, language).await;
        let referral = self.referral.advise(domain);

        let mut compiled = self.compiler.compile(
            Intent::Substantive,
            language,
            Some(&analysis),
            Some(&recommendations),
            Some(&referral),
        );
        if let Some(reason) = &retrieval.failure {
            tracing::warn!(reason = %reason, "Answering without retrieved context");
            compiled = compiled.mark_degraded(self.compiler.degraded_notice(language));
        }

        let confidence = if compiled.degraded {
            Confidence::Low
        } else {
            context.confidence()
        };
        let sources = context.sources(self.config.max_sources);
        let compiled = compiled.with_header(ResponseHeader {
            domain,
            confidence,
            sources: sources.clone(),
        });
        let response_text = compiled.render();

        self.memory
            .add_message(session_id, Role::Assistant, &response_text, Some(metadata))?;

        Ok(TurnResponse {
            session_id: session_id.to_string(),
            response_text,
            language,
            intent: Intent::Substantive,
            domain: Some(domain),
            sidebar: self.memory.get_sidebar_summary(session_id)?,
            degraded: compiled.degraded,
            confidence,
            sources,
            compiled,
        })
    }

    /// One bounded index search. Failures and timeouts yield no passages.
    async fn retrieve(&self, text: &str, domain: Domain) -> Retrieval {
        if !self.retrieval_enabled {
            return Retrieval {
                passages: Vec::new(),
                failure: None,
            };
        }

        let query = match &self.query_expander {
            Some(expander) => expander.expand(text, Some(domain)).to_search_string(),
            None => text.to_string(),
        };
        let timeout = Duration::from_millis(self.config.retrieval_timeout_ms);

        match tokio::time::timeout(timeout, self.retriever.search(&query, self.retrieval_top_k)).await {
            Ok(Ok(passages)) => {
                tracing::debug!(
                    retriever = self.retriever.name(),
                    results = passages.len(),
                    "Retrieved passages"
                );
                Retrieval {
                    passages,
                    failure: None,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Index search failed");
                Retrieval {
                    passages: Vec::new(),
                    failure: Some(e.to_string()),
                }
            }
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Index search timed out");
                Retrieval {
                    passages: Vec::new(),
                    failure: Some("index search timed out".to_string()),
                }
            }
        }
    }
}
