//! End-to-end pipeline tests with in-process collaborators

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use legal_agent_agent::{
    AgentError, ConversationMemory, LegalAgent, SectionKind, TurnRequest,
};
use legal_agent_config::AgentConfig;
use legal_agent_core::{
    ContextRetriever, Domain, Intent, Language, LanguageModel, ModelError, Passage, RetrievalError,
    Role,
};
use legal_agent_rag::{Confidence, IndexConfig, IndexedPassage, KeywordIndex};
use parking_lot::Mutex;

const LABELLED_ANALYSIS: &str = "**Applicable Law & Section:** Section 420, Pakistan Penal Code 1860\n\
**Simplified Text:** Cheating someone into handing over property.\n\
**Consequence & Category:** Imprisonment up to seven years and fine; non-bailable.\n\
**Practical Note:** Keep receipts and messages as evidence.\n\
**Suggestions:** File an FIR at the nearest police station.";

const RECOMMENDATIONS: &str = "1. Immediate: File an FIR at the nearest police station.\n\
2. Documentation: Keep receipts, bank records and messages.";

enum Behaviour {
    Reply(String),
    Fail,
    Hang,
}

struct MockModel {
    behaviour: Behaviour,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.behaviour {
            Behaviour::Reply(_) if prompt.contains("actionable recommendations") => {
                Ok(RECOMMENDATIONS.to_string())
            }
            Behaviour::Reply(text) => Ok(text.clone()),
            Behaviour::Fail => Err(ModelError::Unavailable("connection refused".to_string())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("late".to_string())
            }
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

struct FixedRetriever {
    passages: Vec<Passage>,
    calls: Mutex<usize>,
}

#[async_trait]
impl ContextRetriever for FixedRetriever {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        *self.calls.lock() += 1;
        Ok(self.passages.iter().take(k).cloned().collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn statute_retriever() -> Arc<FixedRetriever> {
    Arc::new(FixedRetriever {
        passages: vec![
            Passage::new(
                "420. Cheating and dishonestly inducing delivery of property. Whoever cheats and thereby dishonestly induces the person deceived to deliver any property shall be punished with imprisonment which may extend to seven years.",
                "Pakistan Penal Code 1860",
                0.92,
            ),
            Passage::new("415. Cheating defined.", "Pakistan Penal Code 1860", 0.71),
            Passage::new("Offences under section 420 are non-bailable.", "CrPC Schedule II", 0.55),
        ],
        calls: Mutex::new(0),
    })
}

fn agent_with(
    retriever: Arc<dyn ContextRetriever>,
    model: Arc<dyn LanguageModel>,
) -> (LegalAgent, Arc<ConversationMemory>) {
    let memory = Arc::new(ConversationMemory::default());
    let config = AgentConfig {
        stage_timeout_ms: 200,
        ..Default::default()
    };
    (LegalAgent::new(config, Arc::clone(&memory), retriever, model), memory)
}

#[tokio::test]
async fn test_casual_greeting() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let retriever = statute_retriever();
    let (agent, memory) = agent_with(retriever.clone(), model.clone());

    let response = agent.process(TurnRequest::new("s1", "Hi")).await.unwrap();

    assert_eq!(response.intent, Intent::Casual);
    assert!(response.domain.is_none());
    assert!(response.response_text.contains("Sami Ullah AI"));
    assert_eq!(response.sidebar.message_count, 2);
    assert_eq!(response.chunks().count(), 1);

    // no collaborator was touched
    assert_eq!(model.prompt_count(), 0);
    assert_eq!(*retriever.calls.lock(), 0);

    let history = memory.history("s1").unwrap();
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].metadata.intent, Some(Intent::Casual));
    assert!(history[1].metadata.domain.is_none());
}

#[tokio::test]
async fn test_substantive_section_query() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, memory) = agent_with(statute_retriever(), model.clone());

    let response = agent
        .process(TurnRequest::new("s2", "What is section 420?"))
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Substantive);
    assert_eq!(response.domain, Some(Domain::Criminal));
    assert_eq!(response.language, Language::English);
    assert!(!response.degraded);
    assert_eq!(response.confidence, Confidence::High);
    assert_eq!(
        response.sources,
        vec!["Pakistan Penal Code 1860".to_string(), "CrPC Schedule II".to_string()]
    );

    let kinds: Vec<SectionKind> = response.compiled.sections.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, SectionKind::ORDERED.to_vec());
    let text = &response.response_text;
    let positions: Vec<usize> = [
        "Applicable Law & Section",
        "Simplified Text",
        "Consequence & Category",
        "Practical Note",
        "Suggestions",
        "Referral",
        "Disclaimer",
    ]
    .iter()
    .map(|label| text.find(&format!("**{}:**", label)).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("Criminal Defense Lawyer"));
    assert_eq!(
        response.compiled.section(SectionKind::Suggestions).unwrap().body,
        RECOMMENDATIONS
    );

    assert!(response.sidebar.topics.contains(&"criminal".to_string()));
    assert!(response.sidebar.topics.contains(&"section 420".to_string()));
    assert_eq!(response.sidebar.recent_activity, vec!["Discussed Section 420".to_string()]);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["intent"], "legal_query");
    assert_eq!(json["domain"], "criminal");
    assert_eq!(json["confidence"], "high");
    assert!(json.get("compiled").is_none());

    // analysis + recommendations, one call each
    assert_eq!(model.prompt_count(), 2);
    let history = memory.history("s2").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].metadata.domain, Some(Domain::Criminal));
    assert_eq!(history[1].metadata.intent, Some(Intent::Substantive));
}

#[tokio::test]
async fn test_unlabelled_model_answer_is_kept() {
    let answer = "Section 420 of the Pakistan Penal Code punishes cheating with imprisonment of up to seven years.";
    let model = MockModel::new(Behaviour::Reply(answer.to_string()));
    let (agent, _memory) = agent_with(statute_retriever(), model);

    let response = agent
        .process(TurnRequest::new("s2b", "What is section 420?"))
        .await
        .unwrap();

    assert!(!response.degraded);
    assert_eq!(
        response.compiled.section(SectionKind::ApplicableLaw).unwrap().body,
        answer
    );
    assert!(response.response_text.contains("up to seven years"));
    assert!(!response.response_text.contains("No specific provision"));
    assert_eq!(response.compiled.sections.len(), SectionKind::ORDERED.len());
}

#[tokio::test]
async fn test_empty_index_still_answers() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let empty: Arc<dyn ContextRetriever> = Arc::new(KeywordIndex::new(IndexConfig::default()));
    let (agent, _memory) = agent_with(empty, model.clone());

    let response = agent
        .process(TurnRequest::new("s3", "What is section 420?"))
        .await
        .unwrap();

    assert_eq!(response.confidence, Confidence::Low);
    assert!(response.sources.is_empty());
    assert_eq!(response.compiled.sections.len(), SectionKind::ORDERED.len());
    assert!(response.compiled.sections.iter().all(|s| !s.body.trim().is_empty()));
    assert!(model.prompts.lock()[0].contains("No relevant legal documents found"));
}

#[tokio::test]
async fn test_unavailable_index_degrades() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let broken: Arc<dyn ContextRetriever> = Arc::new(KeywordIndex::unavailable("corpus missing"));
    let (agent, _memory) = agent_with(broken, model);

    let response = agent
        .process(TurnRequest::new("s4", "Can police arrest without a warrant?"))
        .await
        .unwrap();

    assert!(response.degraded);
    assert_eq!(response.confidence, Confidence::Low);
    assert!(response.compiled.notice.is_some());
    assert_eq!(response.compiled.sections.len(), SectionKind::ORDERED.len());
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout_falls_back_in_both_stages() {
    let model = MockModel::new(Behaviour::Hang);
    let (agent, _memory) = agent_with(statute_retriever(), model.clone());

    let response = agent
        .process(TurnRequest::new("s5", "What is section 420?"))
        .await
        .unwrap();

    assert!(response.degraded);
    assert_eq!(response.confidence, Confidence::Low);
    let text = &response.response_text;
    assert!(text.contains("Applicable provision: Pakistan Penal Code 1860"));
    assert!(text.contains("qualified criminal lawyer"));
    assert_eq!(response.compiled.sections.len(), SectionKind::ORDERED.len());
    // one attempt per stage, no retries
    assert_eq!(model.prompt_count(), 2);
}

#[tokio::test]
async fn test_model_failure_degrades() {
    let model = MockModel::new(Behaviour::Fail);
    let (agent, _memory) = agent_with(statute_retriever(), model);

    let response = agent
        .process(TurnRequest::new("s6", "dafa 420 ki saza kya hai"))
        .await
        .unwrap();

    assert!(response.degraded);
    assert_eq!(response.language, Language::Urdu);
    assert!(response.response_text.contains("Qabil-e-Tatbeeq Qanoon aur Dafa"));
    assert!(response.response_text.contains("Criminal Defense Wakeel"));
}

#[tokio::test]
async fn test_oversized_top_passage_still_grounds_fallback() {
    let long_text = format!("420. Cheating and dishonestly inducing delivery of property. {}", "x ".repeat(2000));
    let retriever: Arc<dyn ContextRetriever> = Arc::new(FixedRetriever {
        passages: vec![
            Passage::new(long_text, "Pakistan Penal Code 1860", 0.9),
            Passage::new("Offences under section 420 are non-bailable.", "CrPC Schedule II", 0.5),
        ],
        calls: Mutex::new(0),
    });
    let model = MockModel::new(Behaviour::Fail);
    let (agent, _memory) = agent_with(retriever, model.clone());

    let response = agent
        .process(TurnRequest::new("s6b", "What is the punishment under section 420?"))
        .await
        .unwrap();

    assert!(response.degraded);
    let law = &response.compiled.section(SectionKind::ApplicableLaw).unwrap().body;
    assert!(law.contains("Pakistan Penal Code 1860"), "{law}");
    assert!(!response.response_text.contains("No relevant provision"));
    assert!(response.sources.contains(&"Pakistan Penal Code 1860".to_string()));
    assert!(model.prompts.lock()[0].contains("420. Cheating and dishonestly"));
}

#[tokio::test]
async fn test_urdu_language_is_sticky() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, memory) = agent_with(statute_retriever(), model);

    let first = agent
        .process(TurnRequest::new("s7", "Section 302 kya hai?"))
        .await
        .unwrap();
    assert_eq!(first.language, Language::Urdu);

    let second = agent.process(TurnRequest::new("s7", "Hi")).await.unwrap();
    assert_eq!(second.language, Language::Urdu);
    assert!(second.response_text.starts_with("Salam!"));
    assert_eq!(memory.pinned_language("s7").unwrap(), Some(Language::Urdu));
    assert_eq!(second.sidebar.language, Some(Language::Urdu));
}

#[tokio::test]
async fn test_history_recall() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, _memory) = agent_with(statute_retriever(), model.clone());

    agent
        .process(TurnRequest::new("s8", "What is section 420?"))
        .await
        .unwrap();
    let recall = agent
        .process(TurnRequest::new("s8", "What was my last message?"))
        .await
        .unwrap();

    assert_eq!(recall.intent, Intent::Casual);
    assert!(recall.response_text.contains("\"What is section 420?\""));
    assert_eq!(model.prompt_count(), 2);
}

#[tokio::test]
async fn test_context_window_is_bounded() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, _memory) = agent_with(statute_retriever(), model.clone());

    for n in 0..7 {
        agent
            .process(TurnRequest::new("s9", format!("Explain section {} of the penal code", 300 + n)))
            .await
            .unwrap();
    }

    let prompts = model.prompts.lock();
    let last_analysis = &prompts[prompts.len() - 2];
    let transcript_lines = last_analysis
        .lines()
        .filter(|l| l.starts_with("User: ") || l.starts_with("Assistant: "))
        .count();
    assert_eq!(transcript_lines, 10);
}

#[tokio::test]
async fn test_delete_session_resets_state() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, memory) = agent_with(statute_retriever(), model);

    agent.process(TurnRequest::new("s10", "Hi")).await.unwrap();
    assert!(memory.delete_session("s10"));
    assert!(matches!(
        memory.get_sidebar_summary("s10"),
        Err(AgentError::UnknownSession(_))
    ));

    let again = agent.process(TurnRequest::new("s10", "Hi")).await.unwrap();
    assert_eq!(again.sidebar.message_count, 2);
}

#[tokio::test]
async fn test_blank_input_is_rejected() {
    let model = MockModel::new(Behaviour::Reply(LABELLED_ANALYSIS.to_string()));
    let (agent, memory) = agent_with(statute_retriever(), model);

    let err = agent.process(TurnRequest::new("s11", "   ")).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));
    let err = agent.process(TurnRequest::new("", "Hi")).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));
    assert_eq!(memory.session_count(), 0);
}

#[tokio::test]
async fn test_keyword_index_end_to_end() {
    let index = KeywordIndex::from_passages(
        IndexConfig::default(),
        vec![
            IndexedPassage::new(
                "Khula: a wife may seek dissolution of marriage through the Family Court.",
                "Muslim Family Laws Ordinance 1961",
            ),
            IndexedPassage::new("302. Punishment of qatl-i-amd.", "Pakistan Penal Code 1860"),
        ],
    );
    let model = MockModel::new(Behaviour::Fail);
    let (agent, _memory) = agent_with(Arc::new(index), model);

    let response = agent
        .process(TurnRequest::new("s12", "How can a wife get khula from her husband?"))
        .await
        .unwrap();

    assert_eq!(response.domain, Some(Domain::Family));
    assert_eq!(response.sources, vec!["Muslim Family Laws Ordinance 1961".to_string()]);
    assert!(response
        .response_text
        .contains("Applicable provision: Muslim Family Laws Ordinance 1961"));
    assert!(response.response_text.contains("Family Law Lawyer"));
}
