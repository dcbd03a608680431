//! Recommendation Generation
//!
//! Turns the analysis into actionable next steps with one bounded model call,
//! falling back to domain-named template steps.

use std::sync::Arc;
use std::time::Duration;

use legal_agent_core::{Domain, Language, LanguageModel};
use legal_agent_llm::PromptBuilder;

use crate::synthesizer::{complete_bounded, Synthesis};

pub struct RecommendationGenerator {
    model: Arc<dyn LanguageModel>,
    jurisdiction: String,
    timeout: Duration,
}

impl RecommendationGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, jurisdiction: impl Into<String>) -> Self {
        Self {
            model,
            jurisdiction: jurisdiction.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(model: Arc<dyn LanguageModel>, config: &legal_agent_config::AgentConfig) -> Self {
        Self::new(model, config.jurisdiction.clone())
            .with_timeout(Duration::from_millis(config.stage_timeout_ms))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_prompt(&self, analysis: &str, domain: Domain, language: Language) -> String {
        match language {
            Language::English => PromptBuilder::new(
                "Based on this legal analysis, provide clear, actionable recommendations:",
            )
            .field("Legal Domain", domain.display_name())
            .field("Jurisdiction", &self.jurisdiction)
            .section("Analysis", analysis)
            .numbered(
                "Cover:",
                &[
                    "Immediate actions",
                    "Documentation needed",
                    "Legal procedures",
                    "Precautions and warnings",
                    "Timeline considerations",
                ],
            )
            .closing("Keep each recommendation short and practical.")
            .build(),
            Language::Urdu => PromptBuilder::new(
                "Is qanooni tajziye ki buniyad par wazeh aur qabil-e-amal mashware dein:",
            )
            .field("Legal Domain", domain.display_name())
            .field("Mulk", &self.jurisdiction)
            .section("Tajziya", analysis)
            .numbered(
                "Shamil karen:",
                &[
                    "Fauran kya karna chahiye",
                    "Kaunse kagzaat chahiye",
                    "Qanooni rawaiye",
                    "Ehtiyati tadabeer",
                    "Waqt ka khayal",
                ],
            )
            .closing("Har mashwara mukhtasar aur amali ho. Urdu mein jawab dein.")
            .build(),
        }
    }

    /// Recommendations for the analysis; never fails, degrading to template steps
    pub async fn recommend(&self, analysis: &str, domain: Domain, language: Language) -> Synthesis {
        let prompt = self.build_prompt(analysis, domain, language);
        match complete_bounded(self.model.as_ref(), &prompt, self.timeout).await {
            Ok(text) => Synthesis::Generated(text),
            Err(e) => {
                tracing::warn!(error = %e, domain = %domain, "Recommendations failed, using template");
                Synthesis::Degraded {
                    text: self.template(domain, language),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Template steps naming `domain`
    pub fn template(&self, domain: Domain, language: Language) -> String {
        let area = domain.display_name().to_lowercase();
        match language {
            Language::English => format!(
                "1. Immediate: Gather all relevant documents and evidence.\n\
                 2. Legal Counsel: Consult a qualified {area} lawyer.\n\
                 3. Procedures: Follow proper legal procedures under {} law.\n\
                 4. Precautions: Understand your rights and obligations.\n\
                 5. Documentation: Keep detailed records of all interactions.",
                self.jurisdiction
            ),
            Language::Urdu => format!(
                "1. Fauran: Tamam zaruri kagzaat aur saboot jama karen.\n\
                 2. Wakeel: Kisi qualified {area} wakeel se raabta karen.\n\
                 3. Rawaiye: {} ke qanoon ke mutabiq sahi qanooni tareeqa ikhtiyar karen.\n\
                 4. Ehtiyat: Apne huqooq aur zimmedariyan samjhein.\n\
                 5. Record: Tamam muamlat ka tafseeli record rakhein.",
                self.jurisdiction
            ),
        }
    }
}
