//! Casual replies
//!
//! Short templated answers for small talk, and answers to questions about the
//! conversation itself built from the session history.

use legal_agent_core::{Language, Message, Role};

use crate::intent::CasualKind;

/// Characters of each message shown when listing the conversation
const RECALL_PREVIEW_CHARS: usize = 100;

pub struct CasualResponder {
    name: String,
    jurisdiction: String,
}

impl Default for CasualResponder {
    fn default() -> Self {
        Self::new("Sami Ullah AI", "Pakistan")
    }
}

impl CasualResponder {
    pub fn new(name: impl Into<String>, jurisdiction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jurisdiction: jurisdiction.into(),
        }
    }

    /// Templated reply for a casual kind. `HistoryRecall` without history
    /// gets the "just started" answer; use [`Self::recall`] when history exists.
    pub fn reply(&self, kind: CasualKind, language: Language) -> String {
        let name = &self.name;
        let j = &self.jurisdiction;
        match (language, kind) {
            (Language::English, CasualKind::Greeting) => format!(
                "Hello! I'm {name}, your legal assistant for {j} law. How can I help you today?"
            ),
            (Language::Urdu, CasualKind::Greeting) => format!(
                "Salam! Main {name} hun, aap ka {j} ka Legal Assistant. Main aap ki kaise madad kar sakta hun?"
            ),
            (Language::English, CasualKind::Wellbeing) => format!(
                "I'm doing great, thank you! I'm your legal assistant specialized in {j} law. Do you have any legal questions?"
            ),
            (Language::Urdu, CasualKind::Wellbeing) => format!(
                "Main bilkul theek hun, shukriya! Main aap ka legal assistant hun aur {j} ke qanoon mein mahir hun. Kya aap ka koi legal sawal hai?"
            ),
            (Language::English, CasualKind::Gratitude) => format!(
                "You're most welcome! Feel free to ask any legal questions. I'm here to help you understand {j} law."
            ),
            (Language::Urdu, CasualKind::Gratitude) => {
                "Aap ka swagat hai! Koi aur sawal ho to zaroor poochiye. Main yahan aap ki madad ke liye hun.".to_string()
            }
            (Language::English, CasualKind::Identity) => format!(
                "I'm {name}, your legal assistant for {j} law. I can explain statutes, sections and your rights, \
                 and suggest practical next steps. I'm an AI assistant, not a lawyer, so please consult a qualified \
                 lawyer for advice on your specific case."
            ),
            (Language::Urdu, CasualKind::Identity) => format!(
                "Main {name} hun, aap ka {j} ka Legal Assistant. Main qanoon, dafa'at aur aap ke huqooq samjha sakta hun. \
                 Main ek AI assistant hun, wakeel nahi, is liye apne masle ke liye kisi qualified wakeel se mashwara zaroor karen."
            ),
            (Language::English, CasualKind::Farewell) => {
                "Goodbye! Feel free to return anytime you need legal guidance. Take care!".to_string()
            }
            (Language::Urdu, CasualKind::Farewell) => {
                "Allah Hafiz! Aap ko phir kabhi legal masail mein madad ki zaroorat ho to zaroor aaiye.".to_string()
            }
            (Language::English, CasualKind::HistoryRecall) => format!(
                "We just started our conversation! You haven't asked anything yet. How can I help you with {j} law?"
            ),
            (Language::Urdu, CasualKind::HistoryRecall) => {
                "Hamari guftagu abhi shuru hui hai! Aap ne abhi tak koi sawal nahi poocha. Main kaise madad karun?"
                    .to_string()
            }
            (Language::English, CasualKind::Other) => {
                "I'm here to help you with legal matters. Do you have any legal questions I can assist with?".to_string()
            }
            (Language::Urdu, CasualKind::Other) => {
                "Main yahan aap ki legal masail mein madad ke liye hun. Kya aap ka koi qanooni sawal hai jo main jawab de sakun?"
                    .to_string()
            }
        }
    }

    /// Answer a question about the conversation from `prior` messages,
    /// which must not include the current utterance.
    pub fn recall(&self, query: &str, language: Language, prior: &[Message]) -> String {
        if prior.is_empty() {
            return self.reply(CasualKind::HistoryRecall, language);
        }

        let query = query.to_lowercase();
        let wants_last = ["last", "previous", "pichla"].iter().any(|w| query.contains(w));

        if wants_last {
            return match prior.iter().rev().find(|m| m.role == Role::User) {
                Some(last) => match language {
                    Language::English => format!(
                        "Your last message was: \"{}\"\n\nWould you like me to provide more details about that topic?",
                        last.content
                    ),
                    Language::Urdu => format!(
                        "Aap ka pichla paigham tha: \"{}\"\n\nKya aap is baare mein mazeed tafseel chahte hain?",
                        last.content
                    ),
                },
                None => self.reply(CasualKind::HistoryRecall, language),
            };
        }

        let (intro, you, me, outro) = match language {
            Language::English => (
                "Here's our conversation so far:",
                "You",
                "Me",
                "What else would you like to know?",
            ),
            Language::Urdu => (
                "Ab tak hamari guftagu:",
                "Aap",
                "Main",
                "Aap aur kya jaanna chahte hain?",
            ),
        };

        let mut out = format!("{}\n\n", intro);
        for (i, message) in prior.iter().enumerate() {
            let speaker = match message.role {
                Role::User => you,
                Role::Assistant => me,
            };
            let mut preview: String = message.content.chars().take(RECALL_PREVIEW_CHARS).collect();
            if message.content.chars().count() > RECALL_PREVIEW_CHARS {
                preview.push_str("...");
            }
            out.push_str(&format!("{}. {}: {}\n", i + 1, speaker, preview));
        }
        out.push('\n');
        out.push_str(outro);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_use_name_and_language() {
        let responder = CasualResponder::default();
        let hello = responder.reply(CasualKind::Greeting, Language::English);
        assert!(hello.contains("Sami Ullah AI"));
        let salam = responder.reply(CasualKind::Greeting, Language::Urdu);
        assert!(salam.starts_with("Salam!"));
        assert!(responder.reply(CasualKind::Identity, Language::English).contains("not a lawyer"));
    }

    #[test]
    fn test_recall_last_message() {
        let responder = CasualResponder::default();
        let prior = vec![
            Message::user("What is section 420?"),
            Message::assistant("Section 420 covers cheating."),
        ];
        let answer = responder.recall("what was my last message?", Language::English, &prior);
        assert!(answer.contains("\"What is section 420?\""));
    }

    #[test]
    fn test_recall_full_history() {
        let responder = CasualResponder::default();
        let prior = vec![Message::user("Hi"), Message::assistant(&"x".repeat(150))];
        let answer = responder.recall("show chat history", Language::English, &prior);
        assert!(answer.contains("1. You: Hi"));
        assert!(answer.contains("2. Me: "));
        assert!(answer.contains("..."));
    }

    #[test]
    fn test_recall_without_history() {
        let responder = CasualResponder::default();
        let answer = responder.recall("what did i ask", Language::English, &[]);
        assert!(answer.starts_with("We just started"));
    }
}
