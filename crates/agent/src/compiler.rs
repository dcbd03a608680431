//! Response Compilation
//!
//! Merges the analysis, recommendations and referral of a turn into a
//! response with fixed sections in a fixed order. Section bodies come from
//! the labelled analysis text where the model produced them; every other
//! section gets fallback text so no section is ever missing.

use std::collections::HashMap;

use legal_agent_core::{Domain, Intent, Language};
use legal_agent_rag::Confidence;
use serde::{Deserialize, Serialize};

use crate::referral::SpecialistCategory;
use crate::synthesizer::Synthesis;

/// Sections of a substantive answer, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ApplicableLaw,
    SimplifiedText,
    Consequence,
    PracticalNote,
    Suggestions,
    Referral,
    Disclaimer,
}

impl SectionKind {
    pub const ORDERED: [SectionKind; 7] = [
        Self::ApplicableLaw,
        Self::SimplifiedText,
        Self::Consequence,
        Self::PracticalNote,
        Self::Suggestions,
        Self::Referral,
        Self::Disclaimer,
    ];

    /// Sections the analysis prompt asks the model to label
    pub const ANALYSIS: [SectionKind; 5] = [
        Self::ApplicableLaw,
        Self::SimplifiedText,
        Self::Consequence,
        Self::PracticalNote,
        Self::Suggestions,
    ];

    pub fn label(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::English, Self::ApplicableLaw) => "Applicable Law & Section",
            (Language::English, Self::SimplifiedText) => "Simplified Text",
            (Language::English, Self::Consequence) => "Consequence & Category",
            (Language::English, Self::PracticalNote) => "Practical Note",
            (Language::English, Self::Suggestions) => "Suggestions",
            (Language::English, Self::Referral) => "Referral",
            (Language::English, Self::Disclaimer) => "Disclaimer",
            (Language::Urdu, Self::ApplicableLaw) => "Qabil-e-Tatbeeq Qanoon aur Dafa",
            (Language::Urdu, Self::SimplifiedText) => "Qanooni Matn (Asaan Alfaaz)",
            (Language::Urdu, Self::Consequence) => "Saza aur Category",
            (Language::Urdu, Self::PracticalNote) => "Amali Nukta",
            (Language::Urdu, Self::Suggestions) => "Mashware",
            (Language::Urdu, Self::Referral) => "Wakeel ki Tavsiya",
            (Language::Urdu, Self::Disclaimer) => "Zaruri Note",
        }
    }

    /// Lowercase heading prefixes recognised in model output, both languages
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::ApplicableLaw => &[
                "applicable law & section",
                "applicable law and section",
                "applicable law",
                "applicable provision",
                "qabil-e-tatbeeq qanoon",
                "قابلِ اطلاق قانون",
                "قابل اطلاق قانون",
                "متعلقہ قانون",
            ],
            Self::SimplifiedText => &[
                "simplified text",
                "key legal text",
                "legal text",
                "explanation",
                "qanooni matn",
                "tashreeh",
                "قانونی متن",
                "آسان الفاظ",
                "تشریح",
                "وضاحت",
            ],
            Self::Consequence => &[
                "consequence & category",
                "consequence",
                "punishment & category",
                "punishment and category",
                "punishment",
                "saza",
                "سزا",
            ],
            Self::PracticalNote => &[
                "practical note",
                "practical implications",
                "amali nuktay",
                "amali nukta",
                "عملی نکات",
                "عملی نکتہ",
            ],
            Self::Suggestions => &["suggestions", "mashware", "مشورے", "تجاویز"],
            Self::Referral => &[],
            Self::Disclaimer => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicableLaw => "applicable_law",
            Self::SimplifiedText => "simplified_text",
            Self::Consequence => "consequence",
            Self::PracticalNote => "practical_note",
            Self::Suggestions => "suggestions",
            Self::Referral => "referral",
            Self::Disclaimer => "disclaimer",
        }
    }
}

/// One rendered section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSection {
    pub kind: SectionKind,
    pub label: String,
    pub body: String,
}

/// Domain, confidence and sources shown above a substantive answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub domain: Domain,
    pub confidence: Confidence,
    pub sources: Vec<String>,
}

/// The compiled answer for one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledResponse {
    pub intent: Intent,
    pub language: Language,
    /// Short opening line; the whole reply for casual turns
    pub acknowledgment: String,
    pub header: Option<ResponseHeader>,
    /// Empty for casual turns, otherwise every `SectionKind` in order
    pub sections: Vec<ResponseSection>,
    /// True when any stage fell back to a template
    pub degraded: bool,
    /// What could not be completed, shown under the header when degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl CompiledResponse {
    pub fn with_header(mut self, header: ResponseHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// Mark a failure the compiler could not see (e.g. retrieval)
    pub fn mark_degraded(mut self, notice: String) -> Self {
        self.degraded = true;
        if self.notice.is_none() {
            self.notice = Some(notice);
        }
        self
    }

    pub fn section(&self, kind: SectionKind) -> Option<&ResponseSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Final text shown to the user
    pub fn render(&self) -> String {
        if self.intent == Intent::Casual {
            return self.acknowledgment.clone();
        }

        let labels = HeaderLabels::for_language(self.language);
        let mut out = format!("## {}\n\n", labels.title);

        if let Some(overview) = self.overview() {
            out.push_str(&overview);
            out.push_str("\n\n");
        }

        for section in &self.sections {
            if section.kind == SectionKind::Disclaimer {
                if let Some(sources) = self.sources_block() {
                    out.push_str(&sources);
                    out.push_str("\n\n");
                }
            }
            out.push_str(&format!("**{}:**\n{}\n\n", section.label, section.body));
        }

        out.trim_end().to_string()
    }

    /// Domain and confidence lines followed by the degraded notice, if any
    pub fn overview(&self) -> Option<String> {
        let labels = HeaderLabels::for_language(self.language);
        let mut parts = Vec::with_capacity(2);
        if let Some(header) = &self.header {
            parts.push(format!(
                "**{}:** {}\n**{}:** {}",
                labels.domain,
                header.domain.display_name(),
                labels.confidence,
                header.confidence
            ));
        }
        if let Some(notice) = &self.notice {
            parts.push(format!("_{}_", notice));
        }
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// Source list shown above the disclaimer
    pub fn sources_block(&self) -> Option<String> {
        let header = self.header.as_ref().filter(|h| !h.sources.is_empty())?;
        let labels = HeaderLabels::for_language(self.language);
        let mut out = labels.sources.to_string();
        for source in &header.sources {
            out.push_str(&format!("\n- {}", source));
        }
        Some(out)
    }
}

struct HeaderLabels {
    title: &'static str,
    domain: &'static str,
    confidence: &'static str,
    sources: &'static str,
}

impl HeaderLabels {
    fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self {
                title: "Legal Analysis & Advice",
                domain: "Query Domain",
                confidence: "Confidence Level",
                sources: "Based on the following legal documents:",
            },
            Language::Urdu => Self {
                title: "Qanooni Tajziya aur Mashwara",
                domain: "Sawal ka Domain",
                confidence: "Yaqeen ka Daraja",
                sources: "Yeh maloomat in qanooni dastavezat par mabni hai:",
            },
        }
    }
}

/// Opening line of a substantive answer
pub fn acknowledgment(language: Language) -> &'static str {
    match language {
        Language::English => "Let me check that for you...",
        Language::Urdu => "Main aap ke liye yeh dekhta hun...",
    }
}

/// Split labelled analysis text into section bodies.
///
/// A heading is a line whose text before the first `:` (markdown markers and
/// list numbering stripped) starts with a known label. Text after the colon
/// starts the body; following lines belong to it until the next heading.
/// Lines before the first heading are kept at the front of that heading's
/// section. Text with no heading at all becomes the Applicable Law body.
pub fn extract_sections(text: &str) -> HashMap<SectionKind, String> {
    let mut sections: HashMap<SectionKind, String> = HashMap::new();
    let mut current: Option<SectionKind> = None;
    let mut lead = String::new();

    for line in text.lines() {
        if let Some((kind, rest)) = parse_heading(line) {
            let body = sections.entry(kind).or_default();
            if current.is_none() && !lead.is_empty() {
                append_line(body, &std::mem::take(&mut lead));
            }
            current = Some(kind);
            if !rest.is_empty() {
                append_line(body, rest);
            }
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match current {
            Some(kind) => append_line(sections.entry(kind).or_default(), trimmed),
            None => append_line(&mut lead, trimmed),
        }
    }

    if !lead.is_empty() {
        sections.insert(SectionKind::ApplicableLaw, lead);
    }
    sections.retain(|_, body| !body.trim().is_empty());
    sections
}

fn append_line(body: &mut String, line: &str) {
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(line);
}

fn parse_heading(line: &str) -> Option<(SectionKind, &str)> {
    let cleaned = line
        .trim()
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '-' || c.is_whitespace())
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(|c: char| c == '.' || c == ')' || c.is_whitespace())
        .trim_start_matches('*');

    let (head, rest) = match cleaned.find(':') {
        Some(pos) => (&cleaned[..pos], &cleaned[pos + 1..]),
        None => (cleaned, ""),
    };
    let head = head.trim().trim_matches('*').trim().to_lowercase();
    if head.is_empty() {
        return None;
    }
    let rest = rest.trim().trim_start_matches('*').trim();

    SectionKind::ANALYSIS
        .iter()
        .find(|kind| {
            kind.aliases().iter().any(|alias| {
                head.starts_with(alias)
                    // a bare line must be the heading itself, not prose that begins with it
                    && (cleaned.contains(':') || head.len() <= alias.len() + 12)
            })
        })
        .map(|kind| (*kind, rest))
}

/// Builds `CompiledResponse`s
pub struct ResponseCompiler {
    jurisdiction: String,
}

impl Default for ResponseCompiler {
    fn default() -> Self {
        Self::new("Pakistan")
    }
}

impl ResponseCompiler {
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
        }
    }

    /// Compile one turn. Casual turns use `analysis` as the reply text.
    pub fn compile(
        &self,
        intent: Intent,
        language: Language,
        analysis: Option<&Synthesis>,
        recommendations: Option<&Synthesis>,
        referral: Option<&SpecialistCategory>,
    ) -> CompiledResponse {
        if intent == Intent::Casual {
            let reply = analysis
                .map(|a| a.text().trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.casual_fallback(language).to_string());
            return CompiledResponse {
                intent,
                language,
                acknowledgment: reply,
                header: None,
                sections: Vec::new(),
                degraded: analysis.map_or(false, Synthesis::is_degraded),
                notice: None,
            };
        }

        let extracted = analysis.map(|a| extract_sections(a.text())).unwrap_or_default();
        let recommendation_text = recommendations
            .map(|r| r.text().trim())
            .filter(|t| !t.is_empty());

        let sections = SectionKind::ORDERED
            .iter()
            .map(|kind| {
                let body = match kind {
                    SectionKind::Suggestions => recommendation_text
                        .map(str::to_string)
                        .or_else(|| extracted.get(kind).cloned()),
                    SectionKind::Referral => referral.map(|r| r.guidance(language)),
                    SectionKind::Disclaimer => Some(self.disclaimer(language)),
                    _ => extracted.get(kind).cloned(),
                }
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| self.fallback(*kind, language));

                ResponseSection {
                    kind: *kind,
                    label: kind.label(language).to_string(),
                    body,
                }
            })
            .collect();

        let degraded = analysis.map_or(true, Synthesis::is_degraded)
            || recommendations.map_or(false, Synthesis::is_degraded);

        CompiledResponse {
            intent,
            language,
            acknowledgment: acknowledgment(language).to_string(),
            header: None,
            sections,
            degraded,
            notice: degraded.then(|| self.degraded_notice(language)),
        }
    }

    /// Notice for answers assembled partly from templates
    pub fn degraded_notice(&self, language: Language) -> String {
        match language {
            Language::English => "Part of this answer could not be completed because the legal analysis \
                service or document search was unavailable. The sections below contain general guidance; \
                you can rephrase your question or try again later."
                .to_string(),
            Language::Urdu => "Qanooni tajziye ki service ya dastavezat ki talash dastiyab na hone ki wajah se \
                is jawab ka kuch hissa mukammal nahi ho saka. Neeche aam rahnumai di gayi hai; aap sawal \
                dobara likh sakte hain ya thodi der baad koshish kar sakte hain."
                .to_string(),
        }
    }

    fn casual_fallback(&self, language: Language) -> &'static str {
        match language {
            Language::English => {
                "I'm here to help you with legal matters. Do you have any legal questions I can assist with?"
            }
            Language::Urdu => {
                "Main yahan aap ki legal masail mein madad ke liye hun. Kya aap ka koi qanooni sawal hai?"
            }
        }
    }

    pub fn disclaimer(&self, language: Language) -> String {
        match language {
            Language::English => format!(
                "This is preliminary legal guidance based on available legal documents. \
                 Always consult a qualified lawyer in {} for advice on your specific situation. \
                 Remember: I am an AI assistant, not a lawyer.",
                self.jurisdiction
            ),
            Language::Urdu => format!(
                "Yeh abtedai qanooni rahnumai hai jo dastiyab qanooni dastavezat par mabni hai. \
                 Apne makhsoos masle ke liye hamesha {} ke kisi qualified wakeel se mashwara karen. \
                 Yaad Rahen: Main ek AI assistant hun, wakeel nahi.",
                self.jurisdiction
            ),
        }
    }

    /// Non-empty stand-in for a section the analysis did not supply
    pub fn fallback(&self, kind: SectionKind, language: Language) -> String {
        let text = match (language, kind) {
            (Language::English, SectionKind::ApplicableLaw) => {
                "No specific provision could be identified from the available legal documents."
            }
            (Language::English, SectionKind::SimplifiedText) => {
                "A simplified explanation is not available for this query. Please refer to the source documents."
            }
            (Language::English, SectionKind::Consequence) => {
                "Consequences depend on the exact provision and the facts of the case. A lawyer can confirm the applicable penalty."
            }
            (Language::English, SectionKind::PracticalNote) => {
                "Keep a written record of the relevant facts, dates and documents."
            }
            (Language::English, SectionKind::Suggestions) => {
                "Gather your documents and seek advice from a qualified lawyer before taking any step."
            }
            (Language::English, SectionKind::Referral) => {
                "Consult a General Practice Lawyer registered with the Bar Council."
            }
            (Language::Urdu, SectionKind::ApplicableLaw) => {
                "Dastiyab qanooni dastavezat se koi makhsoos dafa maloom nahi ho saki."
            }
            (Language::Urdu, SectionKind::SimplifiedText) => {
                "Is sawal ki asaan tashreeh dastiyab nahi. Barah-e-karam asal dastavezat dekhein."
            }
            (Language::Urdu, SectionKind::Consequence) => {
                "Nataij dafa aur muqadme ke haqaiq par munhasir hain. Wakeel saza ki tasdeeq kar sakta hai."
            }
            (Language::Urdu, SectionKind::PracticalNote) => {
                "Tamam mutalliqah haqaiq, tareekhon aur kagzaat ka record rakhein."
            }
            (Language::Urdu, SectionKind::Suggestions) => {
                "Koi bhi qadam uthane se pehle kagzaat jama karen aur qualified wakeel se mashwara karen."
            }
            (Language::Urdu, SectionKind::Referral) => {
                "Bar Council mein registered kisi General Practice Wakeel se raabta karen."
            }
            (_, SectionKind::Disclaimer) => return self.disclaimer(language),
        };
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELLED: &str = "**Applicable Law & Section:** Section 420, Pakistan Penal Code 1860\n\
        **Key Legal Text (simplified):** Whoever cheats and dishonestly induces delivery of property.\n\
        It covers fraud involving property.\n\
        **Punishment & Category:** Up to seven years and fine. Non-bailable.\n\
        **Practical Implications:** File an FIR promptly.";

    #[test]
    fn test_extract_labelled_sections() {
        let sections = extract_sections(LABELLED);
        assert_eq!(
            sections.get(&SectionKind::ApplicableLaw).map(String::as_str),
            Some("Section 420, Pakistan Penal Code 1860")
        );
        let simplified = &sections[&SectionKind::SimplifiedText];
        assert!(simplified.contains("It covers fraud"));
        assert!(sections[&SectionKind::Consequence].starts_with("Up to seven years"));
        assert!(sections.contains_key(&SectionKind::PracticalNote));
        assert!(!sections.contains_key(&SectionKind::Suggestions));
    }

    #[test]
    fn test_extract_numbered_headings() {
        let text = "1. Applicable Law:\nPPC 302\n2. **Punishment:** death or life imprisonment";
        let sections = extract_sections(text);
        assert_eq!(sections[&SectionKind::ApplicableLaw], "PPC 302");
        assert_eq!(sections[&SectionKind::Consequence], "death or life imprisonment");
    }

    #[test]
    fn test_unlabelled_analysis_is_kept() {
        let text = "Section 420 of the Pakistan Penal Code punishes cheating with up to seven years.";
        let sections = extract_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&SectionKind::ApplicableLaw], text);

        let compiler = ResponseCompiler::default();
        let analysis = Synthesis::Generated(text.to_string());
        let response = compiler.compile(Intent::Substantive, Language::English, Some(&analysis), None, None);
        assert!(!response.degraded);
        assert_eq!(response.section(SectionKind::ApplicableLaw).unwrap().body, text);
        assert!(response.render().contains("seven years"));
    }

    #[test]
    fn test_lead_in_joins_first_section() {
        let text = "Here is my analysis.\n\n**Simplified Text:** Cheating for property.\n**Punishment:** seven years";
        let sections = extract_sections(text);
        assert_eq!(
            sections[&SectionKind::SimplifiedText],
            "Here is my analysis.\nCheating for property."
        );
        assert_eq!(sections[&SectionKind::Consequence], "seven years");
        assert!(!sections.contains_key(&SectionKind::ApplicableLaw));
    }

    #[test]
    fn test_extract_urdu_script_headings() {
        let text = "قابل اطلاق قانون: تعزیراتِ پاکستان دفعہ 420\nسزا: سات سال تک قید\nعملی نکتہ: ایف آئی آر درج کرائیں";
        let sections = extract_sections(text);
        assert_eq!(sections[&SectionKind::ApplicableLaw], "تعزیراتِ پاکستان دفعہ 420");
        assert_eq!(sections[&SectionKind::Consequence], "سات سال تک قید");
        assert_eq!(sections[&SectionKind::PracticalNote], "ایف آئی آر درج کرائیں");
    }

    #[test]
    fn test_compile_orders_all_sections() {
        let compiler = ResponseCompiler::default();
        let analysis = Synthesis::Generated(LABELLED.to_string());
        let recs = Synthesis::Generated("1. File an FIR".to_string());
        let response = compiler.compile(
            Intent::Substantive,
            Language::English,
            Some(&analysis),
            Some(&recs),
            Some(&SpecialistCategory::CriminalDefense),
        );

        let kinds: Vec<SectionKind> = response.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ORDERED.to_vec());
        assert!(response.sections.iter().all(|s| !s.body.trim().is_empty()));
        assert_eq!(response.section(SectionKind::Suggestions).unwrap().body, "1. File an FIR");
        assert!(response.section(SectionKind::Referral).unwrap().body.contains("Criminal Defense Lawyer"));
        assert!(!response.degraded);
    }

    #[test]
    fn test_compile_fills_missing_sections() {
        let compiler = ResponseCompiler::default();
        let analysis = Synthesis::Degraded {
            text: "unstructured".to_string(),
            reason: "timeout".to_string(),
        };
        let response = compiler.compile(Intent::Substantive, Language::Urdu, Some(&analysis), None, None);
        assert_eq!(response.sections.len(), 7);
        assert!(response.sections.iter().all(|s| !s.body.trim().is_empty()));
        assert_eq!(response.sections[0].label, "Qabil-e-Tatbeeq Qanoon aur Dafa");
        assert!(response.degraded);
        assert!(response.notice.is_some());
        assert!(response.render().contains("dobara likh sakte hain"));
    }

    #[test]
    fn test_render_includes_header_sources_and_disclaimer_last() {
        let compiler = ResponseCompiler::default();
        let analysis = Synthesis::Generated(LABELLED.to_string());
        let response = compiler
            .compile(Intent::Substantive, Language::English, Some(&analysis), None, None)
            .with_header(ResponseHeader {
                domain: Domain::Criminal,
                confidence: Confidence::High,
                sources: vec!["Pakistan Penal Code 1860".to_string()],
            });

        let text = response.render();
        assert!(text.starts_with("## Legal Analysis & Advice"));
        assert!(text.contains("**Query Domain:** Criminal"));
        assert!(text.contains("**Confidence Level:** high"));
        assert!(text.contains("- Pakistan Penal Code 1860"));

        let law = text.find("**Applicable Law & Section:**").unwrap();
        let suggestions = text.find("**Suggestions:**").unwrap();
        let disclaimer = text.find("**Disclaimer:**").unwrap();
        assert!(law < suggestions && suggestions < disclaimer);
        assert!(text.ends_with("not a lawyer."));
    }

    #[test]
    fn test_casual_compiles_to_acknowledgment() {
        let compiler = ResponseCompiler::default();
        let reply = Synthesis::Generated("Salam!".to_string());
        let response = compiler.compile(Intent::Casual, Language::Urdu, Some(&reply), None, None);
        assert!(response.sections.is_empty());
        assert_eq!(response.render(), "Salam!");

        let empty = compiler.compile(Intent::Casual, Language::English, None, None, None);
        assert!(!empty.render().is_empty());
    }
}
