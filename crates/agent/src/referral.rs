//! Specialist Referral
//!
//! Maps a legal domain to the kind of lawyer worth consulting.

use legal_agent_core::{Domain, Language};
use serde::{Deserialize, Serialize};

/// Kind of specialist to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistCategory {
    CriminalDefense,
    HumanRightsCriminal,
    CivilLitigation,
    FamilyLaw,
    PropertyRealEstate,
    CorporateCommercial,
    Constitutional,
    LitigationProcedural,
    GeneralPractice,
}

impl SpecialistCategory {
    /// The domain this specialist covers
    pub fn domain(&self) -> Domain {
        match self {
            Self::CriminalDefense => Domain::Criminal,
            Self::HumanRightsCriminal => Domain::PoliceMisconduct,
            Self::CivilLitigation => Domain::Civil,
            Self::FamilyLaw => Domain::Family,
            Self::PropertyRealEstate => Domain::Property,
            Self::CorporateCommercial => Domain::Commercial,
            Self::Constitutional => Domain::Constitutional,
            Self::LitigationProcedural => Domain::Procedural,
            Self::GeneralPractice => Domain::Other,
        }
    }

    fn specialty(&self) -> &'static str {
        match self {
            Self::CriminalDefense => "Criminal Defense",
            Self::HumanRightsCriminal => "Human Rights / Criminal",
            Self::CivilLitigation => "Civil Litigation",
            Self::FamilyLaw => "Family Law",
            Self::PropertyRealEstate => "Property / Real Estate",
            Self::CorporateCommercial => "Corporate / Commercial",
            Self::Constitutional => "Constitutional",
            Self::LitigationProcedural => "Litigation / Procedural",
            Self::GeneralPractice => "General Practice",
        }
    }

    /// Localized label, e.g. "Criminal Defense Lawyer" / "Criminal Defense Wakeel"
    pub fn label(&self, language: Language) -> String {
        match language {
            Language::English => format!("{} Lawyer", self.specialty()),
            Language::Urdu => format!("{} Wakeel", self.specialty()),
        }
    }

    /// Guidance block naming the specialist, why, and what to look for
    pub fn guidance(&self, language: Language) -> String {
        let area = self.domain().display_name().to_lowercase();
        let label = self.label(language);
        match language {
            Language::English => format!(
                "Recommended Legal Representation: {label}\n\n\
                 Why this specialization:\n\
                 - Specialized knowledge in {area} law\n\
                 - Experience with similar cases\n\
                 - Understanding of the relevant procedures\n\n\
                 What to look for:\n\
                 - Registration with the Bar Council\n\
                 - Experience in {area} cases\n\
                 - A good track record\n\
                 - A clear fee structure"
            ),
            Language::Urdu => format!(
                "Tavsiya Shuda Qanooni Numayandagi: {label}\n\n\
                 Is Maharat ki Wajah:\n\
                 - {area} qanoon mein khusoosi maloomat\n\
                 - Isi tarah ke muqadmat ka tajruba\n\
                 - Mutalliqah qanooni rawaiyon ki samajh\n\n\
                 Kya Dhundna Chahiye:\n\
                 - Bar Council ki registration\n\
                 - {area} muqadmat mein tajruba\n\
                 - Acha track record\n\
                 - Wazeh fee structure"
            ),
        }
    }
}

/// Domain to specialist mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferralAdvisor;

impl ReferralAdvisor {
    pub fn new() -> Self {
        Self
    }

    pub fn advise(&self, domain: Domain) -> SpecialistCategory {
        match domain {
            Domain::Criminal => SpecialistCategory::CriminalDefense,
            Domain::PoliceMisconduct => SpecialistCategory::HumanRightsCriminal,
            Domain::Civil => SpecialistCategory::CivilLitigation,
            Domain::Family => SpecialistCategory::FamilyLaw,
            Domain::Property => SpecialistCategory::PropertyRealEstate,
            Domain::Commercial => SpecialistCategory::CorporateCommercial,
            Domain::Constitutional => SpecialistCategory::Constitutional,
            Domain::Procedural => SpecialistCategory::LitigationProcedural,
            Domain::Other => SpecialistCategory::GeneralPractice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total_and_reversible() {
        let advisor = ReferralAdvisor::new();
        for domain in Domain::all() {
            assert_eq!(advisor.advise(*domain).domain(), *domain);
        }
    }

    #[test]
    fn test_labels() {
        let advisor = ReferralAdvisor::new();
        let criminal = advisor.advise(Domain::Criminal);
        assert_eq!(criminal.label(Language::English), "Criminal Defense Lawyer");
        assert_eq!(criminal.label(Language::Urdu), "Criminal Defense Wakeel");
        assert_eq!(
            advisor.advise(Domain::PoliceMisconduct).label(Language::English),
            "Human Rights / Criminal Lawyer"
        );
        assert_eq!(
            advisor.advise(Domain::Other).label(Language::English),
            "General Practice Lawyer"
        );
    }

    #[test]
    fn test_guidance_mentions_domain() {
        let guidance = SpecialistCategory::FamilyLaw.guidance(Language::English);
        assert!(guidance.contains("Family Law Lawyer"));
        assert!(guidance.contains("family law"));
        assert!(guidance.contains("Bar Council"));

        let urdu = SpecialistCategory::FamilyLaw.guidance(Language::Urdu);
        assert!(urdu.contains("Kya Dhundna Chahiye"));
    }
}
