//! Language-matched placeholder content for sections the model skipped.

use super::sections::SectionKind;
use crate::models::{HealthAnalysisResult, Language, PossibleCondition};

/// Fixed fallback text for one language.
#[derive(Debug, Clone, Copy)]
pub struct FallbackContent {
    pub analysis: &'static str,
    pub dos: &'static str,
    pub donts: &'static str,
    pub remedies: &'static str,
    pub recommendation: &'static str,
    pub primary_condition: &'static str,
    pub alternative_condition: &'static str,
}

const ENGLISH_FALLBACK: FallbackContent = FallbackContent {
    analysis: "I've analyzed your symptoms but couldn't structure the results. \
               Please consult a healthcare professional for proper diagnosis.",
    dos: "Consult a healthcare professional",
    donts: "Self-diagnose based on limited information",
    remedies: "Rest and proper hydration while seeking medical advice",
    recommendation: "Please consult with a healthcare professional for proper evaluation.",
    primary_condition: "Condition requiring professional assessment",
    alternative_condition: "Alternative explanation",
};

const TAMIL_FALLBACK: FallbackContent = FallbackContent {
    analysis: "நான் உங்கள் அறிகுறிகளை ஆராய்ந்தேன் ஆனால் முடிவுகளை கட்டமைக்க முடியவில்லை. \
               சரியான நோயறியலுக்கு ஒரு சுகாதார நிபுணரை ஆலோசிக்கவும்.",
    dos: "ஒரு சுகாதார நிபுணரை ஆலோசிக்கவும்",
    donts: "வரையறுக்கப்பட்ட தகவல்களின் அடிப்படையில் சுய நோயறியல்",
    remedies: "மருத்துவ ஆலோசனையை நாடும் போது ஓய்வு மற்றும் முறையான நீரேற்றம்",
    recommendation: "சரியான மதிப்பீட்டிற்கு ஒரு சுகாதார நிபுணரை ஆலோசிக்கவும்.",
    primary_condition: "தொழில்முறை மதிப்பீடு தேவைப்படும் நிலை",
    alternative_condition: "மாற்று விளக்கம்",
};

const PRIMARY_CONDITION_PROBABILITY: u8 = 90;
const ALTERNATIVE_CONDITION_PROBABILITY: u8 = 10;

impl FallbackContent {
    pub fn for_language(language: Language) -> &'static FallbackContent {
        match language {
            Language::English => &ENGLISH_FALLBACK,
            Language::Tamil => &TAMIL_FALLBACK,
        }
    }
}

/// Placeholder conditions used when nothing could be extracted.
pub fn fallback_conditions(language: Language) -> Vec<PossibleCondition> {
    let content = FallbackContent::for_language(language);
    vec![
        PossibleCondition::new(content.primary_condition, PRIMARY_CONDITION_PROBABILITY),
        PossibleCondition::new(
            content.alternative_condition,
            ALTERNATIVE_CONDITION_PROBABILITY,
        ),
    ]
}

/// Overwrite the `kinds` sections of `result` with fallback content for
/// `language`.
pub fn fill_with_fallback(
    result: &mut HealthAnalysisResult,
    kinds: &[SectionKind],
    language: Language,
) {
    let content = FallbackContent::for_language(language);
    for kind in kinds {
        match kind {
            SectionKind::Analysis => result.analysis = content.analysis.to_string(),
            SectionKind::Conditions => result.possible_conditions = fallback_conditions(language),
            SectionKind::Dos => result.dos = vec![content.dos.to_string()],
            SectionKind::Donts => result.donts = vec![content.donts.to_string()],
            SectionKind::Remedies => result.natural_remedies = vec![content.remedies.to_string()],
            SectionKind::Recommendation => {
                result.recommendation = content.recommendation.to_string()
            }
            SectionKind::Disclaimer => {}
        }
    }
}
