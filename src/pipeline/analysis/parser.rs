use rand::Rng;

use super::conditions::extract_conditions_with_rng;
use super::extract::{extract_items, extract_paragraph, find_section};
use super::fallback::fill_with_fallback;
use super::sections::{ExtractionStrategy, SectionKind, SectionRule, SectionTable};
use crate::models::{HealthAnalysisResult, Language, PossibleCondition};

/// Instruction-closing delimiters that mark the end of an echoed prompt.
const PROMPT_ECHO_DELIMITERS: &[&str] = &["[/INST]"];

/// Remove an echoed prompt from the front of a completion.
///
/// Keeps only what follows the last closing delimiter, minus any
/// end-of-sequence tokens. Text without a delimiter is returned as-is.
pub fn strip_prompt_echo(raw: &str) -> &str {
    let mut content = raw;
    for delimiter in PROMPT_ECHO_DELIMITERS {
        if let Some(idx) = content.rfind(delimiter) {
            content = &content[idx + delimiter.len()..];
        }
    }

    let mut content = content.trim_start();
    while let Some(rest) = content.strip_prefix("</s>") {
        content = rest.trim_start();
    }
    content
}

enum SectionValue {
    Text(String),
    Items(Vec<String>),
    Conditions(Vec<PossibleCondition>),
}

impl SectionValue {
    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Items(items) => items.is_empty(),
            Self::Conditions(conditions) => conditions.is_empty(),
        }
    }
}

fn run_strategy<R: Rng>(
    content: &str,
    rule: &SectionRule,
    language: Language,
    rng: &mut R,
) -> SectionValue {
    let section = find_section(content, rule.synonyms);
    match rule.strategy {
        ExtractionStrategy::Paragraph => SectionValue::Text(extract_paragraph(section)),
        ExtractionStrategy::BulletList => SectionValue::Items(extract_items(section)),
        ExtractionStrategy::PercentageList => SectionValue::Conditions(
            extract_conditions_with_rng(section, rule.synonyms, language, rng),
        ),
    }
}

/// Sections extracted from a completion, before fallback substitution.
#[derive(Debug, Clone)]
pub struct ParsedSections {
    /// Extracted values. Fields of the sections in `missing` are empty.
    pub result: HealthAnalysisResult,
    /// Sections that yielded nothing, in table order.
    pub missing: Vec<SectionKind>,
}

/// Parse a free-form completion into a complete [`HealthAnalysisResult`].
///
/// Never fails. Each section is extracted independently; a section that
/// yields nothing gets the fallback value for `language`. `image_description`
/// is passed through to `image_analysis` unchanged.
pub fn parse_health_analysis(
    raw: &str,
    language: Language,
    image_description: Option<&str>,
) -> HealthAnalysisResult {
    parse_health_analysis_with_rng(raw, language, image_description, &mut rand::thread_rng())
}

/// [`parse_health_analysis`] with an injectable random source for estimated
/// condition probabilities.
pub fn parse_health_analysis_with_rng<R: Rng>(
    raw: &str,
    language: Language,
    image_description: Option<&str>,
    rng: &mut R,
) -> HealthAnalysisResult {
    let ParsedSections {
        mut result,
        missing,
    } = parse_sections_with_rng(raw, language, image_description, rng);

    if !missing.is_empty() {
        tracing::debug!(
            language = %language,
            missing = ?missing,
            "Substituted fallback content for missing sections"
        );
        fill_with_fallback(&mut result, &missing, language);
    }
    result
}

/// Extract every section without filling gaps, so a caller can choose the
/// fallback language itself.
pub fn parse_sections(
    raw: &str,
    language: Language,
    image_description: Option<&str>,
) -> ParsedSections {
    parse_sections_with_rng(raw, language, image_description, &mut rand::thread_rng())
}

fn parse_sections_with_rng<R: Rng>(
    raw: &str,
    language: Language,
    image_description: Option<&str>,
    rng: &mut R,
) -> ParsedSections {
    let content = strip_prompt_echo(raw);
    let table = SectionTable::for_language(language);
    let mut result = HealthAnalysisResult {
        analysis: String::new(),
        possible_conditions: Vec::new(),
        dos: Vec::new(),
        donts: Vec::new(),
        natural_remedies: Vec::new(),
        recommendation: String::new(),
        image_analysis: image_description.map(str::to_string),
        language,
    };
    let mut missing = Vec::new();

    for rule in table.sections {
        if rule.kind == SectionKind::Disclaimer {
            continue;
        }

        let value = run_strategy(content, rule, language, rng);
        if value.is_empty() {
            missing.push(rule.kind);
            continue;
        }

        match (rule.kind, value) {
            (SectionKind::Analysis, SectionValue::Text(text)) => result.analysis = text,
            (SectionKind::Recommendation, SectionValue::Text(text)) => {
                result.recommendation = text
            }
            (SectionKind::Conditions, SectionValue::Conditions(conditions)) => {
                result.possible_conditions = conditions
            }
            (SectionKind::Dos, SectionValue::Items(items)) => result.dos = items,
            (SectionKind::Donts, SectionValue::Items(items)) => result.donts = items,
            (SectionKind::Remedies, SectionValue::Items(items)) => {
                result.natural_remedies = items
            }
            (kind, _) => {
                tracing::warn!(section = kind.as_str(), "Section table strategy mismatch");
                missing.push(kind);
            }
        }
    }

    ParsedSections { result, missing }
}
