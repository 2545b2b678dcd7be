use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use super::extract::{clean_item, plain_text};
use super::fallback::fallback_conditions;
use crate::models::{Language, PossibleCondition};

/// `Name - 70%`, `Name: 70%`, `Name – 70%` or `Name (70%)`.
///
/// Names start with a Latin or Tamil letter and never span lines.
static PERCENTAGE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z\x{0B80}-\x{0BFF}][A-Za-z\x{0B80}-\x{0BFF}0-9 \t'’/-]*?)(?:[ \t]*[-–:][ \t]*|[ \t]+\()([0-9]+)[ \t]*%",
    )
    .unwrap()
});

/// Range used when the model lists conditions without percentages.
const ESTIMATED_PROBABILITY_MIN: u8 = 40;
const ESTIMATED_PROBABILITY_MAX: u8 = 79;

/// Extract `(name, probability)` pairs from a conditions section.
///
/// Three strategies are tried in order:
/// 1. explicit percentage pairs anywhere in the section;
/// 2. one condition per non-heading line, with an estimated probability;
/// 3. a fixed two-entry placeholder in `language`.
///
/// The result is never empty.
pub fn extract_conditions(
    section_text: &str,
    heading_synonyms: &[&str],
    language: Language,
) -> Vec<PossibleCondition> {
    extract_conditions_with_rng(
        section_text,
        heading_synonyms,
        language,
        &mut rand::thread_rng(),
    )
}

/// [`extract_conditions`] with an injectable random source for the
/// estimated probabilities.
pub fn extract_conditions_with_rng<R: Rng>(
    section_text: &str,
    heading_synonyms: &[&str],
    language: Language,
    rng: &mut R,
) -> Vec<PossibleCondition> {
    let explicit = percentage_pairs(section_text);
    if !explicit.is_empty() {
        return explicit;
    }

    let listed = listed_names(section_text, heading_synonyms);
    if !listed.is_empty() {
        tracing::debug!(
            count = listed.len(),
            "No percentages in conditions section, estimating probabilities"
        );
        return listed
            .into_iter()
            .map(|name| {
                let probability =
                    rng.gen_range(ESTIMATED_PROBABILITY_MIN..=ESTIMATED_PROBABILITY_MAX);
                PossibleCondition::new(name, probability)
            })
            .collect();
    }

    fallback_conditions(language)
}

fn percentage_pairs(section_text: &str) -> Vec<PossibleCondition> {
    let plain = plain_text(section_text);
    PERCENTAGE_PAIR
        .captures_iter(&plain)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            if name.is_empty() {
                return None;
            }
            // Overflowing digit runs are still "more than 100".
            let probability = caps
                .get(2)?
                .as_str()
                .parse::<u32>()
                .map_or(100, |value| value.min(100));
            Some(PossibleCondition::new(name.to_string(), probability as u8))
        })
        .collect()
}

fn listed_names(section_text: &str, heading_synonyms: &[&str]) -> Vec<String> {
    section_text
        .lines()
        .skip(1)
        .filter(|line| {
            let lower = line.to_lowercase();
            !heading_synonyms
                .iter()
                .any(|synonym| lower.contains(synonym))
        })
        .map(clean_item)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SYNONYMS: &[&str] = &["possible conditions", "conditions", "condition"];

    fn names(conditions: &[PossibleCondition]) -> Vec<&str> {
        conditions.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn dash_separated_percentages() {
        let section = "Possible Conditions\n1. Common cold - 70%\n2. Flu - 30%";
        let conditions = extract_conditions(section, SYNONYMS, Language::English);
        assert_eq!(
            conditions,
            vec![
                PossibleCondition::new("Common cold", 70),
                PossibleCondition::new("Flu", 30),
            ]
        );
    }

    #[test]
    fn parenthesised_and_colon_percentages() {
        let section = "Possible Conditions:\n- Common cold (60%)\n- **Influenza**: 25%\n- Allergic rhinitis – 15 %";
        let conditions = extract_conditions(section, SYNONYMS, Language::English);
        assert_eq!(
            names(&conditions),
            vec!["Common cold", "Influenza", "Allergic rhinitis"]
        );
        assert_eq!(
            conditions.iter().map(|c| c.probability).collect::<Vec<_>>(),
            vec![60, 25, 15]
        );
    }

    #[test]
    fn hyphenated_names_survive() {
        let section = "Conditions\n- Covid-19 - 20%\n- Flu-like illness (40%)";
        let conditions = extract_conditions(section, SYNONYMS, Language::English);
        assert_eq!(names(&conditions), vec!["Covid-19", "Flu-like illness"]);
    }

    #[test]
    fn probability_is_capped() {
        let section = "Conditions\n- Migraine - 150%\n- Tension headache - 99999999999999999999%";
        let conditions = extract_conditions(section, SYNONYMS, Language::English);
        assert!(conditions.iter().all(|c| c.probability == 100));
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn unlabelled_list_gets_estimated_probabilities() {
        let section = "Possible Conditions\n- Strep throat\n- Tonsillitis";
        let mut rng = StdRng::seed_from_u64(7);
        let conditions =
            extract_conditions_with_rng(section, SYNONYMS, Language::English, &mut rng);
        assert_eq!(names(&conditions), vec!["Strep throat", "Tonsillitis"]);
        for condition in &conditions {
            assert!((40..80).contains(&condition.probability));
        }
    }

    #[test]
    fn estimated_probabilities_stay_in_range_across_seeds() {
        let section = "Conditions\n- A\n- B\n- C";
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let conditions =
                extract_conditions_with_rng(section, SYNONYMS, Language::English, &mut rng);
            assert!(conditions
                .iter()
                .all(|c| (40..=79).contains(&c.probability)));
        }
    }

    #[test]
    fn heading_lines_are_not_conditions() {
        let section = "Possible Conditions\nThese conditions are likely:\n- Sinusitis";
        let conditions = extract_conditions(section, SYNONYMS, Language::English);
        assert_eq!(names(&conditions), vec!["Sinusitis"]);
    }

    #[test]
    fn empty_section_gets_placeholder() {
        let conditions = extract_conditions("", SYNONYMS, Language::English);
        assert_eq!(
            conditions,
            vec![
                PossibleCondition::new("Condition requiring professional assessment", 90),
                PossibleCondition::new("Alternative explanation", 10),
            ]
        );
    }

    #[test]
    fn tamil_placeholder_is_tamil() {
        let conditions = extract_conditions("நிலைமைகள்", &["நிலைமைகள்"], Language::Tamil);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].probability, 90);
        assert!(!conditions[0].name.is_ascii());
    }

    #[test]
    fn tamil_names_with_percentages() {
        let section = "சாத்தியமான நிலைமைகள்:\n- சளி - 60%\n- காய்ச்சல் (40%)";
        let conditions =
            extract_conditions(section, &["சாத்தியமான நிலைமைகள்"], Language::Tamil);
        assert_eq!(names(&conditions), vec!["சளி", "காய்ச்சல்"]);
    }
}
