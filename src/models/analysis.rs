use serde::{Deserialize, Serialize};

use super::enums::Language;

/// Structured health report parsed from a free-form completion.
///
/// Every field is always populated: sections that could not be extracted
/// carry the language-matched fallback value instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysisResult {
    pub analysis: String,
    pub possible_conditions: Vec<PossibleCondition>,
    pub dos: Vec<String>,
    pub donts: Vec<String>,
    pub natural_remedies: Vec<String>,
    pub recommendation: String,
    /// Opaque reference to the submitted image. `None` unless the request
    /// came from image input.
    pub image_analysis: Option<String>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleCondition {
    pub name: String,
    /// Percentage in 0..=100. Entries are not normalized against each other.
    pub probability: u8,
}

impl PossibleCondition {
    pub fn new(name: impl Into<String>, probability: u8) -> Self {
        Self {
            name: name.into(),
            probability: probability.min(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_front_end_field_names() {
        let result = HealthAnalysisResult {
            analysis: "a".into(),
            possible_conditions: vec![PossibleCondition::new("Flu", 30)],
            dos: vec!["Rest".into()],
            donts: vec!["Smoke".into()],
            natural_remedies: vec!["Honey".into()],
            recommendation: "See a GP".into(),
            image_analysis: None,
            language: Language::English,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["possibleConditions"][0]["name"], "Flu");
        assert_eq!(json["possibleConditions"][0]["probability"], 30);
        assert_eq!(json["naturalRemedies"][0], "Honey");
        assert!(json["imageAnalysis"].is_null());
        assert_eq!(json["language"], "english");
    }

    #[test]
    fn condition_probability_is_capped() {
        assert_eq!(PossibleCondition::new("x", 250).probability, 100);
    }
}
