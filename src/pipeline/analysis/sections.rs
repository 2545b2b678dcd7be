//! Heading synonym tables, one per language.
//!
//! The parser is driven entirely by this table: each logical section of the
//! report maps to the heading phrases that introduce it and to the strategy
//! used to turn its body into a result field.

use crate::models::Language;

/// The seven logical divisions the prompt asks the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Analysis,
    Conditions,
    Dos,
    Donts,
    Remedies,
    Recommendation,
    Disclaimer,
}

impl SectionKind {
    pub fn all() -> &'static [SectionKind] {
        &[
            Self::Analysis,
            Self::Conditions,
            Self::Dos,
            Self::Donts,
            Self::Remedies,
            Self::Recommendation,
            Self::Disclaimer,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Conditions => "conditions",
            Self::Dos => "dos",
            Self::Donts => "donts",
            Self::Remedies => "remedies",
            Self::Recommendation => "recommendation",
            Self::Disclaimer => "disclaimer",
        }
    }
}

/// How a section body becomes a result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Free text joined into a single paragraph.
    Paragraph,
    /// Ordered list of cleaned items.
    BulletList,
    /// `(name, probability)` pairs.
    PercentageList,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    pub kind: SectionKind,
    pub synonyms: &'static [&'static str],
    pub strategy: ExtractionStrategy,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionTable {
    pub language: Language,
    pub sections: &'static [SectionRule],
}

const ENGLISH_SECTIONS: &[SectionRule] = &[
    SectionRule {
        kind: SectionKind::Analysis,
        synonyms: &["analysis", "symptoms", "summary"],
        strategy: ExtractionStrategy::Paragraph,
    },
    SectionRule {
        kind: SectionKind::Conditions,
        synonyms: &["possible conditions", "conditions", "condition"],
        strategy: ExtractionStrategy::PercentageList,
    },
    SectionRule {
        kind: SectionKind::Dos,
        synonyms: &["do's", "dos", "things to do"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Donts,
        synonyms: &["don'ts", "donts", "dont's", "things to avoid"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Remedies,
        synonyms: &["natural remedies", "home remedies", "remedies"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Recommendation,
        synonyms: &[
            "professional recommendations",
            "recommendations",
            "recommendation",
        ],
        strategy: ExtractionStrategy::Paragraph,
    },
    SectionRule {
        kind: SectionKind::Disclaimer,
        synonyms: &["medical disclaimer", "disclaimer"],
        strategy: ExtractionStrategy::Paragraph,
    },
];

const TAMIL_SECTIONS: &[SectionRule] = &[
    SectionRule {
        kind: SectionKind::Analysis,
        synonyms: &["பகுப்பாய்வு", "அறிகுறிகள்"],
        strategy: ExtractionStrategy::Paragraph,
    },
    SectionRule {
        kind: SectionKind::Conditions,
        synonyms: &["சாத்தியமான நிலைமைகள்", "நிலைமைகள்", "நோய்கள்"],
        strategy: ExtractionStrategy::PercentageList,
    },
    SectionRule {
        kind: SectionKind::Dos,
        synonyms: &["செய்யவேண்டியவை", "செய்ய வேண்டியவை"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Donts,
        synonyms: &["செய்யக்கூடாதவை", "செய்யக் கூடாதவை"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Remedies,
        synonyms: &["இயற்கை தீர்வுகள்", "தீர்வுகள்"],
        strategy: ExtractionStrategy::BulletList,
    },
    SectionRule {
        kind: SectionKind::Recommendation,
        synonyms: &["தொழில்முறை பரிந்துரைகள்", "பரிந்துரைகள்", "பரிந்துரை"],
        strategy: ExtractionStrategy::Paragraph,
    },
    SectionRule {
        kind: SectionKind::Disclaimer,
        synonyms: &["மருத்துவ மறுப்பு", "மறுப்பு"],
        strategy: ExtractionStrategy::Paragraph,
    },
];

impl SectionTable {
    pub fn for_language(language: Language) -> Self {
        let sections = match language {
            Language::English => ENGLISH_SECTIONS,
            Language::Tamil => TAMIL_SECTIONS,
        };
        Self { language, sections }
    }

    pub fn rule(&self, kind: SectionKind) -> &'static SectionRule {
        // Every table lists every kind.
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .unwrap_or(&self.sections[0])
    }

    pub fn synonyms(&self, kind: SectionKind) -> &'static [&'static str] {
        self.rule(kind).synonyms
    }
}

/// Synonym list of every section in every language. Used to detect where
/// one section ends and the next begins.
pub fn all_synonym_groups() -> impl Iterator<Item = &'static [&'static str]> {
    ENGLISH_SECTIONS
        .iter()
        .chain(TAMIL_SECTIONS.iter())
        .map(|s| s.synonyms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_covers_every_kind() {
        for language in [Language::English, Language::Tamil] {
            let table = SectionTable::for_language(language);
            for kind in SectionKind::all() {
                assert_eq!(table.rule(*kind).kind, *kind, "{language} lacks {kind:?}");
                assert!(!table.synonyms(*kind).is_empty());
            }
        }
    }

    #[test]
    fn strategies_match_result_fields() {
        let table = SectionTable::for_language(Language::English);
        assert_eq!(
            table.rule(SectionKind::Conditions).strategy,
            ExtractionStrategy::PercentageList
        );
        assert_eq!(table.rule(SectionKind::Dos).strategy, ExtractionStrategy::BulletList);
        assert_eq!(
            table.rule(SectionKind::Recommendation).strategy,
            ExtractionStrategy::Paragraph
        );
    }

    #[test]
    fn synonyms_are_lowercase() {
        for synonym in all_synonym_groups().flatten() {
            assert_eq!(*synonym, synonym.to_lowercase());
        }
    }
}
