use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::huggingface::HuggingFaceProvider;
use super::language_detect::detect_language;
use super::mistral::MistralProvider;
use super::fallback::fill_with_fallback;
use super::parser::{parse_health_analysis, parse_sections, ParsedSections};
use super::prompt::AnalysisPrompt;
use super::translate::{localize_result, MyMemoryTranslator, Translator, TRANSLATION_WARNING};
use super::types::CompletionProvider;
use super::AnalysisError;
use crate::config::ServiceConfig;
use crate::models::{HealthAnalysisResult, InputKind, Language};

/// Parsed result plus anything the caller should surface alongside it.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: HealthAnalysisResult,
    /// Set when part of the result could not be localized.
    pub translation_warning: Option<String>,
    /// Name of the provider that produced the completion.
    pub provider: &'static str,
}

/// Runs one analysis request end to end:
/// prompt → primary provider (→ fallback provider) → parse → localize
pub struct AnalysisPipeline {
    primary: Box<dyn CompletionProvider + Send + Sync>,
    fallback: Box<dyn CompletionProvider + Send + Sync>,
    translator: Option<Box<dyn Translator + Send + Sync>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl AnalysisPipeline {
    pub fn new(
        primary: Box<dyn CompletionProvider + Send + Sync>,
        fallback: Box<dyn CompletionProvider + Send + Sync>,
    ) -> Self {
        Self {
            primary,
            fallback,
            translator: None,
            cancel: None,
        }
    }

    /// Hugging Face primary, Mistral fallback, MyMemory translation when
    /// enabled.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let timeout = config.provider_timeout_secs;
        let primary = HuggingFaceProvider::new(
            &config.huggingface.api_url,
            &config.huggingface.model,
            config.huggingface.api_key.clone(),
            timeout,
        );
        let fallback = MistralProvider::new(
            &config.mistral.api_url,
            &config.mistral.model,
            config.mistral.api_key.clone(),
            timeout,
        );

        let pipeline = Self::new(Box::new(primary), Box::new(fallback));
        if config.translation_enabled {
            pipeline.with_translator(Box::new(MyMemoryTranslator::new(
                &config.mymemory_api_url,
                timeout,
            )))
        } else {
            pipeline
        }
    }

    pub fn with_translator(mut self, translator: Box<dyn Translator + Send + Sync>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Abort before the next provider call once `flag` is raised.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn check_cancelled(&self) -> Result<(), AnalysisError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(AnalysisError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Call the primary provider; on failure, call the fallback exactly once.
    fn complete_with_fallback(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<(String, &'static str), AnalysisError> {
        self.check_cancelled()?;
        let primary_error = match self.primary.complete(prompt) {
            Ok(text) => return Ok((text, self.primary.name())),
            Err(e) => e,
        };

        tracing::warn!(
            provider = self.primary.name(),
            fallback = self.fallback.name(),
            error = %primary_error,
            "Primary provider failed, trying fallback"
        );

        self.check_cancelled()?;
        match self.fallback.complete(prompt) {
            Ok(text) => Ok((text, self.fallback.name())),
            Err(fallback_error) => {
                tracing::error!(
                    primary_error = %primary_error,
                    fallback_error = %fallback_error,
                    "All completion providers failed"
                );
                Err(AnalysisError::ProvidersExhausted {
                    primary: primary_error,
                    fallback: fallback_error,
                })
            }
        }
    }

    pub fn analyze(
        &self,
        symptoms: &str,
        input_kind: InputKind,
        language: Language,
        image_ref: Option<&str>,
    ) -> Result<HealthAnalysisResult, AnalysisError> {
        self.analyze_detailed(symptoms, input_kind, language, image_ref)
            .map(|outcome| outcome.result)
    }

    /// Like [`analyze`](Self::analyze), also reporting translation warnings
    /// and which provider answered.
    pub fn analyze_detailed(
        &self,
        symptoms: &str,
        input_kind: InputKind,
        language: Language,
        image_ref: Option<&str>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let _span = tracing::info_span!(
            "analyze",
            language = %language,
            input_kind = %input_kind,
            symptom_len = symptoms.len()
        )
        .entered();

        let prompt = AnalysisPrompt::build(symptoms, language);
        let (completion, provider) = self.complete_with_fallback(&prompt)?;

        let image_description = match input_kind {
            InputKind::Image => image_ref,
            InputKind::Text | InputKind::Voice => None,
        };
        let answered_in_english = language != Language::English
            && detect_language(&completion) == Some(Language::English);

        let (result, translation_warning) = if answered_in_english {
            tracing::info!(provider, "Completion came back in English, localizing");
            let ParsedSections { result, missing } =
                parse_sections(&completion, Language::English, image_description);
            let (mut localized, warning) = self.localize(result, language);
            // Missing sections take the fallback of the requested language.
            fill_with_fallback(&mut localized, &missing, language);
            (localized, warning)
        } else {
            (
                parse_health_analysis(&completion, language, image_description),
                None,
            )
        };

        tracing::info!(
            provider,
            conditions = result.possible_conditions.len(),
            translated = answered_in_english,
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            result,
            translation_warning,
            provider,
        })
    }

    fn localize(
        &self,
        parsed: HealthAnalysisResult,
        target: Language,
    ) -> (HealthAnalysisResult, Option<String>) {
        match &self.translator {
            Some(translator) => {
                localize_result(parsed, translator.as_ref(), Language::English, target)
            }
            None => {
                tracing::warn!("No translator configured, returning English content");
                let mut result = parsed;
                result.language = target;
                (result, Some(TRANSLATION_WARNING.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::pipeline::analysis::fallback::{fallback_conditions, FallbackContent};
    use crate::pipeline::analysis::translate::MockTranslator;
    use crate::pipeline::analysis::types::MockCompletionProvider;
    use crate::pipeline::analysis::ProviderError;

    const ENGLISH_COMPLETION: &str = "\
Brief Analysis: The symptoms point to a common viral infection of the throat.

Possible Conditions:
- Common cold (70%)
- Pharyngitis (30%)

Do's:
- Rest
- Drink warm fluids

Don'ts:
- Smoke

Natural Remedies:
- Honey with warm water

Professional Recommendations: See a doctor if the fever persists beyond three days.";

    const TAMIL_COMPLETION: &str = "\
பகுப்பாய்வு: உங்கள் அறிகுறிகள் சாதாரண சளியைக் குறிக்கின்றன.

சாத்தியமான நிலைமைகள்:
- சளி (70%)

செய்யவேண்டியவை:
- ஓய்வெடுக்கவும்

பரிந்துரைகள்: மருத்துவரை அணுகவும்.";

    const PARTIAL_ENGLISH_COMPLETION: &str = "\
Brief Analysis: The symptoms point to a common viral infection of the throat.

Do's:
- Rest";

    fn pipeline(
        primary: MockCompletionProvider,
        fallback: MockCompletionProvider,
    ) -> (AnalysisPipeline, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let primary_calls = primary.call_counter();
        let fallback_calls = fallback.call_counter();
        (
            AnalysisPipeline::new(Box::new(primary), Box::new(fallback)),
            primary_calls,
            fallback_calls,
        )
    }

    fn down(name: &'static str) -> MockCompletionProvider {
        MockCompletionProvider::failing(name, ProviderError::Connection("unreachable".into()))
    }

    #[test]
    fn primary_success_skips_fallback() {
        let (pipeline, primary_calls, fallback_calls) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            MockCompletionProvider::succeeding("fallback", ""),
        );
        let outcome = pipeline
            .analyze_detailed("sore throat", InputKind::Text, Language::English, None)
            .unwrap();
        assert_eq!(outcome.provider, "primary");
        assert_eq!(outcome.result.dos, vec!["Rest", "Drink warm fluids"]);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn primary_failure_calls_fallback_exactly_once() {
        let (pipeline, primary_calls, fallback_calls) = pipeline(
            down("primary"),
            MockCompletionProvider::succeeding("fallback", ENGLISH_COMPLETION),
        );
        let outcome = pipeline
            .analyze_detailed("sore throat", InputKind::Text, Language::English, None)
            .unwrap();
        assert_eq!(outcome.provider, "fallback");
        assert_eq!(outcome.result.possible_conditions.len(), 2);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn both_failing_is_single_terminal_error() {
        let (pipeline, primary_calls, fallback_calls) = pipeline(
            down("primary"),
            MockCompletionProvider::failing("fallback", ProviderError::Timeout(60)),
        );
        let err = pipeline
            .analyze("sore throat", InputKind::Text, Language::English, None)
            .unwrap_err();
        match err {
            AnalysisError::ProvidersExhausted { primary, fallback } => {
                assert!(matches!(primary, ProviderError::Connection(_)));
                assert_eq!(fallback, ProviderError::Timeout(60));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_before_any_call() {
        let flag = Arc::new(AtomicBool::new(true));
        let (pipeline, primary_calls, fallback_calls) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            MockCompletionProvider::succeeding("fallback", ENGLISH_COMPLETION),
        );
        let pipeline = pipeline.with_cancel_flag(flag);
        let err = pipeline
            .analyze("cough", InputKind::Text, Language::English, None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unparseable_completion_still_complete() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", "I cannot help with that."),
            down("fallback"),
        );
        let result = pipeline
            .analyze("cough", InputKind::Voice, Language::English, None)
            .unwrap();
        let english = FallbackContent::for_language(Language::English);
        assert_eq!(result.dos, vec![english.dos]);
        assert_eq!(result.recommendation, english.recommendation);
    }

    #[test]
    fn image_reference_attached_only_for_image_input() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            down("fallback"),
        );
        let image = pipeline
            .analyze("red rash", InputKind::Image, Language::English, Some("blob:rash"))
            .unwrap();
        assert_eq!(image.image_analysis.as_deref(), Some("blob:rash"));

        let image_without_ref = pipeline
            .analyze("red rash", InputKind::Image, Language::English, None)
            .unwrap();
        assert_eq!(image_without_ref.image_analysis, None);

        let text = pipeline
            .analyze("red rash", InputKind::Text, Language::English, Some("blob:rash"))
            .unwrap();
        assert_eq!(text.image_analysis, None);
    }

    #[test]
    fn tamil_completion_parsed_with_tamil_table() {
        let translator = MockTranslator::new();
        let translations = translator.call_counter();
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", TAMIL_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .with_translator(Box::new(translator))
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        assert_eq!(outcome.result.dos, vec!["ஓய்வெடுக்கவும்"]);
        assert_eq!(outcome.result.language, Language::Tamil);
        assert_eq!(outcome.translation_warning, None);
        assert_eq!(translations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn english_completion_for_tamil_request_is_localized() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .with_translator(Box::new(MockTranslator::new()))
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        assert_eq!(outcome.result.language, Language::Tamil);
        assert_eq!(outcome.result.dos, vec!["[ta] Rest", "[ta] Drink warm fluids"]);
        assert_eq!(outcome.translation_warning, None);
    }

    #[test]
    fn translation_failure_keeps_english_with_warning() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .with_translator(Box::new(MockTranslator::failing_on("Rest")))
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        assert_eq!(outcome.result.dos[0], "Rest");
        assert_eq!(outcome.result.dos[1], "[ta] Drink warm fluids");
        assert_eq!(outcome.translation_warning.as_deref(), Some(TRANSLATION_WARNING));
    }

    #[test]
    fn missing_translator_is_reported() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        assert_eq!(outcome.result.language, Language::Tamil);
        assert_eq!(outcome.result.dos, vec!["Rest", "Drink warm fluids"]);
        assert!(outcome.translation_warning.is_some());
    }

    #[test]
    fn tamil_request_gets_tamil_fallback_without_translator() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", PARTIAL_ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        let tamil = FallbackContent::for_language(Language::Tamil);
        assert_eq!(outcome.result.dos, vec!["Rest"]);
        assert_eq!(outcome.result.donts, vec![tamil.donts]);
        assert_eq!(outcome.result.natural_remedies, vec![tamil.remedies]);
        assert_eq!(outcome.result.recommendation, tamil.recommendation);
        assert_eq!(
            outcome.result.possible_conditions,
            fallback_conditions(Language::Tamil)
        );
        assert_eq!(outcome.translation_warning.as_deref(), Some(TRANSLATION_WARNING));
    }

    #[test]
    fn tamil_fallback_survives_failing_translator() {
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", PARTIAL_ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .with_translator(Box::new(MockTranslator::failing_on("Rest")))
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        let tamil = FallbackContent::for_language(Language::Tamil);
        assert_eq!(outcome.result.dos, vec!["Rest"]);
        assert_eq!(
            outcome.result.analysis,
            "[ta] The symptoms point to a common viral infection of the throat."
        );
        assert_eq!(outcome.result.donts, vec![tamil.donts]);
        assert_eq!(outcome.result.recommendation, tamil.recommendation);
        assert_eq!(
            outcome.result.possible_conditions,
            fallback_conditions(Language::Tamil)
        );
        assert_eq!(outcome.translation_warning.as_deref(), Some(TRANSLATION_WARNING));
    }

    #[test]
    fn tamil_fallback_fields_skip_translation() {
        let translator = MockTranslator::new();
        let translations = translator.call_counter();
        let (pipeline, _, _) = pipeline(
            MockCompletionProvider::succeeding("primary", PARTIAL_ENGLISH_COMPLETION),
            down("fallback"),
        );
        let outcome = pipeline
            .with_translator(Box::new(translator))
            .analyze_detailed("தொண்டை வலி", InputKind::Text, Language::Tamil, None)
            .unwrap();
        let tamil = FallbackContent::for_language(Language::Tamil);
        assert_eq!(outcome.result.dos, vec!["[ta] Rest"]);
        assert_eq!(outcome.result.natural_remedies, vec![tamil.remedies]);
        assert_eq!(outcome.translation_warning, None);
        assert_eq!(translations.load(Ordering::SeqCst), 2);
    }
}
