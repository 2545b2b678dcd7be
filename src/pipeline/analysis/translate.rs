//! Translation collaborator for localizing an English result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use super::TranslationError;
use crate::models::{HealthAnalysisResult, Language};

pub const DEFAULT_MYMEMORY_API_URL: &str = "https://api.mymemory.translated.net";

/// MyMemory rejects queries above 500 bytes.
const MAX_QUERY_BYTES: usize = 450;

pub const TRANSLATION_WARNING: &str =
    "Some content could not be translated and is shown in English.";

/// Text translation service (allows mocking).
pub trait Translator {
    fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError>;
}

/// MyMemory public translation API client.
pub struct MyMemoryTranslator {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl MyMemoryTranslator {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::blocking::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn translate_chunk(
        &self,
        chunk: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/get", self.base_url);
        let langpair = format!("{}|{}", source.code(), target.code());

        let response = self
            .client
            .get(&url)
            .query(&[("q", chunk), ("langpair", langpair.as_str())])
            .send()
            .map_err(|e| TranslationError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| TranslationError::ResponseParsing(e.to_string()))?;
        parse_mymemory_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: MyMemoryData,
    #[serde(default)]
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: String,
}

/// `responseStatus` is a number on success and sometimes a string on error.
fn status_code(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_mymemory_response(body: &str) -> Result<String, TranslationError> {
    let parsed: MyMemoryResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::ResponseParsing(e.to_string()))?;

    match status_code(&parsed.response_status) {
        Some(200) | None => {}
        Some(_) => {
            let detail = parsed
                .response_details
                .unwrap_or(parsed.response_data.translated_text);
            return Err(TranslationError::Rejected(detail));
        }
    }

    let text = parsed.response_data.translated_text;
    if text.trim().is_empty() {
        return Err(TranslationError::ResponseParsing(
            "empty translation".into(),
        ));
    }
    Ok(text)
}

/// Split text into pieces that fit one query, preferring sentence ends and
/// then word boundaries. Never splits inside a UTF-8 character.
fn split_for_query(text: &str, max_bytes: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while rest.len() > max_bytes {
        let mut limit = max_bytes;
        while !rest.is_char_boundary(limit) {
            limit -= 1;
        }
        let window = &rest[..limit];
        let cut = window
            .rfind(". ")
            .map(|idx| idx + 1)
            .or_else(|| window.rfind(' '))
            .filter(|&idx| idx > 0)
            .unwrap_or(limit);
        chunks.push(rest[..cut].trim());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

impl Translator for MyMemoryTranslator {
    fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        if source == target || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let translated = split_for_query(text, MAX_QUERY_BYTES)
            .into_iter()
            .map(|chunk| self.translate_chunk(chunk, source, target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(translated.join(" "))
    }
}

/// Mock translator for testing. Prefixes text with the target language
/// code, or fails for texts containing a configured marker.
pub struct MockTranslator {
    fail_containing: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            fail_containing: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_containing: Some(marker.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for MockTranslator {
    fn translate(
        &self,
        text: &str,
        _source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_containing {
            Some(marker) if text.contains(marker.as_str()) => {
                Err(TranslationError::Rejected(format!("mock refused {marker}")))
            }
            _ => Ok(format!("[{}] {text}", target.code())),
        }
    }
}

/// Translate a parsed result field by field into `target`.
///
/// Empty fields are left as they are. A field whose translation fails keeps
/// its source text. Returns the
/// localized result and, if anything failed, a single user-facing warning.
pub fn localize_result(
    result: HealthAnalysisResult,
    translator: &dyn Translator,
    source: Language,
    target: Language,
) -> (HealthAnalysisResult, Option<String>) {
    let mut failures = 0usize;
    let mut translate = |text: String| -> String {
        if text.trim().is_empty() {
            return text;
        }
        match translator.translate(&text, source, target) {
            Ok(translated) => translated,
            Err(e) => {
                failures += 1;
                tracing::debug!(error = %e, "Field translation failed, keeping source text");
                text
            }
        }
    };

    let localized = HealthAnalysisResult {
        analysis: translate(result.analysis),
        possible_conditions: result
            .possible_conditions
            .into_iter()
            .map(|mut condition| {
                condition.name = translate(condition.name);
                condition
            })
            .collect(),
        dos: result.dos.into_iter().map(&mut translate).collect(),
        donts: result.donts.into_iter().map(&mut translate).collect(),
        natural_remedies: result
            .natural_remedies
            .into_iter()
            .map(&mut translate)
            .collect(),
        recommendation: translate(result.recommendation),
        image_analysis: result.image_analysis,
        language: target,
    };

    let warning = if failures > 0 {
        tracing::warn!(
            failures,
            source = %source,
            target = %target,
            "Translation incomplete, some fields left untranslated"
        );
        Some(TRANSLATION_WARNING.to_string())
    } else {
        None
    };

    (localized, warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PossibleCondition;

    fn english_result() -> HealthAnalysisResult {
        HealthAnalysisResult {
            analysis: "You may have a cold.".into(),
            possible_conditions: vec![PossibleCondition::new("Common cold", 70)],
            dos: vec!["Rest".into(), "Drink water".into()],
            donts: vec!["Smoke".into()],
            natural_remedies: vec!["Ginger tea".into()],
            recommendation: "See a GP.".into(),
            image_analysis: Some("blob:abc".into()),
            language: Language::English,
        }
    }

    #[test]
    fn localizes_every_field() {
        let translator = MockTranslator::new();
        let (result, warning) =
            localize_result(english_result(), &translator, Language::English, Language::Tamil);
        assert_eq!(warning, None);
        assert_eq!(result.analysis, "[ta] You may have a cold.");
        assert_eq!(result.possible_conditions[0].name, "[ta] Common cold");
        assert_eq!(result.possible_conditions[0].probability, 70);
        assert_eq!(result.dos, vec!["[ta] Rest", "[ta] Drink water"]);
        assert_eq!(result.recommendation, "[ta] See a GP.");
        assert_eq!(result.image_analysis.as_deref(), Some("blob:abc"));
        assert_eq!(result.language, Language::Tamil);
        assert_eq!(translator.call_counter().load(Ordering::SeqCst), 7);
    }

    #[test]
    fn failed_fields_keep_source_text_with_one_warning() {
        let translator = MockTranslator::failing_on("Drink");
        let (result, warning) =
            localize_result(english_result(), &translator, Language::English, Language::Tamil);
        assert_eq!(result.dos, vec!["[ta] Rest", "Drink water"]);
        assert_eq!(result.donts, vec!["[ta] Smoke"]);
        assert_eq!(warning.as_deref(), Some(TRANSLATION_WARNING));
    }

    #[test]
    fn parses_mymemory_success() {
        let body = r#"{"responseData":{"translatedText":"ஓய்வு","match":0.9},"responseStatus":200,"responseDetails":""}"#;
        assert_eq!(parse_mymemory_response(body).unwrap(), "ஓய்வு");
    }

    #[test]
    fn mymemory_error_status_is_rejected() {
        let body = r#"{"responseData":{"translatedText":"QUERY LENGTH LIMIT EXCEEDED"},"responseStatus":"403","responseDetails":"QUERY LENGTH LIMIT EXCEEDED. MAX ALLOWED QUERY : 500 CHARS"}"#;
        assert!(matches!(
            parse_mymemory_response(body),
            Err(TranslationError::Rejected(detail)) if detail.starts_with("QUERY LENGTH")
        ));
    }

    #[test]
    fn mymemory_garbage_is_parse_error() {
        assert!(matches!(
            parse_mymemory_response("not json"),
            Err(TranslationError::ResponseParsing(_))
        ));
    }

    #[test]
    fn long_text_splits_on_sentences() {
        let sentence = "Rest and drink plenty of fluids every day. ";
        let text = sentence.repeat(20);
        let chunks = split_for_query(&text, 100);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 100 && c.ends_with('.')));
        assert_eq!(chunks.join(" "), text.trim());
    }

    #[test]
    fn split_respects_char_boundaries() {
        let text = "ஓய்வெடுக்கவும்".repeat(40);
        let chunks = split_for_query(&text, 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn same_language_is_identity() {
        let translator = MyMemoryTranslator::new(DEFAULT_MYMEMORY_API_URL, 5);
        assert_eq!(
            translator
                .translate("Rest", Language::English, Language::English)
                .unwrap(),
            "Rest"
        );
    }
}
