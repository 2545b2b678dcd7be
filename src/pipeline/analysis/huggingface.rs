use serde::{Deserialize, Serialize};

use super::prompt::AnalysisPrompt;
use super::types::CompletionProvider;
use super::ProviderError;

pub const DEFAULT_HUGGINGFACE_API_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

const MAX_NEW_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

/// Hugging Face Inference API client (text-generation task).
pub struct HuggingFaceProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HuggingFaceProvider {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::blocking::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            timeout_secs,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

/// Request body for POST /models/{model}
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

/// Response body: a list of generations, or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Generations(Vec<Generation>),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

fn build_request(prompt: &AnalysisPrompt) -> GenerateRequest<'_> {
    GenerateRequest {
        inputs: &prompt.instruction,
        parameters: GenerateParameters {
            max_new_tokens: MAX_NEW_TOKENS,
            temperature: TEMPERATURE,
            return_full_text: false,
        },
    }
}

/// Extract the generated text from a 2xx response body.
fn parse_generation(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

    match parsed {
        GenerateResponse::Error { error } => Err(ProviderError::Api(error)),
        GenerateResponse::Generations(generations) => {
            let text = generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .unwrap_or_default();
            if text.trim().is_empty() {
                Err(ProviderError::EmptyCompletion)
            } else {
                Ok(text)
            }
        }
    }
}

impl CompletionProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn complete(&self, prompt: &AnalysisPrompt) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("Hugging Face"))?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&build_request(prompt))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_generation(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn request_uses_instruction_prompt() {
        let prompt = AnalysisPrompt::build("headache", Language::English);
        let json = serde_json::to_value(build_request(&prompt)).unwrap();
        assert_eq!(json["inputs"], prompt.instruction.as_str());
        assert_eq!(json["parameters"]["max_new_tokens"], 1000);
        assert_eq!(json["parameters"]["return_full_text"], false);
        assert!((json["parameters"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn parses_generation_list() {
        let body = r#"[{"generated_text": "Do's:\n- Rest"}]"#;
        assert_eq!(parse_generation(body).unwrap(), "Do's:\n- Rest");
    }

    #[test]
    fn error_payload_is_api_error() {
        let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;
        assert_eq!(
            parse_generation(body),
            Err(ProviderError::Api("Model is currently loading".into()))
        );
    }

    #[test]
    fn empty_generation_is_rejected() {
        assert_eq!(parse_generation("[]"), Err(ProviderError::EmptyCompletion));
        assert_eq!(
            parse_generation(r#"[{"generated_text": "   "}]"#),
            Err(ProviderError::EmptyCompletion)
        );
    }

    #[test]
    fn malformed_body_is_parsing_error() {
        assert!(matches!(
            parse_generation("<html>Bad gateway</html>"),
            Err(ProviderError::ResponseParsing(_))
        ));
    }

    #[test]
    fn missing_key_fails_fast() {
        let provider = HuggingFaceProvider::new(DEFAULT_HUGGINGFACE_API_URL, DEFAULT_HUGGINGFACE_MODEL, None, 5);
        let prompt = AnalysisPrompt::build("cough", Language::English);
        assert_eq!(
            provider.complete(&prompt),
            Err(ProviderError::NotConfigured("Hugging Face"))
        );

        let blank = HuggingFaceProvider::new(DEFAULT_HUGGINGFACE_API_URL, DEFAULT_HUGGINGFACE_MODEL, Some("  ".into()), 5);
        assert!(blank.api_key.is_none());
    }

    #[test]
    fn endpoint_includes_model_and_trims_slash() {
        let provider = HuggingFaceProvider::new("http://localhost:9000/", "org/model", Some("k".into()), 5);
        assert_eq!(provider.endpoint(), "http://localhost:9000/models/org/model");
    }
}
