//! Shared state and wire types for the HTTP API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::db::AnalysisStore;
use crate::models::{HealthAnalysisResult, InputKind, Language};
use crate::pipeline::analysis::AnalysisPipeline;
use crate::session::SessionRegistry;

/// Builds a fresh pipeline for one request. Pipelines own blocking HTTP
/// clients, so they are created inside the blocking task that uses them.
pub type PipelineFactory = Arc<dyn Fn() -> AnalysisPipeline + Send + Sync>;

/// Which external services the running instance can reach.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub huggingface: bool,
    pub mistral: bool,
    pub translation: bool,
}

/// Shared state for API handlers.
///
/// Injected both as `State` (for handlers) and as `Extension` (for
/// middleware that runs before routing).
#[derive(Clone)]
pub struct ApiContext {
    pub sessions: Arc<SessionRegistry>,
    pub store: Arc<dyn AnalysisStore + Send + Sync>,
    pub pipeline_factory: PipelineFactory,
    pub providers: ProviderStatus,
}

impl ApiContext {
    pub fn new(config: &ServiceConfig, store: Arc<dyn AnalysisStore + Send + Sync>) -> Self {
        let providers = ProviderStatus {
            huggingface: config.huggingface.is_configured(),
            mistral: config.mistral.is_configured(),
            translation: config.translation_enabled,
        };
        let config = config.clone();
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            store,
            pipeline_factory: Arc::new(move || AnalysisPipeline::from_config(&config)),
            providers,
        }
    }

    pub fn with_pipeline_factory(
        store: Arc<dyn AnalysisStore + Send + Sync>,
        pipeline_factory: PipelineFactory,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            store,
            pipeline_factory,
            providers: ProviderStatus::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub symptoms: String,
    #[serde(default)]
    pub input_type: InputKind,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub image_content_type: Option<String>,
    #[serde(default)]
    pub image_size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: HealthAnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_warning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PossibleCondition;

    #[test]
    fn analyze_request_defaults() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"symptoms":"cough"}"#).unwrap();
        assert_eq!(req.input_type, InputKind::Text);
        assert_eq!(req.language, Language::English);
        assert!(req.image_ref.is_none());
    }

    #[test]
    fn analyze_request_camel_case() {
        let req: AnalyzeRequest = serde_json::from_str(
            r#"{"symptoms":"rash","inputType":"image","language":"tamil","imageRef":"img-1","imageContentType":"image/png","imageSizeBytes":2048}"#,
        )
        .unwrap();
        assert_eq!(req.input_type, InputKind::Image);
        assert_eq!(req.language, Language::Tamil);
        assert_eq!(req.image_ref.as_deref(), Some("img-1"));
        assert_eq!(req.image_size_bytes, Some(2048));
    }

    #[test]
    fn analyze_response_flattens_result() {
        let response = AnalyzeResponse {
            result: HealthAnalysisResult {
                analysis: "a".into(),
                possible_conditions: vec![PossibleCondition::new("Cold", 70)],
                dos: vec![],
                donts: vec![],
                natural_remedies: vec![],
                recommendation: "r".into(),
                image_analysis: None,
                language: Language::English,
            },
            translation_warning: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["possibleConditions"][0]["name"], "Cold");
        assert_eq!(json["naturalRemedies"], serde_json::json!([]));
        assert!(json.get("translationWarning").is_none());
    }
}
