//! `POST /api/analyze`: run one symptom analysis.
//!
//! Input is validated and sanitized here, before the pipeline is built.
//! The pipeline itself runs on the blocking pool; if the client goes away
//! the cancel flag stops it before its next provider call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::middleware::auth::bearer_token;
use crate::api::types::{AnalyzeRequest, AnalyzeResponse, ApiContext};
use crate::pipeline::analysis::AnalysisError;
use crate::pipeline::safety::{require_image_reference, sanitize_symptoms, validate_image_upload};
use crate::session::Session;

/// Raises the cancel flag when the request future is dropped.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    require_image_reference(req.input_type, req.image_ref.as_deref())?;
    if let Some(content_type) = req.image_content_type.as_deref() {
        validate_image_upload(content_type, req.image_size_bytes.unwrap_or(0))?;
    }
    let sanitized = sanitize_symptoms(&req.symptoms)?;

    // Anonymous requests are analyzed but not saved.
    let session = bearer_token(&headers)
        .map(|token| ctx.sessions.resolve(token))
        .unwrap_or_else(Session::anonymous);

    let cancel = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(cancel.clone());

    let factory = ctx.pipeline_factory.clone();
    let store = ctx.store.clone();
    let AnalyzeRequest {
        input_type,
        language,
        image_ref,
        ..
    } = req;

    let outcome = tokio::task::spawn_blocking(move || {
        let pipeline = factory().with_cancel_flag(cancel);
        let outcome =
            pipeline.analyze_detailed(&sanitized.text, input_type, language, image_ref.as_deref())?;

        if let Some(user_id) = session.user_id() {
            if let Err(e) = store.save(
                user_id,
                input_type,
                &outcome.result.analysis,
                &outcome.result.recommendation,
            ) {
                tracing::warn!(user_id, error = %e, "Failed to save analysis");
            }
        }
        Ok::<_, AnalysisError>(outcome)
    })
    .await??;

    Ok(Json(AnalyzeResponse {
        result: outcome.result,
        translation_warning: outcome.translation_warning,
    }))
}
