//! `GET /api/analyses`: the signed-in user's saved analyses.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::HealthAnalysisRecord;
use crate::session::UserIdentity;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserIdentity>,
) -> Result<Json<Vec<HealthAnalysisRecord>>, ApiError> {
    let store = ctx.store.clone();
    let records = tokio::task::spawn_blocking(move || store.list_for_user(&user.id)).await??;
    Ok(Json(records))
}
