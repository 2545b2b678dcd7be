use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::InputKind;

/// A persisted analysis, as listed in a user's health history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysisRecord {
    pub id: Uuid,
    pub user_id: String,
    pub input_kind: InputKind,
    pub analysis: String,
    pub recommendation: String,
    /// RFC 3339 timestamp (UTC).
    pub created_at: String,
}
