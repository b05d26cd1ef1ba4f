use serde::{Deserialize, Serialize};

use crate::model::feedback::FeedbackItem;
use crate::model::generated::FileFormat;

/// Payload accepted by the JSON recipient importer: a top-level array of
/// these rows. `organization` and `company` are synonyms.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRecipientRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub position: String,
}

/// Request body for `POST /api/templates/generate`.
#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateTemplateRequest {
    pub design_id: String,
}

/// Request body for `POST /api/revision/start`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StartRevisionRequest {
    /// Optionally run against an explicit feedback list instead of the
    /// project's stored one (used by retries that re-send the snapshot).
    #[serde(default)]
    pub feedback: Option<Vec<FeedbackItem>>,
}

/// Request body for `POST /api/generation/start`.
#[derive(Debug, Deserialize, Serialize)]
pub struct StartGenerationRequest {
    pub format: FileFormat,
}
