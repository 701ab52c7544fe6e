use std::collections::HashMap;

use formcraft_domain::{Submission, SubmissionResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Public submission payload keyed by element id.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/submit-form-request.ts"
)]
pub struct SubmitFormRequest {
    #[ts(type = "Record<string, unknown>")]
    #[serde(default)]
    pub values: HashMap<String, Value>,
}

/// One stored answer.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/submission-answer-response.ts"
)]
pub struct SubmissionAnswerResponse {
    pub element_id: String,
    #[ts(type = "unknown")]
    pub value: Value,
}

impl From<&SubmissionResponse> for SubmissionAnswerResponse {
    fn from(value: &SubmissionResponse) -> Self {
        Self {
            element_id: value.element_id.to_string(),
            value: value.value.clone(),
        }
    }
}

/// API representation of a stored submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/submission-record-response.ts"
)]
pub struct SubmissionRecordResponse {
    pub id: String,
    pub form_id: String,
    pub submitted_by: Option<String>,
    pub submitted_at: String,
    pub status: String,
    pub responses: Vec<SubmissionAnswerResponse>,
}

impl From<&Submission> for SubmissionRecordResponse {
    fn from(value: &Submission) -> Self {
        Self {
            id: value.id().to_string(),
            form_id: value.form_id().to_string(),
            submitted_by: value.submitted_by().map(|user_id| user_id.to_string()),
            submitted_at: value.submitted_at().to_rfc3339(),
            status: value.status().as_str().to_owned(),
            responses: value
                .responses()
                .iter()
                .map(SubmissionAnswerResponse::from)
                .collect(),
        }
    }
}
