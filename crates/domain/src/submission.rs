use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formcraft_core::{AppError, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::element::ElementId;
use crate::form::{Form, FormId};

/// Submission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Creates a random submission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a submission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SubmissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Review state of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Freshly received.
    #[default]
    Submitted,
    /// Looked at by the form owner.
    Reviewed,
    /// Filed away.
    Archived,
}

impl SubmissionStatus {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "reviewed" => Ok(Self::Reviewed),
            "archived" => Ok(Self::Archived),
            _ => Err(AppError::Validation(format!(
                "unknown submission status '{value}'"
            ))),
        }
    }
}

/// One answer of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// Owning submission.
    pub submission_id: SubmissionId,
    /// Answered element.
    pub element_id: ElementId,
    /// Answer value, `null` when left blank.
    pub value: Value,
}

/// A completed public form, created once with all of its responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    form_id: FormId,
    submitted_by: Option<UserId>,
    submitted_at: DateTime<Utc>,
    status: SubmissionStatus,
    responses: Vec<SubmissionResponse>,
}

impl Submission {
    /// Builds a submission of `form` with one response per element.
    ///
    /// Elements without a value are answered with `null`; values keyed by
    /// anything other than an element id are dropped.
    pub fn collect(
        form: &Form,
        form_id: FormId,
        values: &HashMap<String, Value>,
        submitted_by: Option<UserId>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let id = SubmissionId::new();
        let responses = form
            .elements()
            .iter()
            .map(|element| SubmissionResponse {
                submission_id: id,
                element_id: element.id().clone(),
                value: values
                    .get(element.id().as_str())
                    .cloned()
                    .unwrap_or(Value::Null),
            })
            .collect();

        Self {
            id,
            form_id,
            submitted_by,
            submitted_at,
            status: SubmissionStatus::Submitted,
            responses,
        }
    }

    /// Rebuilds a stored submission.
    #[must_use]
    pub fn from_parts(
        id: SubmissionId,
        form_id: FormId,
        submitted_by: Option<UserId>,
        submitted_at: DateTime<Utc>,
        status: SubmissionStatus,
        responses: Vec<SubmissionResponse>,
    ) -> Self {
        Self {
            id,
            form_id,
            submitted_by,
            submitted_at,
            status,
            responses,
        }
    }

    /// Returns submission identifier.
    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Returns the answered form.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns the signed-in submitter, if any.
    #[must_use]
    pub fn submitted_by(&self) -> Option<UserId> {
        self.submitted_by
    }

    /// Returns submission time.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns review state.
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Returns responses in element order.
    #[must_use]
    pub fn responses(&self) -> &[SubmissionResponse] {
        &self.responses
    }
}
