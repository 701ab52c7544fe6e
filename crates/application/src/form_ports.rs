use async_trait::async_trait;
use chrono::{DateTime, Utc};

use formcraft_core::{AppResult, UserId};
use formcraft_domain::{Form, FormId, FormStatus, Submission};

/// Dashboard row for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSummary {
    /// Form identifier.
    pub id: FormId,
    /// Form title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Publication status.
    pub status: FormStatus,
    /// Version counter.
    pub version: i32,
    /// Number of elements.
    pub element_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// First publication time.
    pub published_at: Option<DateTime<Utc>>,
}

/// Persistence gateway for form aggregates.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Upserts the form row, then replaces its element rows.
    ///
    /// Inserts when the form has no id yet. Any failure of either step is
    /// reported as one `AppError::Persistence`; callers must not assume a
    /// partial write succeeded.
    async fn save_form(&self, form: &Form) -> AppResult<FormId>;

    /// Returns one form with its elements.
    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>>;

    /// Returns one form with its elements only when it is published.
    async fn find_published_form(&self, form_id: FormId) -> AppResult<Option<Form>>;

    /// Lists forms owned by `owner`, most recently updated first.
    async fn list_forms_by_owner(&self, owner: UserId) -> AppResult<Vec<FormSummary>>;

    /// Deletes one owned form with its elements, submissions and responses.
    async fn delete_form(&self, owner: UserId, form_id: FormId) -> AppResult<()>;
}

/// Persistence port for public submissions.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stores a submission and all of its responses as one operation.
    async fn create_submission(&self, submission: &Submission) -> AppResult<()>;

    /// Lists submissions of a form, newest first.
    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>>;
}
