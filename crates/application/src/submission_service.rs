//! Public rendering of published forms and submission intake.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use formcraft_core::{AppError, AppResult, UserId, UserIdentity};
use formcraft_domain::{Form, FormId, Submission};

use crate::form_ports::{FormRepository, SubmissionRepository};

const FORM_NOT_FOUND: &str = "form not found";

/// Loads published forms and records their submissions.
#[derive(Clone)]
pub struct SubmissionService {
    forms: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl SubmissionService {
    /// Creates a new submission service.
    #[must_use]
    pub fn new(forms: Arc<dyn FormRepository>, submissions: Arc<dyn SubmissionRepository>) -> Self {
        Self { forms, submissions }
    }

    /// Returns a published form with elements in position order.
    ///
    /// Missing and unpublished forms produce the same `NotFound`.
    pub async fn load_published_form(&self, form_id: FormId) -> AppResult<Form> {
        self.forms
            .find_published_form(form_id)
            .await?
            .filter(Form::is_published)
            .ok_or_else(|| AppError::NotFound(FORM_NOT_FOUND.to_owned()))
    }

    /// Records one submission of a published form.
    ///
    /// Every element gets a response, `null` when `values` has no entry for
    /// it. Keys that are not element ids are ignored.
    pub async fn submit(
        &self,
        form_id: FormId,
        values: HashMap<String, Value>,
        submitted_by: Option<UserId>,
    ) -> AppResult<Submission> {
        let form = self.load_published_form(form_id).await?;
        let submission = Submission::collect(&form, form_id, &values, submitted_by, Utc::now());

        self.submissions.create_submission(&submission).await?;
        info!(
            form_id = %form_id,
            submission_id = %submission.id(),
            responses = submission.responses().len(),
            "submission recorded"
        );

        Ok(submission)
    }

    /// Lists submissions of a form owned by the actor.
    pub async fn list_submissions(
        &self,
        actor: &UserIdentity,
        form_id: FormId,
    ) -> AppResult<Vec<Submission>> {
        let owned = self
            .forms
            .find_form(form_id)
            .await?
            .is_some_and(|form| form.created_by() == actor.user_id());
        if !owned {
            return Err(AppError::NotFound(FORM_NOT_FOUND.to_owned()));
        }

        self.submissions.list_submissions(form_id).await
    }
}

#[cfg(test)]
mod tests;
