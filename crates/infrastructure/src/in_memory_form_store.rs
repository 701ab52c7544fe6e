use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use formcraft_application::{FormRepository, FormSummary, SubmissionRepository};
use formcraft_core::{AppError, AppResult, UserId};
use formcraft_domain::{Form, FormId, Submission};

/// In-memory forms and submissions, for local runs without form tables.
///
/// Implements both ports over one store so deleting a form also drops its
/// submissions.
#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    forms: RwLock<HashMap<FormId, Form>>,
    submissions: RwLock<Vec<Submission>>,
}

impl InMemoryFormStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn summarize(form_id: FormId, form: &Form) -> FormSummary {
    FormSummary {
        id: form_id,
        title: form.title().to_owned(),
        description: form.description().map(str::to_owned),
        status: form.status(),
        version: form.version(),
        element_count: form.elements().len(),
        created_at: form.created_at(),
        updated_at: form.updated_at(),
        published_at: form.published_at(),
    }
}

#[async_trait]
impl FormRepository for InMemoryFormStore {
    async fn save_form(&self, form: &Form) -> AppResult<FormId> {
        let form_id = form.id().unwrap_or_default();
        let mut forms = self.forms.write().await;

        if let Some(existing) = forms.get(&form_id)
            && existing.created_by() != form.created_by()
        {
            return Err(AppError::NotFound(format!(
                "form '{form_id}' does not exist"
            )));
        }

        forms.insert(form_id, form.with_id(form_id));
        Ok(form_id)
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self.forms.read().await.get(&form_id).cloned())
    }

    async fn find_published_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self
            .forms
            .read()
            .await
            .get(&form_id)
            .filter(|form| form.is_published())
            .cloned())
    }

    async fn list_forms_by_owner(&self, owner: UserId) -> AppResult<Vec<FormSummary>> {
        let forms = self.forms.read().await;
        let mut summaries: Vec<FormSummary> = forms
            .iter()
            .filter(|(_, form)| form.created_by() == owner)
            .map(|(form_id, form)| summarize(*form_id, form))
            .collect();
        summaries.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
        Ok(summaries)
    }

    async fn delete_form(&self, owner: UserId, form_id: FormId) -> AppResult<()> {
        let mut forms = self.forms.write().await;
        let owned = forms
            .get(&form_id)
            .is_some_and(|form| form.created_by() == owner);
        if !owned {
            return Err(AppError::NotFound(format!(
                "form '{form_id}' does not exist"
            )));
        }

        forms.remove(&form_id);
        self.submissions
            .write()
            .await
            .retain(|submission| submission.form_id() != form_id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryFormStore {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        self.submissions.write().await.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        let mut listed: Vec<Submission> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|submission| submission.form_id() == form_id)
            .cloned()
            .collect();
        listed.sort_by(|left, right| right.submitted_at().cmp(&left.submitted_at()));
        Ok(listed)
    }
}
