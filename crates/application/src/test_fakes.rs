use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use formcraft_core::{AppError, AppResult, UserId, UserIdentity};
use formcraft_domain::{Form, FormId, Submission};

use crate::form_ports::{FormRepository, FormSummary, SubmissionRepository};

pub(crate) fn actor() -> UserIdentity {
    UserIdentity::new(UserId::new(), "owner@example.com", Some("Owner".to_owned()))
}

#[derive(Default)]
pub(crate) struct FakeFormRepository {
    pub(crate) forms: Mutex<HashMap<FormId, Form>>,
    pub(crate) saves: Mutex<Vec<Form>>,
    pub(crate) fail_saves: AtomicBool,
    pub(crate) save_calls: AtomicUsize,
}

impl FakeFormRepository {
    pub(crate) fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    pub(crate) async fn insert(&self, form: Form) -> FormId {
        let form_id = form.id().unwrap_or_default();
        self.forms.lock().await.insert(form_id, form.with_id(form_id));
        form_id
    }
}

#[async_trait]
impl FormRepository for FakeFormRepository {
    async fn save_form(&self, form: &Form) -> AppResult<FormId> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("connection reset by peer".to_owned()));
        }

        let form_id = form.id().unwrap_or_default();
        let stored = form.with_id(form_id);
        self.saves.lock().await.push(stored.clone());
        self.forms.lock().await.insert(form_id, stored);
        Ok(form_id)
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self.forms.lock().await.get(&form_id).cloned())
    }

    async fn find_published_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self
            .forms
            .lock()
            .await
            .get(&form_id)
            .filter(|form| form.is_published())
            .cloned())
    }

    async fn list_forms_by_owner(&self, owner: UserId) -> AppResult<Vec<FormSummary>> {
        let forms = self.forms.lock().await;
        let mut listed: Vec<FormSummary> = forms
            .iter()
            .filter(|(_, form)| form.created_by() == owner)
            .map(|(form_id, form)| FormSummary {
                id: *form_id,
                title: form.title().to_owned(),
                description: form.description().map(str::to_owned),
                status: form.status(),
                version: form.version(),
                element_count: form.elements().len(),
                created_at: form.created_at(),
                updated_at: form.updated_at(),
                published_at: form.published_at(),
            })
            .collect();
        listed.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
        Ok(listed)
    }

    async fn delete_form(&self, owner: UserId, form_id: FormId) -> AppResult<()> {
        let mut forms = self.forms.lock().await;
        match forms.get(&form_id) {
            Some(form) if form.created_by() == owner => {
                forms.remove(&form_id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("form '{form_id}' does not exist"))),
        }
    }
}

/// Form repository that can park the next save until released.
#[derive(Default)]
pub(crate) struct GatedFormRepository {
    pub(crate) inner: FakeFormRepository,
    pub(crate) entered: Notify,
    pub(crate) release: Notify,
    hold_next: AtomicBool,
}

impl GatedFormRepository {
    pub(crate) fn hold_next_save(&self) {
        self.hold_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FormRepository for GatedFormRepository {
    async fn save_form(&self, form: &Form) -> AppResult<FormId> {
        if self.hold_next.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.save_form(form).await
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        self.inner.find_form(form_id).await
    }

    async fn find_published_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        self.inner.find_published_form(form_id).await
    }

    async fn list_forms_by_owner(&self, owner: UserId) -> AppResult<Vec<FormSummary>> {
        self.inner.list_forms_by_owner(owner).await
    }

    async fn delete_form(&self, owner: UserId, form_id: FormId) -> AppResult<()> {
        self.inner.delete_form(owner, form_id).await
    }
}

#[derive(Default)]
pub(crate) struct FakeSubmissionRepository {
    pub(crate) submissions: Mutex<Vec<Submission>>,
    pub(crate) fail: AtomicBool,
}

#[async_trait]
impl SubmissionRepository for FakeSubmissionRepository {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Persistence(
                "insert into submission_responses failed".to_owned(),
            ));
        }
        self.submissions.lock().await.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        Ok(self
            .submissions
            .lock()
            .await
            .iter()
            .filter(|submission| submission.form_id() == form_id)
            .cloned()
            .collect())
    }
}
