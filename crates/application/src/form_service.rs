//! Dashboard operations over stored forms.

use std::sync::Arc;

use tracing::info;

use formcraft_core::{AppError, AppResult, UserIdentity};
use formcraft_domain::{Form, FormId};

use crate::form_ports::{FormRepository, FormSummary};

/// Owner-scoped listing, lookup and deletion of forms.
#[derive(Clone)]
pub struct FormService {
    repository: Arc<dyn FormRepository>,
}

impl FormService {
    /// Creates a new form service.
    #[must_use]
    pub fn new(repository: Arc<dyn FormRepository>) -> Self {
        Self { repository }
    }

    /// Lists the actor's forms, most recently updated first.
    pub async fn list_forms(&self, actor: &UserIdentity) -> AppResult<Vec<FormSummary>> {
        self.repository.list_forms_by_owner(actor.user_id()).await
    }

    /// Returns one form owned by the actor.
    pub async fn get_form(&self, actor: &UserIdentity, form_id: FormId) -> AppResult<Form> {
        self.repository
            .find_form(form_id)
            .await?
            .filter(|form| form.created_by() == actor.user_id())
            .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))
    }

    /// Deletes one form owned by the actor together with its submissions.
    pub async fn delete_form(&self, actor: &UserIdentity, form_id: FormId) -> AppResult<()> {
        self.repository
            .delete_form(actor.user_id(), form_id)
            .await?;
        info!(form_id = %form_id, user_id = %actor.user_id(), "form deleted");
        Ok(())
    }

    /// Returns the repository for sharing with builder sessions.
    #[must_use]
    pub fn repository(&self) -> Arc<dyn FormRepository> {
        Arc::clone(&self.repository)
    }
}
