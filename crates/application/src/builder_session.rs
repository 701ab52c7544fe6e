//! One user's editing session over a form aggregate.
//!
//! The session owns the builder state, the autosave scheduler and the
//! gateway used to persist. Saving is split into `begin_save` and
//! `complete_save` so the gateway call can run without holding the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{info, warn};

use formcraft_core::{AppError, AppResult, UserIdentity};
use formcraft_domain::{BuilderAction, BuilderState, Form, FormId, FormStatus};

use crate::autosave::AutosaveScheduler;
use crate::form_ports::FormRepository;

mod handle;

pub use handle::BuilderSessionHandle;

/// Snapshot of a save in progress.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    form: Form,
    revision: u64,
    publish: bool,
}

impl SaveTicket {
    /// Returns the form being written.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }
}

/// Editing session for one form.
pub struct BuilderSession {
    actor: UserIdentity,
    gateway: Arc<dyn FormRepository>,
    state: BuilderState,
    scheduler: AutosaveScheduler,
    revision: u64,
    reserved_id: Option<FormId>,
}

impl BuilderSession {
    /// Starts a session on a new, never-saved draft.
    #[must_use]
    pub fn new_form(
        actor: UserIdentity,
        gateway: Arc<dyn FormRepository>,
        debounce: Duration,
    ) -> Self {
        let form = Form::new_draft(actor.user_id(), Utc::now());
        Self::with_form(actor, gateway, form, debounce)
    }

    /// Starts a session on a stored form owned by `actor`.
    pub async fn open(
        actor: UserIdentity,
        gateway: Arc<dyn FormRepository>,
        form_id: FormId,
        debounce: Duration,
    ) -> AppResult<Self> {
        let form = gateway
            .find_form(form_id)
            .await?
            .filter(|form| form.created_by() == actor.user_id())
            .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))?;

        Ok(Self::with_form(actor, gateway, form, debounce))
    }

    fn with_form(
        actor: UserIdentity,
        gateway: Arc<dyn FormRepository>,
        form: Form,
        debounce: Duration,
    ) -> Self {
        Self {
            actor,
            gateway,
            state: BuilderState::new(form),
            scheduler: AutosaveScheduler::new(debounce),
            revision: 0,
            reserved_id: None,
        }
    }

    /// Applies one action; mutating actions re-arm the autosave timer.
    ///
    /// Move indices outside the element list are rejected.
    pub fn dispatch(&mut self, action: BuilderAction, now: Instant) -> AppResult<()> {
        if let BuilderAction::MoveElement { from, to } = &action {
            let len = self.state.form().elements().len();
            if *from >= len || *to >= len {
                return Err(AppError::Validation(format!(
                    "cannot move element from index {from} to {to} in a form with {len} elements"
                )));
            }
        }

        let mutating = action.is_mutating();
        self.state = self.state.apply(action);
        if mutating {
            self.revision = self.revision.wrapping_add(1);
            self.scheduler.arm(now);
        }

        Ok(())
    }

    /// Starts an explicit save, cancelling any pending autosave.
    ///
    /// Without an override the form is written with its working status.
    /// Publishing writes `Published` but leaves the working status as it was.
    pub fn begin_save(&mut self, status_override: Option<FormStatus>) -> SaveTicket {
        self.scheduler.cancel();
        self.ticket(status_override)
    }

    /// Starts an autosave when the debounce window has elapsed.
    pub fn take_due_autosave(&mut self, now: Instant) -> Option<SaveTicket> {
        if self.scheduler.fire(now) {
            Some(self.ticket(None))
        } else {
            None
        }
    }

    // A never-saved form reserves one id that every later ticket reuses.
    fn ticket(&mut self, status_override: Option<FormStatus>) -> SaveTicket {
        let current = self.state.form();
        let status = status_override.unwrap_or(current.status());
        let mut form = current.prepared_for_save(status, Utc::now());
        if form.id().is_none() {
            let reserved = *self.reserved_id.get_or_insert_with(FormId::new);
            form = form.with_id(reserved);
        }

        SaveTicket {
            form,
            revision: self.revision,
            publish: status_override == Some(FormStatus::Published),
        }
    }

    /// Applies the gateway outcome of a save.
    ///
    /// Success records the form id and clears the dirty flag unless the form
    /// changed while the save was in flight. Failure leaves the state as it
    /// was and does not re-arm the timer.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: AppResult<FormId>,
    ) -> AppResult<FormId> {
        match result {
            Ok(form_id) => {
                let working_status = self.state.form().status();
                let unchanged = ticket.revision == self.revision;
                let mut form = if unchanged {
                    ticket.form.with_id(form_id)
                } else {
                    self.state.form().with_saved_metadata(&ticket.form, form_id)
                };
                if ticket.publish {
                    form = form.with_status(working_status);
                }
                self.state = if unchanged {
                    self.state.saved(form)
                } else {
                    self.state.with_form(form)
                };
                info!(
                    form_id = %form_id,
                    status = ticket.form.status().as_str(),
                    elements = ticket.form.elements().len(),
                    dirty = self.state.is_dirty(),
                    "form saved"
                );
                Ok(form_id)
            }
            Err(error) => {
                warn!(
                    form_id = ?self.state.form().id(),
                    error = %error,
                    "form save failed"
                );
                Err(error)
            }
        }
    }

    /// Saves now, optionally forcing a status (Save passes `Draft`, publish
    /// passes `Published`).
    pub async fn save(&mut self, status_override: Option<FormStatus>) -> AppResult<FormId> {
        let ticket = self.begin_save(status_override);
        let result = self.gateway.save_form(ticket.form()).await;
        self.complete_save(ticket, result)
    }

    /// Saves when the autosave timer has elapsed; `None` when nothing was due.
    pub async fn autosave_if_due(&mut self, now: Instant) -> Option<AppResult<FormId>> {
        let ticket = self.take_due_autosave(now)?;
        let result = self.gateway.save_form(ticket.form()).await;
        Some(self.complete_save(ticket, result))
    }

    /// Ends the session, dropping any pending autosave without saving.
    ///
    /// Returns whether unsaved changes were discarded.
    pub fn teardown(&mut self) -> bool {
        let cancelled = self.scheduler.cancel();
        if self.state.is_dirty() {
            info!(
                form_id = ?self.state.form().id(),
                pending_autosave = cancelled,
                "builder session closed with unsaved changes"
            );
        }
        self.state.is_dirty()
    }

    /// Returns the builder state.
    #[must_use]
    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    /// Returns the user who owns the session.
    #[must_use]
    pub fn actor(&self) -> &UserIdentity {
        &self.actor
    }

    /// Returns the gateway the session saves through.
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn FormRepository> {
        Arc::clone(&self.gateway)
    }

    /// Returns the pending autosave deadline.
    #[must_use]
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }
}
