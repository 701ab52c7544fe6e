use std::sync::Arc;

use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use formcraft_core::{AppResult, UserIdentity};
use formcraft_domain::{BuilderAction, BuilderState, FormId, FormStatus};

use super::BuilderSession;
use crate::form_ports::FormRepository;

/// Shared handle to a live builder session with its autosave task.
///
/// The background task sleeps until the scheduler deadline and is woken on
/// every mutation so the deadline moves with the latest edit. Gateway calls
/// run without holding the session lock, and at most one save per session
/// is in flight: later saves wait for it and then snapshot the newest state.
pub struct BuilderSessionHandle {
    session: Arc<Mutex<BuilderSession>>,
    save_gate: Arc<Mutex<()>>,
    gateway: Arc<dyn FormRepository>,
    activity: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    driver: JoinHandle<()>,
}

impl BuilderSessionHandle {
    /// Wraps `session` and starts its autosave task on the current runtime.
    #[must_use]
    pub fn spawn(session: BuilderSession) -> Self {
        let gateway = session.gateway();
        let session = Arc::new(Mutex::new(session));
        let save_gate = Arc::new(Mutex::new(()));
        let activity = Arc::new(Notify::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let driver = tokio::spawn(drive_autosave(
            Arc::clone(&session),
            Arc::clone(&save_gate),
            Arc::clone(&gateway),
            Arc::clone(&activity),
            shutdown_rx,
        ));

        Self {
            session,
            save_gate,
            gateway,
            activity,
            shutdown,
            driver,
        }
    }

    /// Applies one action and returns the resulting state.
    pub async fn dispatch(&self, action: BuilderAction) -> AppResult<BuilderState> {
        let state = {
            let mut session = self.session.lock().await;
            session.dispatch(action, Instant::now())?;
            session.state().clone()
        };
        self.activity.notify_one();
        Ok(state)
    }

    /// Saves now; `Some(FormStatus::Published)` publishes.
    pub async fn save(&self, status_override: Option<FormStatus>) -> AppResult<FormId> {
        let _in_flight = self.save_gate.lock().await;
        let ticket = self.session.lock().await.begin_save(status_override);
        self.activity.notify_one();
        let result = self.gateway.save_form(ticket.form()).await;
        self.session.lock().await.complete_save(ticket, result)
    }

    /// Returns the current builder state.
    pub async fn state(&self) -> BuilderState {
        self.session.lock().await.state().clone()
    }

    /// Returns the session owner.
    pub async fn actor(&self) -> UserIdentity {
        self.session.lock().await.actor().clone()
    }

    /// Stops autosaving and tears the session down.
    ///
    /// A save already in flight still completes. Returns whether unsaved
    /// changes were discarded.
    pub async fn close(&self) -> bool {
        let _ = self.shutdown.send(true);
        self.session.lock().await.teardown()
    }

    /// Returns whether the autosave task has exited.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.driver.is_finished()
    }
}

async fn drive_autosave(
    session: Arc<Mutex<BuilderSession>>,
    save_gate: Arc<Mutex<()>>,
    gateway: Arc<dyn FormRepository>,
    activity: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let deadline = session.lock().await.autosave_deadline();
        match deadline {
            None => {
                tokio::select! {
                    () = activity.notified() => continue,
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }
            Some(deadline) => {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {}
                    () = activity.notified() => continue,
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }
        }

        let _in_flight = save_gate.lock().await;
        let ticket = session.lock().await.take_due_autosave(Instant::now());
        let Some(ticket) = ticket else {
            continue;
        };

        debug!(form_id = ?ticket.form().id(), "autosave fired");
        let result = gateway.save_form(ticket.form()).await;
        let _ = session.lock().await.complete_save(ticket, result);
    }

    debug!("autosave task stopped");
}
