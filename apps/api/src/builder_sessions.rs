//! Live builder sessions keyed by an opaque id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use formcraft_application::{BuilderSession, BuilderSessionHandle};
use formcraft_core::{AppError, AppResult, UserId, UserIdentity};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

/// How often idle sessions are looked for.
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct RegisteredSession {
    owner: UserId,
    handle: Arc<BuilderSessionHandle>,
    last_seen: Instant,
}

/// Registry of open builder sessions.
///
/// Each session is visible only to the user who opened it. Sessions end on
/// an explicit close, on the owner's logout, or after sitting idle.
#[derive(Clone, Default)]
pub struct BuilderSessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, RegisteredSession>>>,
}

impl BuilderSessionRegistry {
    /// Starts the autosave task for `session` and registers it.
    pub async fn open(&self, session: BuilderSession) -> (Uuid, Arc<BuilderSessionHandle>) {
        let session_id = Uuid::new_v4();
        let owner = session.actor().user_id();
        let handle = Arc::new(BuilderSessionHandle::spawn(session));

        self.sessions.write().await.insert(
            session_id,
            RegisteredSession {
                owner,
                handle: Arc::clone(&handle),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %session_id, user_id = %owner, "builder session opened");

        (session_id, handle)
    }

    /// Returns the actor's session and marks it as active.
    pub async fn get(
        &self,
        actor: &UserIdentity,
        session_id: Uuid,
    ) -> AppResult<Arc<BuilderSessionHandle>> {
        let mut sessions = self.sessions.write().await;
        let registered = sessions
            .get_mut(&session_id)
            .filter(|registered| registered.owner == actor.user_id())
            .ok_or_else(|| session_not_found(session_id))?;

        registered.last_seen = Instant::now();
        Ok(Arc::clone(&registered.handle))
    }

    /// Unregisters and tears down the actor's session.
    ///
    /// Returns whether unsaved changes were discarded.
    pub async fn close(&self, actor: &UserIdentity, session_id: Uuid) -> AppResult<bool> {
        let registered = {
            let mut sessions = self.sessions.write().await;
            let owned = sessions
                .get(&session_id)
                .is_some_and(|registered| registered.owner == actor.user_id());
            if !owned {
                return Err(session_not_found(session_id));
            }
            sessions.remove(&session_id)
        };

        let Some(registered) = registered else {
            return Err(session_not_found(session_id));
        };
        let discarded = registered.handle.close().await;
        info!(session_id = %session_id, discarded_changes = discarded, "builder session closed");
        Ok(discarded)
    }

    /// Tears down every session opened by `owner`. Returns how many ended.
    pub async fn close_all_for(&self, owner: UserId) -> usize {
        let removed = self
            .remove_where(|registered| registered.owner == owner)
            .await;
        for (session_id, registered) in &removed {
            let discarded = registered.handle.close().await;
            info!(
                session_id = %session_id,
                user_id = %owner,
                discarded_changes = discarded,
                "builder session closed on logout"
            );
        }
        removed.len()
    }

    /// Tears down sessions unused for at least `idle_timeout` as of `now`.
    /// Returns how many ended.
    pub async fn close_idle(&self, idle_timeout: Duration, now: Instant) -> usize {
        let removed = self
            .remove_where(|registered| {
                now.saturating_duration_since(registered.last_seen) >= idle_timeout
            })
            .await;
        for (session_id, registered) in &removed {
            let discarded = registered.handle.close().await;
            info!(
                session_id = %session_id,
                user_id = %registered.owner,
                discarded_changes = discarded,
                "idle builder session expired"
            );
        }
        removed.len()
    }

    /// Spawns the task that expires idle sessions.
    pub fn spawn_idle_sweep(&self, idle_timeout: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(IDLE_SWEEP_INTERVAL.min(idle_timeout));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.close_idle(idle_timeout, Instant::now()).await;
            }
        })
    }

    async fn remove_where(
        &self,
        matches: impl Fn(&RegisteredSession) -> bool,
    ) -> Vec<(Uuid, RegisteredSession)> {
        let mut sessions = self.sessions.write().await;
        let session_ids: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, registered)| matches(registered))
            .map(|(session_id, _)| *session_id)
            .collect();

        session_ids
            .into_iter()
            .filter_map(|session_id| {
                sessions
                    .remove(&session_id)
                    .map(|registered| (session_id, registered))
            })
            .collect()
    }
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("builder session '{session_id}' does not exist"))
}
