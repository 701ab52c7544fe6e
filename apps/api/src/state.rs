use std::time::Duration;

use formcraft_application::{FormService, SubmissionService, UserService};

use crate::builder_sessions::BuilderSessionRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub form_service: FormService,
    pub submission_service: SubmissionService,
    pub builder_sessions: BuilderSessionRegistry,
    pub autosave_debounce: Duration,
    pub frontend_url: String,
}
