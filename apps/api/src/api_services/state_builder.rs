use std::sync::Arc;

use formcraft_application::{
    FormRepository, FormService, SubmissionRepository, SubmissionService, UserService,
};
use formcraft_infrastructure::{
    Argon2PasswordHasher, InMemoryFormStore, PostgresFormRepository,
    PostgresSubmissionRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, FormStoreKind};
use crate::builder_sessions::BuilderSessionRegistry;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let (form_repository, submission_repository): (
        Arc<dyn FormRepository>,
        Arc<dyn SubmissionRepository>,
    ) = match config.form_store {
        FormStoreKind::Postgres => (
            Arc::new(PostgresFormRepository::new(pool.clone())),
            Arc::new(PostgresSubmissionRepository::new(pool.clone())),
        ),
        FormStoreKind::Memory => {
            let store = Arc::new(InMemoryFormStore::new());
            (store.clone(), store)
        }
    };
    info!(form_store = ?config.form_store, "form store selected");

    let user_service = UserService::new(
        Arc::new(PostgresUserRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::new()),
    );

    AppState {
        user_service,
        form_service: FormService::new(form_repository.clone()),
        submission_service: SubmissionService::new(form_repository, submission_repository),
        builder_sessions: BuilderSessionRegistry::default(),
        autosave_debounce: config.autosave_debounce,
        frontend_url: config.frontend_url.clone(),
    }
}
