use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Routes reachable without a session: rendering and submitting a
/// published form.
pub(super) fn build_public_form_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/public/forms/{form_id}",
            get(handlers::public::public_form_handler),
        )
        .route(
            "/api/public/forms/{form_id}/submissions",
            post(handlers::public::submit_form_handler),
        )
}
