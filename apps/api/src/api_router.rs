mod cors;
mod public_forms;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use formcraft_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/forms", get(handlers::forms::list_forms_handler))
        .route(
            "/api/forms/{form_id}",
            get(handlers::forms::get_form_handler).delete(handlers::forms::delete_form_handler),
        )
        .route(
            "/api/forms/{form_id}/submissions",
            get(handlers::forms::list_form_submissions_handler),
        )
        .route(
            "/api/builder/palette",
            get(handlers::builder::palette_handler),
        )
        .route(
            "/api/builder/sessions",
            post(handlers::builder::create_session_handler),
        )
        .route(
            "/api/builder/sessions/{session_id}",
            get(handlers::builder::get_session_handler)
                .delete(handlers::builder::close_session_handler),
        )
        .route(
            "/api/builder/sessions/{session_id}/actions",
            post(handlers::builder::dispatch_action_handler),
        )
        .route(
            "/api/builder/sessions/{session_id}/save",
            post(handlers::builder::save_session_handler),
        )
        .route(
            "/api/builder/sessions/{session_id}/publish",
            post(handlers::builder::publish_session_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(public_forms::build_public_form_routes())
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
