//! Session-backed sign-up, sign-in and sign-out.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use formcraft_application::RegisterInput;
use formcraft_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{
    AuthLoginRequest, AuthRegisterRequest, GenericMessageResponse, UserIdentityResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

pub(crate) async fn session_identity(session: &Session) -> Result<Option<UserIdentity>, AppError> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))
}

async fn establish_session(session: &Session, identity: &UserIdentity) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))
}

/// POST /auth/register - Create an account and sign in.
pub async fn register_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthRegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserIdentityResponse>)> {
    let identity = state
        .user_service
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            confirm_password: payload.confirm_password,
            full_name: payload.full_name,
        })
        .await?;

    establish_session(&session, &identity).await?;
    Ok((StatusCode::CREATED, Json(UserIdentityResponse::from(identity))))
}

/// POST /auth/login - Authenticate with email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_owned()))?;

    establish_session(&session, &identity).await?;
    info!(user_id = %identity.user_id(), "user signed in");
    Ok(Json(UserIdentityResponse::from(identity)))
}

/// POST /auth/logout - Drop the session and end the user's builder sessions.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<GenericMessageResponse>> {
    if let Some(identity) = session_identity(&session).await? {
        let closed = state
            .builder_sessions
            .close_all_for(identity.user_id())
            .await;
        info!(
            user_id = %identity.user_id(),
            builder_sessions_closed = closed,
            "user signed out"
        );
    }

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(Json(GenericMessageResponse {
        message: "signed out".to_owned(),
    }))
}

/// GET /auth/me - Current user.
pub async fn me_handler(session: Session) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = session_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(UserIdentityResponse::from(identity)))
}
