use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use formcraft_application::BuilderSession;
use formcraft_core::{AppError, UserIdentity};
use formcraft_domain::{BuilderAction, ElementType, FormId, FormStatus};

use crate::dto::{
    BuilderActionRequest, BuilderSessionResponse, CloseBuilderSessionResponse,
    CreateBuilderSessionRequest, PaletteEntryResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn palette_handler() -> Json<Vec<PaletteEntryResponse>> {
    Json(
        ElementType::ALL
            .into_iter()
            .map(PaletteEntryResponse::from)
            .collect(),
    )
}

pub async fn create_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Option<Json<CreateBuilderSessionRequest>>,
) -> ApiResult<(StatusCode, Json<BuilderSessionResponse>)> {
    let Json(payload) = payload.unwrap_or_default();
    let gateway = state.form_service.repository();

    let session = match payload.form_id {
        Some(form_id) => {
            let form_id = form_id.parse::<FormId>()?;
            BuilderSession::open(user, gateway, form_id, state.autosave_debounce).await?
        }
        None => BuilderSession::new_form(user, gateway, state.autosave_debounce),
    };

    let (session_id, handle) = state.builder_sessions.open(session).await;
    let snapshot = handle.state().await;

    Ok((
        StatusCode::CREATED,
        Json(BuilderSessionResponse::from_state(session_id, &snapshot)),
    ))
}

pub async fn get_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<BuilderSessionResponse>> {
    let handle = state.builder_sessions.get(&user, session_id).await?;
    let snapshot = handle.state().await;

    Ok(Json(BuilderSessionResponse::from_state(session_id, &snapshot)))
}

pub async fn dispatch_action_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<BuilderActionRequest>,
) -> ApiResult<Json<BuilderSessionResponse>> {
    let action = BuilderAction::try_from(payload)?;
    let handle = state.builder_sessions.get(&user, session_id).await?;
    let snapshot = handle.dispatch(action).await?;

    Ok(Json(BuilderSessionResponse::from_state(session_id, &snapshot)))
}

pub async fn save_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<BuilderSessionResponse>> {
    persist(&state, &user, session_id, Some(FormStatus::Draft)).await
}

pub async fn publish_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<BuilderSessionResponse>> {
    persist(&state, &user, session_id, Some(FormStatus::Published)).await
}

async fn persist(
    state: &AppState,
    user: &UserIdentity,
    session_id: Uuid,
    status_override: Option<FormStatus>,
) -> ApiResult<Json<BuilderSessionResponse>> {
    let handle = state.builder_sessions.get(user, session_id).await?;
    handle.save(status_override).await?;
    let snapshot = handle.state().await;

    Ok(Json(BuilderSessionResponse::from_state(session_id, &snapshot)))
}

pub async fn close_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CloseBuilderSessionResponse>> {
    let discarded_changes = state.builder_sessions.close(&user, session_id).await?;

    Ok(Json(CloseBuilderSessionResponse { discarded_changes }))
}
