use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tower_sessions::Session;

use formcraft_core::AppError;
use formcraft_domain::FormId;

use crate::auth::session_identity;
use crate::dto::{FormResponse, SubmissionRecordResponse, SubmitFormRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn public_form_handler(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<FormResponse>> {
    let form_id = public_form_id(&form_id)?;
    let form = state.submission_service.load_published_form(form_id).await?;

    Ok(Json(FormResponse::from(&form)))
}

pub async fn submit_form_handler(
    State(state): State<AppState>,
    session: Session,
    Path(form_id): Path<String>,
    Json(payload): Json<SubmitFormRequest>,
) -> ApiResult<(StatusCode, Json<SubmissionRecordResponse>)> {
    let form_id = public_form_id(&form_id)?;
    let submitted_by = session_identity(&session)
        .await?
        .map(|identity| identity.user_id());
    let submission = state
        .submission_service
        .submit(form_id, payload.values, submitted_by)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionRecordResponse::from(&submission)),
    ))
}

// Unparseable ids look exactly like missing forms to the public.
fn public_form_id(raw: &str) -> Result<FormId, AppError> {
    raw.parse::<FormId>()
        .map_err(|_| AppError::NotFound("form not found".to_owned()))
}
