use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use formcraft_core::UserIdentity;
use formcraft_domain::FormId;

use crate::dto::{FormResponse, FormSummaryResponse, SubmissionRecordResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_forms_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<FormSummaryResponse>>> {
    let forms = state
        .form_service
        .list_forms(&user)
        .await?
        .into_iter()
        .map(FormSummaryResponse::from)
        .collect();

    Ok(Json(forms))
}

pub async fn get_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<FormResponse>> {
    let form_id = form_id.parse::<FormId>()?;
    let form = state.form_service.get_form(&user, form_id).await?;

    Ok(Json(FormResponse::from(&form)))
}

pub async fn delete_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<StatusCode> {
    let form_id = form_id.parse::<FormId>()?;
    state.form_service.delete_form(&user, form_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_form_submissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<Vec<SubmissionRecordResponse>>> {
    let form_id = form_id.parse::<FormId>()?;
    let submissions = state
        .submission_service
        .list_submissions(&user, form_id)
        .await?;

    Ok(Json(
        submissions
            .iter()
            .map(SubmissionRecordResponse::from)
            .collect(),
    ))
}
