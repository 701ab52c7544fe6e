mod auth;
mod builder;
mod common;
mod forms;
mod submissions;

pub use auth::{AuthLoginRequest, AuthRegisterRequest};
pub use builder::{
    BuilderActionRequest, BuilderSessionResponse, CloseBuilderSessionResponse,
    CreateBuilderSessionRequest, ElementOptionRequest, ElementPatchRequest, FormPatchRequest,
    OptionPatchRequest,
};
pub use common::{GenericMessageResponse, HealthResponse, UserIdentityResponse};
pub use forms::{
    ElementOptionResponse, FormElementResponse, FormResponse, FormSummaryResponse,
    PaletteEntryResponse,
};
pub use submissions::{SubmissionAnswerResponse, SubmissionRecordResponse, SubmitFormRequest};

#[cfg(test)]
mod tests {
    use super::{
        AuthLoginRequest, AuthRegisterRequest, BuilderActionRequest, BuilderSessionResponse,
        CloseBuilderSessionResponse, CreateBuilderSessionRequest, ElementOptionRequest,
        ElementOptionResponse, ElementPatchRequest, FormElementResponse, FormPatchRequest,
        FormResponse, FormSummaryResponse, GenericMessageResponse, HealthResponse,
        OptionPatchRequest, PaletteEntryResponse, SubmissionAnswerResponse,
        SubmissionRecordResponse, SubmitFormRequest, UserIdentityResponse,
    };
    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        AuthLoginRequest::export(&config)?;
        AuthRegisterRequest::export(&config)?;
        BuilderActionRequest::export(&config)?;
        BuilderSessionResponse::export(&config)?;
        CloseBuilderSessionResponse::export(&config)?;
        CreateBuilderSessionRequest::export(&config)?;
        ElementOptionRequest::export(&config)?;
        ElementOptionResponse::export(&config)?;
        ElementPatchRequest::export(&config)?;
        ErrorResponse::export(&config)?;
        FormElementResponse::export(&config)?;
        FormPatchRequest::export(&config)?;
        FormResponse::export(&config)?;
        FormSummaryResponse::export(&config)?;
        GenericMessageResponse::export(&config)?;
        HealthResponse::export(&config)?;
        OptionPatchRequest::export(&config)?;
        PaletteEntryResponse::export(&config)?;
        SubmissionAnswerResponse::export(&config)?;
        SubmissionRecordResponse::export(&config)?;
        SubmitFormRequest::export(&config)?;
        UserIdentityResponse::export(&config)?;

        Ok(())
    }
}
