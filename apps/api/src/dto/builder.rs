use formcraft_core::{AppError, AppResult};
use formcraft_domain::{
    BuilderAction, BuilderState, ElementId, ElementOption, ElementPatch, ElementType, FormBranding,
    FormPatch, FormStatus, OptionPatch, ValidationRules,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use super::forms::FormResponse;

/// Opens a builder session on a new form, or on `form_id` when given.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-builder-session-request.ts"
)]
pub struct CreateBuilderSessionRequest {
    #[serde(default)]
    pub form_id: Option<String>,
}

/// Incoming option payload.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/element-option-request.ts"
)]
pub struct ElementOptionRequest {
    pub id: String,
    pub value: String,
    pub label: String,
}

/// Partial element update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/element-patch-request.ts"
)]
#[serde(default)]
pub struct ElementPatchRequest {
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    #[ts(type = "Record<string, unknown> | null")]
    pub validation: Option<Value>,
    pub options: Option<Vec<ElementOptionRequest>>,
    pub repeatable: Option<bool>,
}

/// Partial option update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/option-patch-request.ts"
)]
#[serde(default)]
pub struct OptionPatchRequest {
    pub value: Option<String>,
    pub label: Option<String>,
}

/// Partial form metadata update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/form-patch-request.ts"
)]
#[serde(default)]
pub struct FormPatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub branding: Option<Value>,
}

/// One builder action.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/builder-action-request.ts"
)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BuilderActionRequest {
    AddElement {
        #[serde(rename = "type")]
        element_type: String,
        position: usize,
    },
    UpdateElement {
        id: String,
        patch: ElementPatchRequest,
    },
    RemoveElement {
        id: String,
    },
    MoveElement {
        from: usize,
        to: usize,
    },
    SelectElement {
        id: Option<String>,
    },
    UpdateForm {
        patch: FormPatchRequest,
    },
    AddOption {
        element_id: String,
    },
    UpdateOption {
        element_id: String,
        index: usize,
        patch: OptionPatchRequest,
    },
    RemoveOption {
        element_id: String,
        index: usize,
    },
}

fn decode_value<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|error| AppError::Validation(format!("invalid {field}: {error}")))
}

impl TryFrom<ElementPatchRequest> for ElementPatch {
    type Error = AppError;

    fn try_from(value: ElementPatchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            element_type: value
                .element_type
                .map(|raw| raw.parse::<ElementType>())
                .transpose()?,
            label: value.label,
            placeholder: value.placeholder,
            required: value.required,
            validation: value
                .validation
                .map(|raw| decode_value::<ValidationRules>("validation", raw))
                .transpose()?,
            options: value.options.map(|options| {
                options
                    .into_iter()
                    .map(|option| ElementOption {
                        id: option.id,
                        value: option.value,
                        label: option.label,
                    })
                    .collect()
            }),
            repeatable: value.repeatable,
        })
    }
}

impl TryFrom<FormPatchRequest> for FormPatch {
    type Error = AppError;

    fn try_from(value: FormPatchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            description: value.description,
            status: value
                .status
                .map(|raw| raw.parse::<FormStatus>())
                .transpose()?,
            branding: value
                .branding
                .map(|raw| decode_value::<FormBranding>("branding", raw))
                .transpose()?,
        })
    }
}

impl TryFrom<BuilderActionRequest> for BuilderAction {
    type Error = AppError;

    fn try_from(value: BuilderActionRequest) -> Result<Self, Self::Error> {
        Ok(match value {
            BuilderActionRequest::AddElement {
                element_type,
                position,
            } => Self::AddElement {
                element_type: element_type.parse::<ElementType>()?,
                position,
            },
            BuilderActionRequest::UpdateElement { id, patch } => Self::UpdateElement {
                id: ElementId::new(id),
                patch: patch.try_into()?,
            },
            BuilderActionRequest::RemoveElement { id } => Self::RemoveElement {
                id: ElementId::new(id),
            },
            BuilderActionRequest::MoveElement { from, to } => Self::MoveElement { from, to },
            BuilderActionRequest::SelectElement { id } => Self::SelectElement {
                id: id.map(ElementId::new),
            },
            BuilderActionRequest::UpdateForm { patch } => Self::UpdateForm {
                patch: patch.try_into()?,
            },
            BuilderActionRequest::AddOption { element_id } => Self::AddOption {
                element_id: ElementId::new(element_id),
            },
            BuilderActionRequest::UpdateOption {
                element_id,
                index,
                patch,
            } => Self::UpdateOption {
                element_id: ElementId::new(element_id),
                index,
                patch: OptionPatch {
                    value: patch.value,
                    label: patch.label,
                },
            },
            BuilderActionRequest::RemoveOption { element_id, index } => Self::RemoveOption {
                element_id: ElementId::new(element_id),
                index,
            },
        })
    }
}

/// Snapshot of a live builder session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/builder-session-response.ts"
)]
pub struct BuilderSessionResponse {
    pub session_id: String,
    pub form: FormResponse,
    pub selected_element_id: Option<String>,
    pub dirty: bool,
}

impl BuilderSessionResponse {
    /// Builds the response for `state` of session `session_id`.
    #[must_use]
    pub fn from_state(session_id: Uuid, state: &BuilderState) -> Self {
        Self {
            session_id: session_id.to_string(),
            form: FormResponse::from(state.form()),
            selected_element_id: state.selected_element().map(ToString::to_string),
            dirty: state.is_dirty(),
        }
    }
}

/// Result of closing a builder session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/close-builder-session-response.ts"
)]
pub struct CloseBuilderSessionResponse {
    pub discarded_changes: bool,
}
