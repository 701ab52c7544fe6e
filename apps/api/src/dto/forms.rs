use formcraft_application::FormSummary;
use formcraft_domain::{ElementOption, ElementType, Form, FormElement};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

/// Dashboard row for one form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/form-summary-response.ts"
)]
pub struct FormSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub version: i32,
    pub element_count: usize,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<FormSummary> for FormSummaryResponse {
    fn from(value: FormSummary) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            description: value.description,
            status: value.status.as_str().to_owned(),
            version: value.version,
            element_count: value.element_count,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            published_at: value.published_at.map(|timestamp| timestamp.to_rfc3339()),
        }
    }
}

/// One selectable option.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/element-option-response.ts"
)]
pub struct ElementOptionResponse {
    pub id: String,
    pub value: String,
    pub label: String,
}

impl From<&ElementOption> for ElementOptionResponse {
    fn from(value: &ElementOption) -> Self {
        Self {
            id: value.id.clone(),
            value: value.value.clone(),
            label: value.label.clone(),
        }
    }
}

/// API representation of one form element.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/form-element-response.ts"
)]
pub struct FormElementResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    #[ts(type = "Record<string, unknown> | null")]
    pub validation: Option<Value>,
    pub options: Option<Vec<ElementOptionResponse>>,
    pub repeatable: bool,
    pub position: usize,
}

impl From<&FormElement> for FormElementResponse {
    fn from(value: &FormElement) -> Self {
        Self {
            id: value.id().to_string(),
            element_type: value.element_type().as_str().to_owned(),
            label: value.label().to_owned(),
            placeholder: value.placeholder().map(ToOwned::to_owned),
            required: value.required(),
            validation: value
                .validation()
                .and_then(|rules| serde_json::to_value(rules).ok()),
            options: value
                .options()
                .map(|options| options.iter().map(ElementOptionResponse::from).collect()),
            repeatable: value.repeatable(),
            position: value.position(),
        }
    }
}

/// API representation of a form aggregate.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/form-response.ts"
)]
pub struct FormResponse {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    #[ts(type = "Record<string, unknown> | null")]
    pub branding: Option<Value>,
    pub version: i32,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
    pub elements: Vec<FormElementResponse>,
}

impl From<&Form> for FormResponse {
    fn from(value: &Form) -> Self {
        Self {
            id: value.id().map(|form_id| form_id.to_string()),
            title: value.title().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            status: value.status().as_str().to_owned(),
            branding: value
                .branding()
                .and_then(|branding| serde_json::to_value(branding).ok()),
            version: value.version(),
            created_by: value.created_by().to_string(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
            published_at: value.published_at().map(|timestamp| timestamp.to_rfc3339()),
            elements: value
                .elements()
                .iter()
                .map(FormElementResponse::from)
                .collect(),
        }
    }
}

/// One entry of the element palette.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/palette-entry-response.ts"
)]
pub struct PaletteEntryResponse {
    #[serde(rename = "type")]
    pub element_type: String,
    pub label: String,
    pub supports_options: bool,
}

impl From<ElementType> for PaletteEntryResponse {
    fn from(value: ElementType) -> Self {
        Self {
            element_type: value.as_str().to_owned(),
            label: value.palette_label().to_owned(),
            supports_options: value.supports_options(),
        }
    }
}
