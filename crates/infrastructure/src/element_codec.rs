//! Row mapping for `form_elements`.
//!
//! `options` and `validation` are stored as JSON text. Decoding is lenient:
//! a malformed value is logged and read back as absent.

use formcraft_core::{AppError, AppResult};
use formcraft_domain::{ElementId, ElementOption, ElementType, FormElement, ValidationRules};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ElementRow {
    pub(crate) id: String,
    #[sqlx(rename = "type")]
    pub(crate) element_type: String,
    pub(crate) label: String,
    pub(crate) placeholder: Option<String>,
    pub(crate) required: bool,
    pub(crate) validation: Option<String>,
    pub(crate) options: Option<String>,
    pub(crate) repeatable: bool,
    pub(crate) position: i32,
}

impl ElementRow {
    pub(crate) fn into_element(self) -> AppResult<FormElement> {
        let element_type = self.element_type.parse::<ElementType>()?;
        let position = usize::try_from(self.position).map_err(|_| {
            AppError::Internal(format!(
                "element '{}' has negative position {}",
                self.id, self.position
            ))
        })?;
        let validation = decode_validation(&self.id, self.validation.as_deref());
        let options = decode_options(&self.id, self.options.as_deref());

        Ok(
            FormElement::new(ElementId::new(self.id), element_type, self.label, position)
                .with_placeholder(self.placeholder)
                .with_required(self.required)
                .with_validation(validation)
                .with_options(options)
                .with_repeatable(self.repeatable),
        )
    }
}

/// Column values for one element insert.
#[derive(Debug)]
pub(crate) struct EncodedElement {
    pub(crate) validation: Option<String>,
    pub(crate) options: Option<String>,
    pub(crate) position: i32,
}

pub(crate) fn encode_element(element: &FormElement) -> AppResult<EncodedElement> {
    let position = i32::try_from(element.position()).map_err(|_| {
        AppError::Validation(format!(
            "element '{}' position {} is out of range",
            element.id(),
            element.position()
        ))
    })?;

    Ok(EncodedElement {
        validation: encode_json(element.id(), "validation", element.validation())?,
        options: encode_json(element.id(), "options", element.options())?,
        position,
    })
}

fn encode_json<T: Serialize + ?Sized>(
    element_id: &ElementId,
    column: &str,
    value: Option<&T>,
) -> AppResult<Option<String>> {
    value
        .map(|value| {
            serde_json::to_string(value).map_err(|error| {
                AppError::Internal(format!(
                    "failed to encode {column} of element '{element_id}': {error}"
                ))
            })
        })
        .transpose()
}

pub(crate) fn decode_options(element_id: &str, raw: Option<&str>) -> Option<Vec<ElementOption>> {
    let raw = raw.filter(|raw| !raw.trim().is_empty())?;
    match serde_json::from_str::<Vec<ElementOption>>(raw) {
        Ok(options) => Some(options),
        Err(error) => {
            warn!(element_id, error = %error, "ignoring unreadable element options");
            None
        }
    }
}

pub(crate) fn decode_validation(element_id: &str, raw: Option<&str>) -> Option<ValidationRules> {
    let raw = raw.filter(|raw| !raw.trim().is_empty())?;
    match serde_json::from_str::<ValidationRules>(raw) {
        Ok(rules) => Some(rules),
        Err(error) => {
            warn!(element_id, error = %error, "ignoring unreadable validation rules");
            None
        }
    }
}
