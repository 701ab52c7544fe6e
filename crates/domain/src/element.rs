use std::fmt::{Display, Formatter};
use std::str::FromStr;

use formcraft_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Numeric input.
    Number,
    /// Email address input.
    Email,
    /// URL input.
    Url,
    /// Calendar date.
    Date,
    /// Date and time of day.
    Datetime,
    /// Time of day.
    Time,
    /// Single choice from a dropdown.
    Select,
    /// Single choice from radio buttons.
    Radio,
    /// Multiple choice from checkboxes.
    Checkbox,
    /// File upload.
    File,
    /// Image upload.
    Image,
    /// Dropdown fed from an external option source.
    DynamicDropdown,
    /// Group of fields that can repeat.
    RepeatingSection,
}

impl ElementType {
    /// Every element type in palette order.
    pub const ALL: [ElementType; 15] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Email,
        Self::Url,
        Self::Date,
        Self::Datetime,
        Self::Time,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::File,
        Self::Image,
        Self::DynamicDropdown,
        Self::RepeatingSection,
    ];

    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Time => "time",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Image => "image",
            Self::DynamicDropdown => "dynamic_dropdown",
            Self::RepeatingSection => "repeating_section",
        }
    }

    /// Returns the label shown in the builder palette.
    #[must_use]
    pub fn palette_label(&self) -> &'static str {
        match self {
            Self::Text => "Text Input",
            Self::Textarea => "Text Area",
            Self::Number => "Number",
            Self::Email => "Email",
            Self::Url => "URL",
            Self::Date => "Date",
            Self::Datetime => "Date & Time",
            Self::Time => "Time",
            Self::Select => "Dropdown",
            Self::Radio => "Radio Buttons",
            Self::Checkbox => "Checkboxes",
            Self::File => "File Upload",
            Self::Image => "Image Upload",
            Self::DynamicDropdown => "Dynamic Dropdown",
            Self::RepeatingSection => "Repeating Section",
        }
    }

    /// Returns whether the type renders a fixed option list.
    #[must_use]
    pub fn supports_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

impl Display for ElementType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|element_type| element_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown element type '{value}'")))
    }
}

/// Opaque element identifier, unique within a form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ElementId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Declarative validation rules attached to an element.
///
/// Rules are stored and rendered, not executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    /// Minimum text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Maximum text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Minimum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown instead of the default one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl ValidationRules {
    /// Returns whether no rule is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.pattern.is_none()
            && self.custom_message.is_none()
    }
}

/// One choice of a select, radio or checkbox element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOption {
    /// Stable option identifier.
    pub id: String,
    /// Submitted value.
    pub value: String,
    /// Displayed label.
    pub label: String,
}

/// Partial update of one option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionPatch {
    /// New submitted value.
    pub value: Option<String>,
    /// New displayed label.
    pub label: Option<String>,
}

/// Partial update of an element's editable properties.
///
/// Identity and position are owned by the form and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    /// New field type.
    #[serde(rename = "type")]
    pub element_type: Option<ElementType>,
    /// New label.
    pub label: Option<String>,
    /// New placeholder; an empty string clears it.
    pub placeholder: Option<String>,
    /// New required flag.
    pub required: Option<bool>,
    /// Replacement rules; empty rules clear them.
    pub validation: Option<ValidationRules>,
    /// Replacement option list.
    pub options: Option<Vec<ElementOption>>,
    /// New repeatable flag.
    pub repeatable: Option<bool>,
}

/// One field definition within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    id: ElementId,
    #[serde(rename = "type")]
    element_type: ElementType,
    label: String,
    placeholder: Option<String>,
    required: bool,
    validation: Option<ValidationRules>,
    options: Option<Vec<ElementOption>>,
    repeatable: bool,
    position: usize,
}

impl FormElement {
    /// Creates an element with default flags and no placeholder, rules or options.
    #[must_use]
    pub fn new(
        id: ElementId,
        element_type: ElementType,
        label: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            id,
            element_type,
            label: label.into(),
            placeholder: None,
            required: false,
            validation: None,
            options: None,
            repeatable: false,
            position,
        }
    }

    /// Creates the element the builder inserts for a palette drop.
    #[must_use]
    pub fn new_from_palette(element_type: ElementType) -> Self {
        Self::new(
            ElementId::generate(),
            element_type,
            format!("New {element_type}"),
            0,
        )
    }

    /// Returns a copy with the given placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder.filter(|value| !value.is_empty());
        self
    }

    /// Returns a copy with the given required flag.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Returns a copy with the given validation rules.
    #[must_use]
    pub fn with_validation(mut self, validation: Option<ValidationRules>) -> Self {
        self.validation = validation.filter(|rules| !rules.is_empty());
        self
    }

    /// Returns a copy with the given options.
    #[must_use]
    pub fn with_options(mut self, options: Option<Vec<ElementOption>>) -> Self {
        self.options = options;
        self
    }

    /// Returns a copy with the given repeatable flag.
    #[must_use]
    pub fn with_repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub(crate) fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Returns a copy with every field present in the patch merged in.
    #[must_use]
    pub fn patched(&self, patch: &ElementPatch) -> Self {
        let mut element = self.clone();
        if let Some(element_type) = patch.element_type {
            element.element_type = element_type;
        }
        if let Some(label) = &patch.label {
            element.label = label.clone();
        }
        if let Some(placeholder) = &patch.placeholder {
            element = element.with_placeholder(Some(placeholder.clone()));
        }
        if let Some(required) = patch.required {
            element.required = required;
        }
        if let Some(validation) = &patch.validation {
            element = element.with_validation(Some(validation.clone()));
        }
        if let Some(options) = &patch.options {
            element.options = Some(options.clone());
        }
        if let Some(repeatable) = patch.repeatable {
            element.repeatable = repeatable;
        }
        element
    }

    /// Returns a copy with a numbered option appended.
    #[must_use]
    pub fn with_option_added(&self) -> Self {
        let mut options = self.options.clone().unwrap_or_default();
        let number = options.len() + 1;
        options.push(ElementOption {
            id: Uuid::new_v4().to_string(),
            value: format!("option-{number}"),
            label: format!("Option {number}"),
        });
        self.clone().with_options(Some(options))
    }

    /// Returns a copy with the option at `index` patched; out-of-range indices are ignored.
    #[must_use]
    pub fn with_option_updated(&self, index: usize, patch: &OptionPatch) -> Self {
        let mut element = self.clone();
        if let Some(option) = element
            .options
            .as_mut()
            .and_then(|options| options.get_mut(index))
        {
            if let Some(value) = &patch.value {
                option.value = value.clone();
            }
            if let Some(label) = &patch.label {
                option.label = label.clone();
            }
        }
        element
    }

    /// Returns a copy without the option at `index`; out-of-range indices are ignored.
    #[must_use]
    pub fn with_option_removed(&self, index: usize) -> Self {
        let mut element = self.clone();
        if let Some(options) = element.options.as_mut()
            && index < options.len()
        {
            options.remove(index);
        }
        element
    }

    /// Returns element identifier.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns field type.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns whether an answer is required.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns validation rules.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationRules> {
        self.validation.as_ref()
    }

    /// Returns configured options.
    #[must_use]
    pub fn options(&self) -> Option<&[ElementOption]> {
        self.options.as_deref()
    }

    /// Returns options the renderer should display, empty for types without options.
    #[must_use]
    pub fn renderable_options(&self) -> &[ElementOption] {
        if self.element_type.supports_options() {
            self.options.as_deref().unwrap_or_default()
        } else {
            &[]
        }
    }

    /// Returns whether the field repeats.
    #[must_use]
    pub fn repeatable(&self) -> bool {
        self.repeatable
    }

    /// Returns zero-based position in the form.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}
