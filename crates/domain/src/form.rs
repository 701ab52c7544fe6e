use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formcraft_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{ElementId, FormElement};

/// Title given to forms created from an empty builder.
pub const DEFAULT_FORM_TITLE: &str = "Untitled Form";

/// Persisted form identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(Uuid);

impl FormId {
    /// Creates a random form identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a form identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FormId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid form id '{value}': {error}")))
    }
}

/// Form publication lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Editable, not reachable publicly.
    #[default]
    Draft,
    /// Accepting public submissions.
    Published,
    /// Retired.
    Archived,
}

impl FormStatus {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for FormStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(AppError::Validation(format!("unknown form status '{value}'"))),
        }
    }
}

/// Visual branding of the public form page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBranding {
    /// Primary color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    /// Secondary color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Extra stylesheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
}

/// Shallow update of form-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormPatch {
    /// New title.
    pub title: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// New status.
    pub status: Option<FormStatus>,
    /// Replacement branding.
    pub branding: Option<FormBranding>,
}

/// Stored representation used to rebuild a form.
#[derive(Debug, Clone)]
pub struct FormParts {
    /// Identifier, absent for never-persisted forms.
    pub id: Option<FormId>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Status.
    pub status: FormStatus,
    /// Branding.
    pub branding: Option<FormBranding>,
    /// Version counter.
    pub version: i32,
    /// Owning user.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// First publication time.
    pub published_at: Option<DateTime<Utc>>,
    /// Elements in any order; sorted by stored position.
    pub elements: Vec<FormElement>,
}

/// Form aggregate: metadata plus its ordered elements.
///
/// Element positions are always `0..n-1` in list order and element ids are
/// unique. Mutators return a new value and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    id: Option<FormId>,
    title: String,
    description: Option<String>,
    status: FormStatus,
    branding: Option<FormBranding>,
    version: i32,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    elements: Vec<FormElement>,
}

impl Form {
    /// Creates the empty draft a new builder session starts from.
    #[must_use]
    pub fn new_draft(created_by: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: DEFAULT_FORM_TITLE.to_owned(),
            description: None,
            status: FormStatus::Draft,
            branding: None,
            version: 1,
            created_by,
            created_at: now,
            updated_at: now,
            published_at: None,
            elements: Vec::new(),
        }
    }

    /// Rebuilds a form from stored parts.
    ///
    /// Elements are ordered by stored position and renumbered; duplicate
    /// element ids are rejected.
    pub fn from_parts(parts: FormParts) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for element in &parts.elements {
            if !seen.insert(element.id().clone()) {
                return Err(AppError::Validation(format!(
                    "duplicate element id '{}' in form",
                    element.id()
                )));
            }
        }

        let mut elements = parts.elements;
        elements.sort_by_key(FormElement::position);

        Ok(Self {
            id: parts.id,
            title: parts.title,
            description: parts.description.filter(|value| !value.is_empty()),
            status: parts.status,
            branding: parts.branding,
            version: parts.version,
            created_by: parts.created_by,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            published_at: parts.published_at,
            elements: renumber(elements),
        })
    }

    /// Returns a copy with `element` inserted at `position`, clamped to `[0, len]`.
    #[must_use]
    pub fn with_element_inserted(&self, element: FormElement, position: usize) -> Self {
        let mut elements = self.elements.clone();
        let index = position.min(elements.len());
        elements.insert(index, element);
        self.with_elements(elements)
    }

    /// Returns a copy with `transform` applied to the element matching `id`.
    ///
    /// Unknown ids leave the elements unchanged.
    #[must_use]
    pub fn with_element_mapped(
        &self,
        id: &ElementId,
        transform: impl FnOnce(&FormElement) -> FormElement,
    ) -> Self {
        let mut elements = self.elements.clone();
        if let Some(slot) = elements.iter_mut().find(|element| element.id() == id) {
            *slot = transform(slot);
        }
        self.with_elements(elements)
    }

    /// Returns a copy without the element matching `id`.
    #[must_use]
    pub fn with_element_removed(&self, id: &ElementId) -> Self {
        let elements = self
            .elements
            .iter()
            .filter(|element| element.id() != id)
            .cloned()
            .collect();
        self.with_elements(elements)
    }

    /// Returns a copy with the element at `from` reinserted at `to`.
    ///
    /// An out-of-range `from` leaves the order unchanged; `to` is clamped.
    #[must_use]
    pub fn with_element_moved(&self, from: usize, to: usize) -> Self {
        let mut elements = self.elements.clone();
        if from < elements.len() {
            let moved = elements.remove(from);
            let index = to.min(elements.len());
            elements.insert(index, moved);
        }
        self.with_elements(elements)
    }

    /// Returns a copy with the metadata patch merged in.
    #[must_use]
    pub fn patched(&self, patch: &FormPatch) -> Self {
        let mut form = self.clone();
        if let Some(title) = &patch.title {
            form.title = title.clone();
        }
        if let Some(description) = &patch.description {
            form.description = (!description.is_empty()).then(|| description.clone());
        }
        if let Some(status) = patch.status {
            form.status = status;
        }
        if let Some(branding) = &patch.branding {
            form.branding = Some(branding.clone());
        }
        form
    }

    /// Returns the copy that a save with `status` writes.
    ///
    /// Publishing stamps `published_at` the first time and bumps the version
    /// when an already persisted form is published.
    #[must_use]
    pub fn prepared_for_save(&self, status: FormStatus, now: DateTime<Utc>) -> Self {
        let mut form = self.clone();
        if status == FormStatus::Published {
            form.published_at = form.published_at.or(Some(now));
            if self.id.is_some() {
                form.version = self.version.saturating_add(1);
            }
        }
        form.status = status;
        form.updated_at = now;
        form
    }

    /// Returns a copy carrying the identity and bookkeeping of a saved copy.
    ///
    /// Element and content edits made after `saved` was prepared are kept.
    #[must_use]
    pub fn with_saved_metadata(&self, saved: &Form, id: FormId) -> Self {
        let mut form = self.clone();
        form.id = Some(id);
        form.status = saved.status;
        form.version = saved.version;
        form.created_at = saved.created_at;
        form.updated_at = saved.updated_at;
        form.published_at = saved.published_at;
        form
    }

    /// Returns a copy with the given status and nothing else changed.
    #[must_use]
    pub fn with_status(&self, status: FormStatus) -> Self {
        let mut form = self.clone();
        form.status = status;
        form
    }

    /// Returns a copy with the given identifier.
    #[must_use]
    pub fn with_id(&self, id: FormId) -> Self {
        let mut form = self.clone();
        form.id = Some(id);
        form
    }

    fn with_elements(&self, elements: Vec<FormElement>) -> Self {
        Self {
            elements: renumber(elements),
            ..self.clone()
        }
    }

    /// Returns the identifier once persisted.
    #[must_use]
    pub fn id(&self) -> Option<FormId> {
        self.id
    }

    /// Returns form title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns form description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns form status.
    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Returns whether the public page is live.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == FormStatus::Published
    }

    /// Returns branding.
    #[must_use]
    pub fn branding(&self) -> Option<&FormBranding> {
        self.branding.as_ref()
    }

    /// Returns version counter.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns owning user.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns first publication time.
    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Returns elements in position order.
    #[must_use]
    pub fn elements(&self) -> &[FormElement] {
        &self.elements
    }

    /// Returns the element matching `id`.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&FormElement> {
        self.elements.iter().find(|element| element.id() == id)
    }
}

fn renumber(elements: Vec<FormElement>) -> Vec<FormElement> {
    elements
        .into_iter()
        .enumerate()
        .map(|(position, element)| element.with_position(position))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use formcraft_core::UserId;

    use super::{DEFAULT_FORM_TITLE, Form, FormId, FormParts, FormPatch, FormStatus};
    use crate::element::{ElementId, ElementType, FormElement};

    fn element(id: &str, position: usize) -> FormElement {
        FormElement::new(ElementId::new(id), ElementType::Text, id, position)
    }

    fn parts(elements: Vec<FormElement>) -> FormParts {
        let now = Utc::now();
        FormParts {
            id: Some(FormId::new()),
            title: "Survey".to_owned(),
            description: Some(String::new()),
            status: FormStatus::Draft,
            branding: None,
            version: 1,
            created_by: UserId::new(),
            created_at: now,
            updated_at: now,
            published_at: None,
            elements,
        }
    }

    fn ids(form: &Form) -> Vec<&str> {
        form.elements()
            .iter()
            .map(|element| element.id().as_str())
            .collect()
    }

    #[test]
    fn new_draft_starts_empty() {
        let form = Form::new_draft(UserId::new(), Utc::now());
        assert_eq!(form.id(), None);
        assert_eq!(form.title(), DEFAULT_FORM_TITLE);
        assert_eq!(form.status(), FormStatus::Draft);
        assert_eq!(form.version(), 1);
        assert!(form.elements().is_empty());
    }

    #[test]
    fn from_parts_orders_and_renumbers_stored_positions() {
        let form = Form::from_parts(parts(vec![element("c", 7), element("a", 1), element("b", 3)]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(ids(&form), vec!["a", "b", "c"]);
        let positions: Vec<usize> = form.elements().iter().map(FormElement::position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(form.description(), None);
    }

    #[test]
    fn from_parts_rejects_duplicate_element_ids() {
        let result = Form::from_parts(parts(vec![element("a", 0), element("a", 1)]));
        assert!(result.is_err());
    }

    #[test]
    fn insert_clamps_position_to_length() {
        let form = Form::new_draft(UserId::new(), Utc::now())
            .with_element_inserted(element("a", 0), 0)
            .with_element_inserted(element("b", 0), 99);

        assert_eq!(ids(&form), vec!["a", "b"]);
        assert_eq!(form.elements()[1].position(), 1);
    }

    #[test]
    fn mutators_leave_original_untouched() {
        let original = Form::new_draft(UserId::new(), Utc::now())
            .with_element_inserted(element("a", 0), 0)
            .with_element_inserted(element("b", 0), 1);
        let moved = original.with_element_moved(0, 1);

        assert_eq!(ids(&original), vec!["a", "b"]);
        assert_eq!(ids(&moved), vec!["b", "a"]);
    }

    #[test]
    fn move_with_out_of_range_source_keeps_order() {
        let form = Form::new_draft(UserId::new(), Utc::now())
            .with_element_inserted(element("a", 0), 0)
            .with_element_inserted(element("b", 0), 1);

        assert_eq!(ids(&form.with_element_moved(5, 0)), vec!["a", "b"]);
    }

    #[test]
    fn patch_is_shallow() {
        let form = Form::new_draft(UserId::new(), Utc::now());
        let patched = form.patched(&FormPatch {
            title: Some("Feedback".to_owned()),
            description: Some("Tell us".to_owned()),
            ..FormPatch::default()
        });

        assert_eq!(patched.title(), "Feedback");
        assert_eq!(patched.description(), Some("Tell us"));
        assert_eq!(patched.status(), FormStatus::Draft);
    }

    #[test]
    fn first_publish_stamps_published_at_without_bumping_new_form_version() {
        let now = Utc::now();
        let form = Form::new_draft(UserId::new(), now);
        let prepared = form.prepared_for_save(FormStatus::Published, now);

        assert_eq!(prepared.status(), FormStatus::Published);
        assert_eq!(prepared.published_at(), Some(now));
        assert_eq!(prepared.version(), 1);
    }

    #[test]
    fn republishing_a_saved_form_bumps_version_and_keeps_first_publish_time() {
        let first = Utc::now();
        let form = Form::new_draft(UserId::new(), first)
            .prepared_for_save(FormStatus::Published, first)
            .with_id(FormId::new());
        let later = first + chrono::Duration::minutes(5);
        let republished = form.prepared_for_save(FormStatus::Published, later);

        assert_eq!(republished.version(), 2);
        assert_eq!(republished.published_at(), Some(first));
        assert_eq!(republished.updated_at(), later);
    }
}
