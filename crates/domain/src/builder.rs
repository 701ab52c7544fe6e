use serde::Deserialize;

use crate::element::{ElementId, ElementPatch, ElementType, FormElement, OptionPatch};
use crate::form::{Form, FormPatch};

/// One user intent against the builder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BuilderAction {
    /// Insert a fresh element of `element_type` at `position`.
    AddElement {
        /// Field type from the palette.
        element_type: ElementType,
        /// Target index, clamped to the element count.
        position: usize,
    },
    /// Merge properties into one element.
    UpdateElement {
        /// Target element.
        id: ElementId,
        /// Properties to merge.
        patch: ElementPatch,
    },
    /// Delete one element.
    RemoveElement {
        /// Target element.
        id: ElementId,
    },
    /// Reorder by list index.
    MoveElement {
        /// Current index.
        from: usize,
        /// Destination index.
        to: usize,
    },
    /// Change the focused element.
    SelectElement {
        /// Element to focus, or none.
        id: Option<ElementId>,
    },
    /// Merge form-level metadata.
    UpdateForm {
        /// Metadata to merge.
        patch: FormPatch,
    },
    /// Append a numbered option to a choice element.
    AddOption {
        /// Target element.
        element_id: ElementId,
    },
    /// Edit one option of a choice element.
    UpdateOption {
        /// Target element.
        element_id: ElementId,
        /// Option index.
        index: usize,
        /// Fields to merge.
        patch: OptionPatch,
    },
    /// Delete one option of a choice element.
    RemoveOption {
        /// Target element.
        element_id: ElementId,
        /// Option index.
        index: usize,
    },
}

impl BuilderAction {
    /// Returns whether the action changes the form and must be saved.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::SelectElement { .. })
    }
}

/// Builder state: the form under edit, UI focus and the unsaved-changes flag.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderState {
    form: Form,
    selected_element: Option<ElementId>,
    dirty: bool,
}

impl BuilderState {
    /// Starts editing `form` with nothing selected and nothing unsaved.
    #[must_use]
    pub fn new(form: Form) -> Self {
        Self {
            form,
            selected_element: None,
            dirty: false,
        }
    }

    /// Returns the state after `action`.
    #[must_use]
    pub fn apply(&self, action: BuilderAction) -> Self {
        let mut selected_element = self.selected_element.clone();

        let form = match action {
            BuilderAction::AddElement {
                element_type,
                position,
            } => {
                let element = FormElement::new_from_palette(element_type);
                selected_element = Some(element.id().clone());
                self.form.with_element_inserted(element, position)
            }
            BuilderAction::UpdateElement { id, patch } => self
                .form
                .with_element_mapped(&id, |element| element.patched(&patch)),
            BuilderAction::RemoveElement { id } => {
                if selected_element.as_ref() == Some(&id) {
                    selected_element = None;
                }
                self.form.with_element_removed(&id)
            }
            BuilderAction::MoveElement { from, to } => self.form.with_element_moved(from, to),
            BuilderAction::SelectElement { id } => {
                return Self {
                    form: self.form.clone(),
                    selected_element: id,
                    dirty: self.dirty,
                };
            }
            BuilderAction::UpdateForm { patch } => self.form.patched(&patch),
            BuilderAction::AddOption { element_id } => self
                .form
                .with_element_mapped(&element_id, FormElement::with_option_added),
            BuilderAction::UpdateOption {
                element_id,
                index,
                patch,
            } => self.form.with_element_mapped(&element_id, |element| {
                element.with_option_updated(index, &patch)
            }),
            BuilderAction::RemoveOption { element_id, index } => self
                .form
                .with_element_mapped(&element_id, |element| element.with_option_removed(index)),
        };

        Self {
            form,
            selected_element,
            dirty: true,
        }
    }

    /// Returns a copy with a new form and the dirty flag cleared.
    #[must_use]
    pub fn saved(&self, form: Form) -> Self {
        Self {
            form,
            selected_element: self.selected_element.clone(),
            dirty: false,
        }
    }

    /// Returns a copy with a new form and the dirty flag kept.
    #[must_use]
    pub fn with_form(&self, form: Form) -> Self {
        Self {
            form,
            selected_element: self.selected_element.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns the form under edit.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Returns the focused element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&ElementId> {
        self.selected_element.as_ref()
    }

    /// Returns whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests;
