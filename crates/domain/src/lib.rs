//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod builder;
mod element;
mod form;
mod submission;
mod user;

pub use builder::{BuilderAction, BuilderState};
pub use element::{
    ElementId, ElementOption, ElementPatch, ElementType, FormElement, OptionPatch,
    ValidationRules,
};
pub use form::{DEFAULT_FORM_TITLE, Form, FormBranding, FormId, FormParts, FormPatch, FormStatus};
pub use submission::{Submission, SubmissionId, SubmissionResponse, SubmissionStatus};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, validate_new_password};
