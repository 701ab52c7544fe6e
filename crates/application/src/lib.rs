//! Application services and ports.

#![forbid(unsafe_code)]

mod autosave;
mod builder_session;
mod form_ports;
mod form_service;
mod submission_service;
mod user_service;

#[cfg(test)]
mod test_fakes;

pub use autosave::{AutosaveScheduler, AutosaveState, DEFAULT_AUTOSAVE_DEBOUNCE};
pub use builder_session::{BuilderSession, BuilderSessionHandle, SaveTicket};
pub use form_ports::{FormRepository, FormSummary, SubmissionRepository};
pub use form_service::FormService;
pub use submission_service::SubmissionService;
pub use user_service::{PasswordHasher, RegisterInput, UserRecord, UserRepository, UserService};
