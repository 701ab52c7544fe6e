//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod element_codec;
mod in_memory_form_store;
mod postgres_form_repository;
mod postgres_submission_repository;
mod postgres_user_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_form_store::InMemoryFormStore;
pub use postgres_form_repository::PostgresFormRepository;
pub use postgres_submission_repository::PostgresSubmissionRepository;
pub use postgres_user_repository::PostgresUserRepository;
