//! Account ports and the sign-up / sign-in service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use formcraft_core::{AppError, AppResult, UserId, UserIdentity};
use formcraft_domain::{EmailAddress, validate_new_password};

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Argon2id password hash.
    pub password_hash: String,
}

impl UserRecord {
    /// Builds the session identity for this user.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.email.clone(), self.full_name.clone())
    }
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by canonical email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Creates a user. Returns `AppError::Conflict` when the email is taken.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> AppResult<UserId>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Sign-up form input.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Repeated password.
    pub confirm_password: String,
    /// Optional display name.
    pub full_name: Option<String>,
}

/// Application service for registration and login.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Registers a new account and returns its session identity.
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserIdentity> {
        let email = EmailAddress::new(&input.email)?;
        validate_new_password(&input.password, &input.confirm_password)?;
        let full_name = input
            .full_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        if self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user_id = self
            .user_repository
            .create(email.as_str(), &password_hash, full_name.as_deref())
            .await?;

        info!(user_id = %user_id, "user registered");
        Ok(UserIdentity::new(user_id, email.as_str(), full_name))
    }

    /// Checks credentials. `None` for any failure so callers cannot tell an
    /// unknown email from a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Option<UserIdentity>> {
        let canonical = email.trim().to_lowercase();
        let Some(user) = self.user_repository.find_by_email(&canonical).await? else {
            // Keep timing close to the known-user path.
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            return Ok(None);
        }

        Ok(Some(user.identity()))
    }
}
