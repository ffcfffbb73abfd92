use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, NewUser, RegisterRequest, User};
use crate::infrastructure::security::{hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Registration and credential checks over a [`UserRepository`].
///
/// Plaintext passwords never leave this type: they are hashed or verified on a
/// blocking thread and dropped.
pub struct CredentialStore {
    user_repository: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    #[instrument(skip(self, req), fields(mail = %req.mail))]
    pub async fn register(&self, req: RegisterRequest) -> Result<()> {
        trace!("Starting user registration");
        req.validate()?;

        let RegisterRequest { name, mail, pass } = req;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&pass))
            .await
            .map_err(|e| DomainError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                DomainError::Internal(format!("Failed to hash password: {}", e))
            })?;

        debug!("Saving user to repository");
        let user = self
            .user_repository
            .insert_user(NewUser {
                name,
                mail,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, mail = %user.mail, "User registered successfully");
        Ok(())
    }

    /// `Ok(false)` on a wrong password; `DomainError::UserNotFound` for an unknown mail.
    #[instrument(skip(self, req), fields(mail = %req.mail))]
    pub async fn verify_login(&self, req: LoginRequest) -> Result<bool> {
        trace!("Starting login verification");
        req.validate()?;

        let LoginRequest { mail, pass } = req;
        let stored_hash = self
            .user_repository
            .find_password_hash(&mail)
            .await?
            .ok_or_else(|| {
                warn!(mail = %mail, "User not found during login");
                DomainError::UserNotFound
            })?;

        let is_valid = tokio::task::spawn_blocking(move || verify_password(&pass, &stored_hash))
            .await
            .map_err(|e| DomainError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(|e| {
                error!(error = %e, "Stored password hash is unreadable");
                DomainError::Internal(format!("Failed to verify password: {}", e))
            })?;

        if is_valid {
            info!(mail = %mail, "Login successful");
        } else {
            warn!(mail = %mail, "Invalid password during login");
        }
        Ok(is_valid)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.user_repository.list_users().await?;
        debug!(count = users.len(), "Users listed");
        Ok(users)
    }
}
